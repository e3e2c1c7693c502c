//! Cirrus AWS Provider
//!
//! Typed AWS resource kinds and their schemas.
//!
//! ## Module Structure
//!
//! - `ec2`, `s3`, `sqs`, `dynamodb`, `iam` - Resource kinds implementing `ResourceKind`
//! - `init` - `AWS::CloudFormation::Init` metadata for instances
//! - `schemas` - One `ResourceSchema` per kind, for validation
//! - `utils` - Property bag helpers shared by the kinds

pub mod dynamodb;
pub mod ec2;
pub mod iam;
pub mod init;
pub mod s3;
pub mod schemas;
pub mod sqs;
pub mod utils;

pub use schemas::all_schemas;
