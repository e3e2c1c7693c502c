//! S3 - Buckets and bucket policies

use cirrus_core::resource::{Properties, ResourceKind};
use cirrus_core::value::Value;

use crate::iam::PolicyDocument;
use crate::utils::PropertyBag;

/// AWS::S3::Bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    pub bucket_name: Option<Value>,
    pub access_control: Option<String>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket_name(mut self, name: impl Into<Value>) -> Self {
        self.bucket_name = Some(name.into());
        self
    }

    pub fn with_access_control(mut self, acl: impl Into<String>) -> Self {
        self.access_control = Some(acl.into());
        self
    }
}

impl ResourceKind for Bucket {
    fn type_name(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set_opt("BucketName", self.bucket_name)
            .set_opt("AccessControl", self.access_control)
            .build()
    }
}

/// AWS::S3::BucketPolicy
#[derive(Debug, Clone, PartialEq)]
pub struct BucketPolicy {
    /// Usually a `Ref` to the bucket resource
    pub bucket: Value,
    pub policy_document: PolicyDocument,
}

impl BucketPolicy {
    pub fn new(bucket: impl Into<Value>, policy_document: PolicyDocument) -> Self {
        Self {
            bucket: bucket.into(),
            policy_document,
        }
    }
}

impl ResourceKind for BucketPolicy {
    fn type_name(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set("Bucket", self.bucket)
            .set("PolicyDocument", self.policy_document)
            .build()
    }
}
