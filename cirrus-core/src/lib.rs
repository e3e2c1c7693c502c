//! Cirrus Core
//!
//! Declare infrastructure as a graph of named values, validate the references
//! between them, and render the graph as a template document for a
//! provisioning engine.

pub mod builder;
pub mod document;
pub mod graph;
pub mod intrinsic;
pub mod resource;
pub mod schema;
pub mod validator;
pub mod value;

pub use builder::{BuildError, Phase, TemplateBuilder};
pub use document::{Document, DocumentError};
pub use graph::{DeclarationKind, GraphError, ResourceGraph};
pub use resource::{Mapping, Output, Parameter, ParameterType, Properties, Resource, ResourceKind};
pub use validator::{DependencyOrder, ValidationError, Validator, ValidatorConfig};
pub use value::{Pseudo, Reference, Value};
