//! Builder - Owns one graph through declare, validate and serialize
//!
//! ```text
//! Empty -> Declaring -> Validated | Rejected -> Serialized
//! ```
//!
//! Declaring again after validation drops the validation result, so a
//! document can only be produced from the graph exactly as it was validated.
//! Nothing is declared after serialization.

use std::fmt;

use log::debug;

use crate::document::{self, Document};
use crate::graph::{GraphError, ResourceGraph};
use crate::resource::{Mapping, Output, Parameter, Resource};
use crate::schema::ResourceSchema;
use crate::validator::{DependencyOrder, ValidationError, Validator, ValidatorConfig};
use crate::value::Value;

/// Pipeline phase of a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Declaring,
    Validated,
    Rejected,
    Serialized,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Empty => "empty",
            Phase::Declaring => "declaring",
            Phase::Validated => "validated",
            Phase::Rejected => "rejected",
            Phase::Serialized => "serialized",
        };
        f.write_str(s)
    }
}

/// Builder errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Cannot {operation} a template that is {phase}")]
    IllegalState {
        operation: &'static str,
        phase: Phase,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Declaring,
    Validated,
    Rejected,
    Serialized,
}

/// Builds a single template document
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    graph: ResourceGraph,
    description: Option<String>,
    validator: Validator,
    state: State,
    /// Set exactly while validated or serialized
    order: Option<DependencyOrder>,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            graph: ResourceGraph::new(),
            description: None,
            validator: Validator::default(),
            state: State::Declaring,
            order: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.validator = self.validator.with_config(config);
        self
    }

    /// Type check resources against these schemas during validation
    pub fn with_schemas(mut self, schemas: impl IntoIterator<Item = ResourceSchema>) -> Self {
        self.validator = self.validator.with_schemas(schemas);
        self
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Declaring if self.graph.is_empty() => Phase::Empty,
            State::Declaring => Phase::Declaring,
            State::Validated => Phase::Validated,
            State::Rejected => Phase::Rejected,
            State::Serialized => Phase::Serialized,
        }
    }

    /// Dependency order from the last successful validation
    pub fn order(&self) -> Option<&DependencyOrder> {
        self.order.as_ref()
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ResourceGraph {
        self.graph
    }

    /// Fail once the document has been produced
    fn check_declarable(&self) -> Result<(), BuildError> {
        if self.state == State::Serialized {
            return Err(BuildError::IllegalState {
                operation: "declare into",
                phase: Phase::Serialized,
            });
        }
        Ok(())
    }

    /// Apply a graph change, dropping any validation result once it succeeds
    fn declare_with(
        &mut self,
        declare: impl FnOnce(&mut ResourceGraph) -> Result<(), GraphError>,
    ) -> Result<(), BuildError> {
        self.check_declarable()?;
        declare(&mut self.graph)?;
        if self.state != State::Declaring {
            debug!("declaration after validation, result discarded");
            self.state = State::Declaring;
            self.order = None;
        }
        Ok(())
    }

    pub fn declare_parameter(&mut self, parameter: Parameter) -> Result<(), BuildError> {
        self.declare_with(|graph| graph.declare_parameter(parameter))
    }

    pub fn declare_mapping(&mut self, mapping: Mapping) -> Result<(), BuildError> {
        self.declare_with(|graph| graph.declare_mapping(mapping))
    }

    pub fn declare_resource(&mut self, resource: Resource) -> Result<(), BuildError> {
        self.declare_with(|graph| graph.declare_resource(resource))
    }

    pub fn declare_output(&mut self, output: Output) -> Result<(), BuildError> {
        self.declare_with(|graph| graph.declare_output(output))
    }

    /// Re-declare one property of a declared resource
    pub fn set_property(
        &mut self,
        logical_name: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), BuildError> {
        self.declare_with(|graph| graph.set_property(logical_name, key, value))
    }

    /// Validate the graph, reporting every problem at once
    pub fn validate(&mut self) -> Result<&DependencyOrder, Vec<ValidationError>> {
        match self.validator.validate(&self.graph) {
            Ok(order) => {
                self.state = State::Validated;
                let order: &DependencyOrder = self.order.insert(order);
                Ok(order)
            }
            Err(errors) => {
                self.state = State::Rejected;
                self.order = None;
                Err(errors)
            }
        }
    }

    /// Produce the document; only legal once validation has succeeded
    pub fn serialize(&mut self) -> Result<Document, BuildError> {
        let order = match (self.state, &self.order) {
            (State::Validated | State::Serialized, Some(order)) => order,
            _ => {
                return Err(BuildError::IllegalState {
                    operation: "serialize",
                    phase: self.phase(),
                });
            }
        };

        let mut document = document::serialize(&self.graph, order);
        if let Some(description) = &self.description {
            document = document.with_description(description.clone());
        }
        self.state = State::Serialized;
        Ok(document)
    }
}
