//! Graph - Flat namespace of declarations
//!
//! Parameters, mappings, resources and outputs share one namespace of logical
//! names. Declarations are kept in declaration order; references between them
//! are not checked here (see [`crate::validator`]).

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::resource::{Mapping, Output, Parameter, Resource};
use crate::value::Value;

/// Which section a logical name was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Parameter,
    Mapping,
    Resource,
    Output,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::Mapping => "mapping",
            DeclarationKind::Resource => "resource",
            DeclarationKind::Output => "output",
        };
        f.write_str(s)
    }
}

/// Declaration-time errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Duplicate logical name '{name}': already declared as a {existing}")]
    DuplicateName {
        name: String,
        existing: DeclarationKind,
    },

    #[error("Resource not declared: {0}")]
    UnknownResource(String),
}

/// All declarations of one template
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    parameters: Vec<Parameter>,
    mappings: Vec<Mapping>,
    resources: Vec<Resource>,
    outputs: Vec<Output>,
    /// Logical name -> (section, index within section)
    names: HashMap<String, (DeclarationKind, usize)>,
    /// Logical names across all sections, in declaration order
    declaration_order: Vec<String>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, name: &str, kind: DeclarationKind, index: usize) -> Result<(), GraphError> {
        if let Some((existing, _)) = self.names.get(name) {
            return Err(GraphError::DuplicateName {
                name: name.to_string(),
                existing: *existing,
            });
        }
        self.names.insert(name.to_string(), (kind, index));
        self.declaration_order.push(name.to_string());
        debug!("declared {} '{}'", kind, name);
        Ok(())
    }

    pub fn declare_parameter(&mut self, parameter: Parameter) -> Result<(), GraphError> {
        self.register(&parameter.name, DeclarationKind::Parameter, self.parameters.len())?;
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn declare_mapping(&mut self, mapping: Mapping) -> Result<(), GraphError> {
        self.register(&mapping.name, DeclarationKind::Mapping, self.mappings.len())?;
        self.mappings.push(mapping);
        Ok(())
    }

    /// Register a resource; its references may name declarations that don't exist yet
    pub fn declare_resource(&mut self, resource: Resource) -> Result<(), GraphError> {
        self.register(
            &resource.logical_name,
            DeclarationKind::Resource,
            self.resources.len(),
        )?;
        self.resources.push(resource);
        Ok(())
    }

    pub fn declare_output(&mut self, output: Output) -> Result<(), GraphError> {
        self.register(&output.name, DeclarationKind::Output, self.outputs.len())?;
        self.outputs.push(output);
        Ok(())
    }

    /// Re-declare a single property of an already declared resource
    pub fn set_property(
        &mut self,
        logical_name: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        let resource = self
            .resource_mut(logical_name)
            .ok_or_else(|| GraphError::UnknownResource(logical_name.to_string()))?;
        resource.properties.insert(key.into(), value.into());
        Ok(())
    }

    /// Logical names of every declaration, in declaration order
    pub fn all_logical_names(&self) -> impl Iterator<Item = &str> {
        self.declaration_order.iter().map(String::as_str)
    }

    /// Provider type tag of a declared resource
    pub fn lookup_kind(&self, name: &str) -> Option<&str> {
        self.resource(name).map(|r| r.kind.as_str())
    }

    /// Section a logical name was declared in
    pub fn declaration_kind(&self, name: &str) -> Option<DeclarationKind> {
        self.names.get(name).map(|(kind, _)| *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        match self.names.get(name) {
            Some((DeclarationKind::Parameter, idx)) => self.parameters.get(*idx),
            _ => None,
        }
    }

    pub fn mapping(&self, name: &str) -> Option<&Mapping> {
        match self.names.get(name) {
            Some((DeclarationKind::Mapping, idx)) => self.mappings.get(*idx),
            _ => None,
        }
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        match self.names.get(name) {
            Some((DeclarationKind::Resource, idx)) => self.resources.get(*idx),
            _ => None,
        }
    }

    fn resource_mut(&mut self, name: &str) -> Option<&mut Resource> {
        match self.names.get(name) {
            Some((DeclarationKind::Resource, idx)) => self.resources.get_mut(*idx),
            _ => None,
        }
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        match self.names.get(name) {
            Some((DeclarationKind::Output, idx)) => self.outputs.get(*idx),
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ParameterType;

    #[test]
    fn duplicate_resource_keeps_first_declaration() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(Resource::new("Web1", "AWS::EC2::Instance"))
            .unwrap();

        let err = graph
            .declare_resource(Resource::new("Web1", "AWS::S3::Bucket"))
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::DuplicateName {
                name: "Web1".to_string(),
                existing: DeclarationKind::Resource,
            }
        );
        assert_eq!(graph.resource_count(), 1);
        assert_eq!(graph.lookup_kind("Web1"), Some("AWS::EC2::Instance"));
    }

    #[test]
    fn namespace_is_shared_across_sections() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_parameter(Parameter::new("KeyName", ParameterType::String))
            .unwrap();

        let err = graph
            .declare_output(Output::new("KeyName", Value::reference("KeyName")))
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::DuplicateName {
                existing: DeclarationKind::Parameter,
                ..
            }
        ));

        let err = graph.declare_mapping(Mapping::new("KeyName")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateName { .. }));
        assert!(graph.mappings().is_empty());
    }

    #[test]
    fn forward_references_are_accepted_at_declaration() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(
                Resource::new("Profile", "AWS::IAM::InstanceProfile")
                    .with_property("Roles", Value::list([Value::reference("Role")])),
            )
            .unwrap();
        graph
            .declare_resource(Resource::new("Role", "AWS::IAM::Role"))
            .unwrap();

        let names: Vec<_> = graph.all_logical_names().collect();
        assert_eq!(names, vec!["Profile", "Role"]);
    }

    #[test]
    fn lookups_respect_sections() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_mapping(Mapping::new("RegionMap").with_entry("us-west-2", "AMI", "ami-1"))
            .unwrap();

        assert!(graph.mapping("RegionMap").is_some());
        assert!(graph.resource("RegionMap").is_none());
        assert_eq!(graph.lookup_kind("RegionMap"), None);
        assert_eq!(
            graph.declaration_kind("RegionMap"),
            Some(DeclarationKind::Mapping)
        );
        assert_eq!(graph.declaration_kind("Missing"), None);
    }

    #[test]
    fn set_property_redeclares_value() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(
                Resource::new("Web1", "AWS::EC2::Instance").with_property("InstanceType", "t1.micro"),
            )
            .unwrap();

        graph.set_property("Web1", "InstanceType", "t2.micro").unwrap();
        assert_eq!(
            graph.resource("Web1").unwrap().properties.get("InstanceType"),
            Some(&Value::from("t2.micro"))
        );

        let err = graph.set_property("Nope", "InstanceType", "t2.micro");
        assert_eq!(err, Err(GraphError::UnknownResource("Nope".to_string())));
    }
}
