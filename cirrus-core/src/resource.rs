//! Resource - Declarations that make up a template
//!
//! Parameters, mappings, resources and outputs are plain owned records. They are
//! registered in a [`ResourceGraph`](crate::graph::ResourceGraph) under a logical
//! name and are never resolved against each other until validation.

use std::collections::BTreeMap;
use std::fmt;

use crate::value::Value;

/// Property bag of a resource, keyed by the provider's property name
pub type Properties = BTreeMap<String, Value>;

/// Type of a declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Number,
    CommaDelimitedList,
    /// Name of an existing EC2 key pair
    KeyPairName,
    /// Identifier of an existing security group
    SecurityGroupId,
}

impl ParameterType {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::Number => "Number",
            ParameterType::CommaDelimitedList => "CommaDelimitedList",
            ParameterType::KeyPairName => "AWS::EC2::KeyPair::KeyName",
            ParameterType::SecurityGroupId => "AWS::EC2::SecurityGroup::Id",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Build-time input supplied by whoever applies the document
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub param_type: ParameterType,
    pub default: Option<Value>,
    /// Mask the value in provisioning engine consoles and logs
    pub no_echo: bool,
    pub allowed_values: Vec<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            param_type,
            default: None,
            no_echo: false,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_no_echo(mut self, no_echo: bool) -> Self {
        self.no_echo = no_echo;
        self
    }

    pub fn with_allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Static two-level lookup table (e.g., region -> attribute -> value)
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub name: String,
    pub table: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Mapping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: BTreeMap::new(),
        }
    }

    /// Add a `key -> subkey -> value` entry
    pub fn with_entry(
        mut self,
        key: impl Into<String>,
        subkey: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.table
            .entry(key.into())
            .or_default()
            .insert(subkey.into(), value.into());
        self
    }

    pub fn get(&self, key: &str, subkey: &str) -> Option<&Value> {
        self.table.get(key).and_then(|row| row.get(subkey))
    }
}

/// A provider-defined kind with a typed record of properties
///
/// Kinds not modeled this way can still be declared through
/// [`Resource::new`] and [`Resource::with_property`].
pub trait ResourceKind {
    /// Provider type tag (e.g., "AWS::EC2::Instance")
    fn type_name(&self) -> &'static str;

    /// Consume the record into its property bag
    fn into_properties(self) -> Properties;
}

/// A resource the provisioning engine will create
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub logical_name: String,
    /// Provider type tag
    pub kind: String,
    pub properties: Properties,
    pub metadata: Option<Value>,
    /// Explicit ordering edges to other resources
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(logical_name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            kind: kind.into(),
            properties: Properties::new(),
            metadata: None,
            depends_on: Vec::new(),
        }
    }

    /// Build a resource from a typed kind record
    pub fn from_kind(logical_name: impl Into<String>, kind: impl ResourceKind) -> Self {
        let type_name = kind.type_name();
        Self {
            properties: kind.into_properties(),
            ..Self::new(logical_name, type_name)
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn with_depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// Every value this resource carries (properties, then metadata)
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.properties.values().chain(self.metadata.iter())
    }
}

/// A value the provisioning engine publishes after applying the document
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub name: String,
    pub description: String,
    pub value: Value,
    pub export_name: Option<Value>,
}

impl Output {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value: value.into(),
            export_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_export_name(mut self, name: impl Into<Value>) -> Self {
        self.export_name = Some(name.into());
        self
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        std::iter::once(&self.value).chain(self.export_name.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Queue {
        name: Option<Value>,
    }

    impl ResourceKind for Queue {
        fn type_name(&self) -> &'static str {
            "AWS::SQS::Queue"
        }

        fn into_properties(self) -> Properties {
            let mut props = Properties::new();
            if let Some(name) = self.name {
                props.insert("QueueName".to_string(), name);
            }
            props
        }
    }

    #[test]
    fn resource_from_kind() {
        let resource = Resource::from_kind(
            "Jobs",
            Queue {
                name: Some(Value::from("jobs")),
            },
        )
        .with_property("VisibilityTimeout", Value::Int(30));

        assert_eq!(resource.kind, "AWS::SQS::Queue");
        assert_eq!(resource.logical_name, "Jobs");
        assert_eq!(resource.properties.len(), 2);
    }

    #[test]
    fn mapping_lookup() {
        let mapping = Mapping::new("RegionMap").with_entry("us-west-2", "AMI", "ami-59f2d769");
        assert_eq!(
            mapping.get("us-west-2", "AMI"),
            Some(&Value::from("ami-59f2d769"))
        );
        assert_eq!(mapping.get("eu-west-1", "AMI"), None);
    }

    #[test]
    fn resource_values_include_metadata() {
        let resource = Resource::new("Web1", "AWS::EC2::Instance")
            .with_property("KeyName", Value::reference("KeyName"))
            .with_metadata(Value::map([("Init", Value::get_att("Other", "Arn"))]));
        assert_eq!(resource.values().count(), 2);
    }

    #[test]
    fn parameter_type_wire_names() {
        assert_eq!(ParameterType::String.to_string(), "String");
        assert_eq!(
            ParameterType::KeyPairName.wire_name(),
            "AWS::EC2::KeyPair::KeyName"
        );
    }
}
