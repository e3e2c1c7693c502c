//! Schema - Define type schemas for resources
//!
//! Providers define a schema for each resource kind they model, so resources
//! of that kind are type checked during validation. Kinds without a schema
//! are accepted as free-form property bags.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::resource::Properties;
use crate::value::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Integer or floating point number
    Number,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Free-form document (policy documents, metadata)
    Json,
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Map with arbitrary keys
    Map(Box<AttributeType>),
    /// Nested record with named fields
    Struct {
        name: String,
        fields: Vec<AttributeSchema>,
    },
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::Json, _) => Ok(()),

            // Resolved by the provisioning engine; the result type is only known at apply time
            (
                _,
                Value::Ref(_) | Value::GetAtt(..) | Value::Pseudo(_) | Value::FindInMap { .. },
            ) => Ok(()),

            // Join and Base64 always produce strings
            (AttributeType::String, Value::Join { .. } | Value::Base64(_)) => Ok(()),
            (AttributeType::Custom { base, .. }, Value::Join { .. } | Value::Base64(_))
                if matches!(**base, AttributeType::String) =>
            {
                Ok(())
            }

            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Number, Value::Int(_) | Value::Float(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, .. }, v) => {
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Struct { fields, .. }, Value::Map(map)) => {
                for field in fields {
                    match map.get(&field.name) {
                        Some(v) => field.attr_type.validate(v).map_err(|e| {
                            TypeError::MapValueError {
                                key: field.name.clone(),
                                inner: Box::new(e),
                            }
                        })?,
                        None if field.required => {
                            return Err(TypeError::MissingRequired {
                                name: field.name.clone(),
                            });
                        }
                        None => {}
                    }
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Number => "Number".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Json => "Json".to_string(),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Struct { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' for '{attribute}': {inner}")]
    AttributeError {
        name: String,
        attribute: String,
        inner: Box<TypeError>,
    },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Float(_) => "Float".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::Ref(name) => format!("Ref({})", name),
            Value::GetAtt(name, attr) => format!("GetAtt({}.{})", name, attr),
            Value::Pseudo(p) => format!("Ref({})", p),
            Value::FindInMap { mapping, .. } => format!("FindInMap({})", mapping),
            Value::Join { .. } => "Join".to_string(),
            Value::Base64(_) => "Base64".to_string(),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    /// Provider type tag (e.g., "AWS::SQS::Queue")
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    /// Attributes readable through `Fn::GetAtt`
    pub readable: BTreeSet<String>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            readable: BTreeSet::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    /// Declare attributes that can be read with `Fn::GetAtt`
    pub fn readable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readable.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Whether `Fn::GetAtt` may read the given attribute
    pub fn is_readable(&self, attribute: &str) -> bool {
        self.readable.contains(attribute)
    }

    /// Validate resource properties
    pub fn validate(&self, properties: &Properties) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        for (name, schema) in &self.attributes {
            if schema.required && !properties.contains_key(name) {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each attribute
        for (name, value) in properties {
            if let Some(schema) = self.attributes.get(name)
                && let Err(e) = schema.attr_type.validate(value)
            {
                errors.push(TypeError::AttributeError {
                    name: name.clone(),
                    attribute: schema.attr_type.to_string(),
                    inner: Box::new(e),
                });
            }
            // Unknown attributes are allowed (for flexibility)
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Positive integer type
    pub fn positive_int() -> AttributeType {
        AttributeType::Custom {
            name: "PositiveInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| {
                if let Value::Int(n) = value {
                    if *n > 0 {
                        Ok(())
                    } else {
                        Err("Value must be positive".to_string())
                    }
                } else {
                    Err("Expected integer".to_string())
                }
            },
        }
    }

    /// Port number, as an integer or a numeric string (e.g., "8080")
    pub fn port() -> AttributeType {
        AttributeType::Custom {
            name: "Port".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| {
                let port = match value {
                    Value::Int(n) => *n,
                    Value::String(s) => s
                        .parse::<i64>()
                        .map_err(|_| format!("Invalid port '{}': must be a number", s))?,
                    _ => return Err("Expected integer or numeric string".to_string()),
                };
                // -1 means "all ports" for ICMP and protocol -1 rules
                if (-1..=65535).contains(&port) {
                    Ok(())
                } else {
                    Err(format!("Invalid port {}: must be -1 to 65535", port))
                }
            },
        }
    }

    /// CIDR block type (e.g., "10.0.0.0/16")
    pub fn cidr() -> AttributeType {
        AttributeType::Custom {
            name: "Cidr".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| {
                if let Value::String(s) = value {
                    validate_cidr(s)
                } else {
                    Err("Expected string".to_string())
                }
            },
        }
    }

    /// List of strings, the most common list shape in resource properties
    pub fn string_list() -> AttributeType {
        AttributeType::List(Box::new(AttributeType::String))
    }
}

/// Validate CIDR block format (e.g., "10.0.0.0/16")
pub fn validate_cidr(cidr: &str) -> Result<(), String> {
    let parts: Vec<&str> = cidr.split('/').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid CIDR format '{}': expected IP/prefix",
            cidr
        ));
    }

    let ip = parts[0];
    let prefix = parts[1];

    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() != 4 {
        return Err(format!("Invalid IP address '{}': expected 4 octets", ip));
    }

    for octet in &octets {
        if octet.parse::<u8>().is_err() {
            return Err(format!(
                "Invalid octet '{}' in IP address: must be 0-255",
                octet
            ));
        }
    }

    match prefix.parse::<u8>() {
        Ok(p) if p <= 32 => Ok(()),
        Ok(p) => Err(format!("Invalid prefix length '{}': must be 0-32", p)),
        Err(_) => Err(format!(
            "Invalid prefix length '{}': must be a number",
            prefix
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Pseudo;

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::from("hello")).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn references_satisfy_any_type() {
        assert!(AttributeType::Int.validate(&Value::reference("Port")).is_ok());
        assert!(AttributeType::Bool.validate(&Value::get_att("A", "B")).is_ok());
        assert!(
            types::string_list()
                .validate(&Value::Pseudo(Pseudo::NotificationArns))
                .is_ok()
        );
    }

    #[test]
    fn join_only_satisfies_string_types() {
        let join = Value::join("", ["http://", "example.com"]);
        assert!(AttributeType::String.validate(&join).is_ok());
        assert!(types::cidr().validate(&join).is_ok());
        assert!(AttributeType::Int.validate(&join).is_err());
        assert!(types::string_list().validate(&join).is_err());
    }

    #[test]
    fn validate_enum_type() {
        let t = AttributeType::Enum(vec!["HASH".to_string(), "RANGE".to_string()]);
        assert!(t.validate(&Value::from("HASH")).is_ok());
        assert!(t.validate(&Value::from("SORT")).is_err());
    }

    #[test]
    fn validate_port() {
        let t = types::port();
        assert!(t.validate(&Value::from("8080")).is_ok());
        assert!(t.validate(&Value::Int(3389)).is_ok());
        assert!(t.validate(&Value::Int(-1)).is_ok());
        assert!(t.validate(&Value::from("http")).is_err());
        assert!(t.validate(&Value::Int(70000)).is_err());
    }

    #[test]
    fn validate_struct_fields() {
        let t = AttributeType::Struct {
            name: "Rule".to_string(),
            fields: vec![
                AttributeSchema::new("IpProtocol", AttributeType::String).required(),
                AttributeSchema::new("FromPort", types::port()),
            ],
        };

        let ok = Value::map([("IpProtocol", "tcp"), ("FromPort", "80")]);
        assert!(t.validate(&ok).is_ok());

        let missing = Value::map([("FromPort", "80")]);
        assert_eq!(
            t.validate(&missing),
            Err(TypeError::MissingRequired {
                name: "IpProtocol".to_string()
            })
        );

        let bad_port = Value::map([("IpProtocol", "tcp"), ("FromPort", "eighty")]);
        assert!(matches!(
            t.validate(&bad_port),
            Err(TypeError::MapValueError { .. })
        ));
    }

    #[test]
    fn validate_resource_schema() {
        let schema = ResourceSchema::new("AWS::SQS::Queue")
            .attribute(AttributeSchema::new("QueueName", AttributeType::String).required())
            .attribute(AttributeSchema::new("VisibilityTimeout", types::positive_int()))
            .readable(["Arn", "QueueName"]);

        let mut props = Properties::new();
        props.insert("QueueName".to_string(), Value::from("jobs"));
        props.insert("VisibilityTimeout".to_string(), Value::Int(30));
        assert!(schema.validate(&props).is_ok());
        assert!(schema.is_readable("Arn"));
        assert!(!schema.is_readable("Url"));

        props.insert("VisibilityTimeout".to_string(), Value::Int(0));
        props.remove("QueueName");
        let errors = schema.validate(&props).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validate_cidr_type() {
        let t = types::cidr();

        assert!(t.validate(&Value::from("10.0.0.0/16")).is_ok());
        assert!(t.validate(&Value::from("0.0.0.0/0")).is_ok());

        assert!(t.validate(&Value::from("10.0.0.0")).is_err()); // no prefix
        assert!(t.validate(&Value::from("10.0.0.0/33")).is_err()); // prefix too large
        assert!(t.validate(&Value::from("10.0.0.256/16")).is_err()); // octet > 255
        assert!(t.validate(&Value::Int(42)).is_err()); // wrong type
    }
}
