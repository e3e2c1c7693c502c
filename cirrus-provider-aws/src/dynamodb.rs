//! DynamoDB - Tables

use std::fmt;

use cirrus_core::resource::{Properties, ResourceKind};
use cirrus_core::value::Value;

use crate::utils::PropertyBag;

/// Scalar attribute type of a key attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Number,
    Binary,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarType::String => "S",
            ScalarType::Number => "N",
            ScalarType::Binary => "B",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    pub name: String,
    pub attribute_type: ScalarType,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }
}

impl From<AttributeDefinition> for Value {
    fn from(def: AttributeDefinition) -> Self {
        Value::map([
            ("AttributeName", Value::String(def.name)),
            ("AttributeType", Value::String(def.attribute_type.to_string())),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Hash,
    Range,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Hash => f.write_str("HASH"),
            KeyType::Range => f.write_str("RANGE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeySchemaElement {
    pub name: String,
    pub key_type: KeyType,
}

impl KeySchemaElement {
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            key_type,
        }
    }
}

impl From<KeySchemaElement> for Value {
    fn from(key: KeySchemaElement) -> Self {
        Value::map([
            ("AttributeName", Value::String(key.name)),
            ("KeyType", Value::String(key.key_type.to_string())),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl ProvisionedThroughput {
    pub fn new(read_capacity_units: i64, write_capacity_units: i64) -> Self {
        Self {
            read_capacity_units,
            write_capacity_units,
        }
    }
}

impl From<ProvisionedThroughput> for Value {
    fn from(throughput: ProvisionedThroughput) -> Self {
        Value::map([
            ("ReadCapacityUnits", throughput.read_capacity_units),
            ("WriteCapacityUnits", throughput.write_capacity_units),
        ])
    }
}

/// AWS::DynamoDB::Table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub table_name: Option<Value>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    pub provisioned_throughput: ProvisionedThroughput,
}

impl Table {
    /// Table keyed by a single hash attribute
    pub fn with_hash_key(
        name: impl Into<String>,
        attribute_type: ScalarType,
        provisioned_throughput: ProvisionedThroughput,
    ) -> Self {
        let name = name.into();
        Self {
            table_name: None,
            attribute_definitions: vec![AttributeDefinition::new(name.clone(), attribute_type)],
            key_schema: vec![KeySchemaElement::new(name, KeyType::Hash)],
            provisioned_throughput,
        }
    }

    /// Add a range key on top of the hash key
    pub fn with_range_key(mut self, name: impl Into<String>, attribute_type: ScalarType) -> Self {
        let name = name.into();
        self.attribute_definitions
            .push(AttributeDefinition::new(name.clone(), attribute_type));
        self.key_schema
            .push(KeySchemaElement::new(name, KeyType::Range));
        self
    }

    pub fn with_table_name(mut self, name: impl Into<Value>) -> Self {
        self.table_name = Some(name.into());
        self
    }
}

impl ResourceKind for Table {
    fn type_name(&self) -> &'static str {
        "AWS::DynamoDB::Table"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set_opt("TableName", self.table_name)
            .set_list("AttributeDefinitions", self.attribute_definitions)
            .set_list("KeySchema", self.key_schema)
            .set("ProvisionedThroughput", self.provisioned_throughput)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn hash_keyed_table() {
        let table = Table::with_hash_key("ImageId", ScalarType::String, ProvisionedThroughput::new(3, 1));
        assert_eq!(table.type_name(), "AWS::DynamoDB::Table");

        assert_eq!(
            Value::Map(table.into_properties()).to_wire(),
            json!({
                "AttributeDefinitions": [{ "AttributeName": "ImageId", "AttributeType": "S" }],
                "KeySchema": [{ "AttributeName": "ImageId", "KeyType": "HASH" }],
                "ProvisionedThroughput": { "ReadCapacityUnits": 3, "WriteCapacityUnits": 1 }
            })
        );
    }

    #[test]
    fn range_key_follows_hash_key() {
        let table = Table::with_hash_key("ImageId", ScalarType::String, ProvisionedThroughput::new(1, 1))
            .with_range_key("CreatedAt", ScalarType::Number);

        assert_eq!(table.key_schema[1], KeySchemaElement::new("CreatedAt", KeyType::Range));
        assert_eq!(table.attribute_definitions[1].attribute_type, ScalarType::Number);
    }
}
