//! DynamoDB schema definitions

use super::AwsSchemaConfig;
use cirrus_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

fn enum_of(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|s| s.to_string()).collect())
}

/// Returns the schema config for AWS::DynamoDB::Table
pub fn table_config() -> AwsSchemaConfig {
    let attribute_definition = AttributeType::Struct {
        name: "AttributeDefinition".to_string(),
        fields: vec![
            AttributeSchema::new("AttributeName", AttributeType::String).required(),
            AttributeSchema::new("AttributeType", enum_of(&["S", "N", "B"])).required(),
        ],
    };
    let key_schema = AttributeType::Struct {
        name: "KeySchema".to_string(),
        fields: vec![
            AttributeSchema::new("AttributeName", AttributeType::String).required(),
            AttributeSchema::new("KeyType", enum_of(&["HASH", "RANGE"])).required(),
        ],
    };
    let throughput = AttributeType::Struct {
        name: "ProvisionedThroughput".to_string(),
        fields: vec![
            AttributeSchema::new("ReadCapacityUnits", types::positive_int()).required(),
            AttributeSchema::new("WriteCapacityUnits", types::positive_int()).required(),
        ],
    };

    AwsSchemaConfig::new(
        "AWS::DynamoDB::Table",
        true,
        ResourceSchema::new("AWS::DynamoDB::Table")
            .with_description("Creates a DynamoDB table.")
            .attribute(AttributeSchema::new("TableName", AttributeType::String))
            .attribute(
                AttributeSchema::new(
                    "AttributeDefinitions",
                    AttributeType::List(Box::new(attribute_definition)),
                )
                .required()
                .with_description("Attributes that describe the key schema."),
            )
            .attribute(
                AttributeSchema::new("KeySchema", AttributeType::List(Box::new(key_schema)))
                    .required()
                    .with_description("The primary key attributes."),
            )
            .attribute(AttributeSchema::new("ProvisionedThroughput", throughput))
            .readable(["Arn", "StreamArn"]),
    )
}
