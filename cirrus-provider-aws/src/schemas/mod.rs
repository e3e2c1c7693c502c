//! AWS resource schema definitions
//!
//! One schema per typed kind, keyed by the CloudFormation type name. Property
//! names are the CloudFormation property names.

pub mod dynamodb;
pub mod ec2;
pub mod iam;
pub mod s3;
pub mod sqs;

use cirrus_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Schema together with AWS-specific metadata
pub struct AwsSchemaConfig {
    /// CloudFormation type name (e.g., "AWS::EC2::Instance")
    pub aws_type_name: &'static str,
    /// Whether this resource type uses tags
    pub has_tags: bool,
    pub schema: ResourceSchema,
}

impl AwsSchemaConfig {
    /// Config whose schema accepts `Tags` only when the type uses tags
    pub fn new(aws_type_name: &'static str, has_tags: bool, schema: ResourceSchema) -> Self {
        let tags = if has_tags { tags_type() } else { untagged_type() };
        Self {
            aws_type_name,
            has_tags,
            schema: schema.attribute(AttributeSchema::new("Tags", tags)),
        }
    }
}

/// Tags type for AWS resources (list of `{Key, Value}` records)
pub fn tags_type() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::Struct {
        name: "Tag".to_string(),
        fields: vec![
            AttributeSchema::new("Key", AttributeType::String).required(),
            AttributeSchema::new("Value", AttributeType::String).required(),
        ],
    }))
}

/// Rejects any `Tags` value on types that do not use tags
fn untagged_type() -> AttributeType {
    AttributeType::Custom {
        name: "Untagged".to_string(),
        base: Box::new(AttributeType::Json),
        validate: |_| Err("Resource type does not support tags".to_string()),
    }
}

/// Returns all schema configs
pub fn configs() -> Vec<AwsSchemaConfig> {
    vec![
        ec2::instance_config(),
        ec2::security_group_config(),
        s3::bucket_config(),
        s3::bucket_policy_config(),
        sqs::queue_config(),
        dynamodb::table_config(),
        iam::role_config(),
        iam::instance_profile_config(),
    ]
}

/// Returns all schemas, ready for `Validator::with_schemas`
pub fn all_schemas() -> Vec<ResourceSchema> {
    configs().into_iter().map(|c| c.schema).collect()
}

/// Look up the schema config for a CloudFormation type name
pub fn config_for(aws_type_name: &str) -> Option<AwsSchemaConfig> {
    configs()
        .into_iter()
        .find(|c| c.aws_type_name == aws_type_name)
}
