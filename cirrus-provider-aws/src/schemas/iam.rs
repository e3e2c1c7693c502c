//! IAM schema definitions

use super::AwsSchemaConfig;
use cirrus_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Returns the schema config for AWS::IAM::Role
pub fn role_config() -> AwsSchemaConfig {
    let policy = AttributeType::Struct {
        name: "Policy".to_string(),
        fields: vec![
            AttributeSchema::new("PolicyName", AttributeType::String).required(),
            AttributeSchema::new("PolicyDocument", AttributeType::Json).required(),
        ],
    };

    AwsSchemaConfig::new(
        "AWS::IAM::Role",
        true,
        ResourceSchema::new("AWS::IAM::Role")
            .with_description("Creates a new role for your AWS account.")
            .attribute(
                AttributeSchema::new("AssumeRolePolicyDocument", AttributeType::Json)
                    .required()
                    .with_description("The trust policy associated with this role."),
            )
            .attribute(AttributeSchema::new("Path", AttributeType::String))
            .attribute(AttributeSchema::new("Policies", AttributeType::List(Box::new(policy))))
            .attribute(AttributeSchema::new("ManagedPolicyArns", types::string_list()))
            .readable(["Arn", "RoleId"]),
    )
}

/// Returns the schema config for AWS::IAM::InstanceProfile
pub fn instance_profile_config() -> AwsSchemaConfig {
    AwsSchemaConfig::new(
        "AWS::IAM::InstanceProfile",
        false,
        ResourceSchema::new("AWS::IAM::InstanceProfile")
            .with_description("Creates a new instance profile.")
            .attribute(AttributeSchema::new("Path", AttributeType::String))
            .attribute(
                AttributeSchema::new("Roles", types::string_list())
                    .required()
                    .with_description("The name of the role to associate with the profile."),
            )
            .readable(["Arn"]),
    )
}
