//! S3 schema definitions

use super::AwsSchemaConfig;
use cirrus_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

const CANNED_ACLS: &[&str] = &[
    "Private",
    "PublicRead",
    "PublicReadWrite",
    "AuthenticatedRead",
    "LogDeliveryWrite",
    "BucketOwnerRead",
    "BucketOwnerFullControl",
];

/// Returns the schema config for AWS::S3::Bucket
pub fn bucket_config() -> AwsSchemaConfig {
    AwsSchemaConfig::new(
        "AWS::S3::Bucket",
        true,
        ResourceSchema::new("AWS::S3::Bucket")
            .with_description("Creates an Amazon S3 bucket.")
            .attribute(
                AttributeSchema::new("BucketName", AttributeType::String)
                    .with_description("A name for the bucket."),
            )
            .attribute(
                AttributeSchema::new(
                    "AccessControl",
                    AttributeType::Enum(CANNED_ACLS.iter().map(|s| s.to_string()).collect()),
                )
                .with_description("A canned access control list."),
            )
            .readable([
                "Arn",
                "DomainName",
                "DualStackDomainName",
                "RegionalDomainName",
                "WebsiteURL",
            ]),
    )
}

/// Returns the schema config for AWS::S3::BucketPolicy
pub fn bucket_policy_config() -> AwsSchemaConfig {
    AwsSchemaConfig::new(
        "AWS::S3::BucketPolicy",
        false,
        ResourceSchema::new("AWS::S3::BucketPolicy")
            .with_description("Applies an access policy to a bucket.")
            .attribute(
                AttributeSchema::new("Bucket", AttributeType::String)
                    .required()
                    .with_description("The name of the bucket the policy applies to."),
            )
            .attribute(
                AttributeSchema::new("PolicyDocument", AttributeType::Json)
                    .required()
                    .with_description("The policy document."),
            ),
    )
}
