//! SQS schema definitions

use super::AwsSchemaConfig;
use cirrus_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Returns the schema config for AWS::SQS::Queue
pub fn queue_config() -> AwsSchemaConfig {
    AwsSchemaConfig::new(
        "AWS::SQS::Queue",
        true,
        ResourceSchema::new("AWS::SQS::Queue")
            .with_description("Creates an Amazon SQS standard or FIFO queue.")
            .attribute(AttributeSchema::new("QueueName", AttributeType::String))
            .attribute(
                AttributeSchema::new("DelaySeconds", AttributeType::Int)
                    .with_description("Seconds to delay delivery of each message (0-900)."),
            )
            .attribute(AttributeSchema::new("MessageRetentionPeriod", types::positive_int()))
            .attribute(AttributeSchema::new("VisibilityTimeout", AttributeType::Int))
            .readable(["Arn", "QueueName", "QueueUrl"]),
    )
}
