//! SQS - Queues

use cirrus_core::resource::{Properties, ResourceKind};
use cirrus_core::value::Value;

use crate::utils::PropertyBag;

/// AWS::SQS::Queue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    pub queue_name: Option<Value>,
    pub delay_seconds: Option<i64>,
    pub message_retention_period: Option<i64>,
    pub visibility_timeout: Option<i64>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_name(mut self, name: impl Into<Value>) -> Self {
        self.queue_name = Some(name.into());
        self
    }

    pub fn with_visibility_timeout(mut self, seconds: i64) -> Self {
        self.visibility_timeout = Some(seconds);
        self
    }

    pub fn with_message_retention_period(mut self, seconds: i64) -> Self {
        self.message_retention_period = Some(seconds);
        self
    }
}

impl ResourceKind for Queue {
    fn type_name(&self) -> &'static str {
        "AWS::SQS::Queue"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set_opt("QueueName", self.queue_name)
            .set_opt("DelaySeconds", self.delay_seconds)
            .set_opt("MessageRetentionPeriod", self.message_retention_period)
            .set_opt("VisibilityTimeout", self.visibility_timeout)
            .build()
    }
}
