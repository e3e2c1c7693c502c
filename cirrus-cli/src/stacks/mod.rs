//! Bundled stacks

pub mod bootstrap;
pub mod environment;
pub mod operations;

use cirrus_core::builder::{BuildError, TemplateBuilder};
use cirrus_core::resource::Mapping;
use cirrus_core::validator::ValidatorConfig;
use cirrus_provider_aws::all_schemas;

/// A named stack the CLI can build
pub struct Stack {
    pub name: &'static str,
    pub summary: &'static str,
    declare: fn(&mut TemplateBuilder) -> Result<(), BuildError>,
}

impl Stack {
    /// Declare the stack into a fresh builder that checks provider schemas
    pub fn builder(&self, config: ValidatorConfig) -> Result<TemplateBuilder, BuildError> {
        let mut builder = TemplateBuilder::new()
            .with_config(config)
            .with_schemas(all_schemas());
        (self.declare)(&mut builder)?;
        Ok(builder)
    }
}

pub fn all() -> Vec<Stack> {
    vec![
        Stack {
            name: "environment",
            summary: "Image bucket, resize queue and table, web and worker instances",
            declare: environment::declare,
        },
        Stack {
            name: "operations",
            summary: "Deployment server and its security group",
            declare: operations::declare,
        },
    ]
}

pub fn find(name: &str) -> Option<Stack> {
    all().into_iter().find(|s| s.name == name)
}

/// AMI per region, looked up with the region the stack is deployed to
pub(crate) fn region_map() -> Mapping {
    Mapping::new("RegionMap").with_entry("us-west-2", "AMI", "ami-59f2d769")
}
