//! Operations stack: the deployment server

use cirrus_core::builder::{BuildError, TemplateBuilder};
use cirrus_core::resource::{Output, Parameter, ParameterType, Resource};
use cirrus_core::value::{Pseudo, Value};
use cirrus_provider_aws::ec2::{Instance, IngressRule, RuleSource, SecurityGroup, Tag};

use super::bootstrap::{Script, Wrapper};
use super::region_map;

pub fn declare(builder: &mut TemplateBuilder) -> Result<(), BuildError> {
    builder.declare_parameter(
        Parameter::new("KeyName", ParameterType::String).with_description(
            "Name of an existing EC2 KeyPair to enable RDP access to the instance",
        ),
    )?;
    builder.declare_mapping(region_map())?;

    let anywhere = || RuleSource::Cidr("0.0.0.0/0".to_string());
    builder.declare_resource(Resource::from_kind(
        "OctopusMasterSg",
        SecurityGroup::new("Security group for the Octopus Master")
            .with_ingress(IngressRule::tcp(80, anywhere()))
            .with_ingress(IngressRule::tcp(3389, anywhere())),
    ))?;

    // The official Windows AMIs enable the firewall
    let user_data = Script::new(Wrapper::PowerShell)
        .line(r#"New-NetFirewallRule -Displayname "Allow inbound TCP Port 80" -Direction inbound -LocalPort 80 -Protocol TCP -Action Allow"#)
        .into_user_data();
    builder.declare_resource(Resource::from_kind(
        "OctopusDeployServer1",
        Instance::new(
            Value::find_in_map("RegionMap", Pseudo::Region, "AMI"),
            "t1.micro",
        )
        .with_key_name(Value::reference("KeyName"))
        .with_security_group(Value::reference("OctopusMasterSg"))
        .with_tag(Tag::new("Name", "Octopus Deploy Server"))
        .with_user_data(user_data),
    ))?;

    builder.declare_output(
        Output::new(
            "URL",
            Value::join(
                "",
                [
                    Value::from("http://"),
                    Value::get_att("OctopusDeployServer1", "PublicDnsName"),
                ],
            ),
        )
        .with_description("URL of the Octopus Deploy Server"),
    )?;
    builder.declare_output(
        Output::new("SecurityGroupId", Value::get_att("OctopusMasterSg", "GroupId"))
            .with_description("Security group ID of the Octopus Deploy Server"),
    )?;
    Ok(())
}
