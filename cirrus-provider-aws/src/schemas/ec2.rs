//! EC2 schema definitions
//!
//! Based on the CloudFormation AWS::EC2::Instance and AWS::EC2::SecurityGroup schemas

use super::AwsSchemaConfig;
use cirrus_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

fn ingress_rule_type() -> AttributeType {
    AttributeType::Struct {
        name: "Ingress".to_string(),
        fields: vec![
            AttributeSchema::new(
                "IpProtocol",
                AttributeType::Enum(vec![
                    "tcp".to_string(),
                    "udp".to_string(),
                    "icmp".to_string(),
                    "-1".to_string(),
                ]),
            )
            .required(),
            AttributeSchema::new("FromPort", types::port()),
            AttributeSchema::new("ToPort", types::port()),
            AttributeSchema::new("CidrIp", types::cidr()),
            AttributeSchema::new("SourceSecurityGroupId", AttributeType::String),
            AttributeSchema::new("SourceSecurityGroupName", AttributeType::String),
        ],
    }
}

/// Returns the schema config for AWS::EC2::Instance
pub fn instance_config() -> AwsSchemaConfig {
    AwsSchemaConfig::new(
        "AWS::EC2::Instance",
        true,
        ResourceSchema::new("AWS::EC2::Instance")
            .with_description("Specifies an EC2 instance.")
            .attribute(
                AttributeSchema::new("ImageId", AttributeType::String)
                    .required()
                    .with_description("The ID of the AMI."),
            )
            .attribute(
                AttributeSchema::new("InstanceType", AttributeType::String)
                    .with_description("The instance type (e.g., t1.micro)."),
            )
            .attribute(
                AttributeSchema::new("KeyName", AttributeType::String)
                    .with_description("The name of the key pair."),
            )
            .attribute(
                AttributeSchema::new("SecurityGroups", types::string_list())
                    .with_description("The names of the security groups."),
            )
            .attribute(
                AttributeSchema::new("IamInstanceProfile", AttributeType::String)
                    .with_description("The name of an IAM instance profile."),
            )
            .attribute(
                AttributeSchema::new("UserData", AttributeType::String)
                    .with_description("Base64-encoded user data for the instance."),
            )
            .readable([
                "AvailabilityZone",
                "PrivateDnsName",
                "PrivateIp",
                "PublicDnsName",
                "PublicIp",
            ]),
    )
}

/// Returns the schema config for AWS::EC2::SecurityGroup
pub fn security_group_config() -> AwsSchemaConfig {
    AwsSchemaConfig::new(
        "AWS::EC2::SecurityGroup",
        true,
        ResourceSchema::new("AWS::EC2::SecurityGroup")
            .with_description("Specifies a security group.")
            .attribute(
                AttributeSchema::new("GroupDescription", AttributeType::String)
                    .required()
                    .with_description("A description for the security group."),
            )
            .attribute(
                AttributeSchema::new(
                    "SecurityGroupIngress",
                    AttributeType::List(Box::new(ingress_rule_type())),
                )
                .with_description("The inbound rules associated with the security group."),
            )
            .attribute(
                AttributeSchema::new("VpcId", AttributeType::String)
                    .with_description("The ID of the VPC for the security group."),
            )
            .readable(["GroupId", "VpcId"]),
    )
}
