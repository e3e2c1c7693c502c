//! EC2 - Instances and security groups

use cirrus_core::resource::{Properties, ResourceKind};
use cirrus_core::value::Value;

use crate::utils::PropertyBag;

/// Key/value tag
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub key: String,
    pub value: Value,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<Tag> for Value {
    fn from(tag: Tag) -> Self {
        Value::map([("Key", Value::String(tag.key)), ("Value", tag.value)])
    }
}

/// Where traffic allowed by an ingress rule may come from
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSource {
    Cidr(String),
    /// Another security group, usually a `Ref` to a parameter or resource
    SecurityGroupId(Value),
}

/// Inbound security group rule
#[derive(Debug, Clone, PartialEq)]
pub struct IngressRule {
    pub ip_protocol: String,
    pub from_port: String,
    pub to_port: String,
    pub source: RuleSource,
}

impl IngressRule {
    /// Single TCP port
    pub fn tcp(port: u16, source: RuleSource) -> Self {
        Self::tcp_range(port, port, source)
    }

    pub fn tcp_range(from_port: u16, to_port: u16, source: RuleSource) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            from_port: from_port.to_string(),
            to_port: to_port.to_string(),
            source,
        }
    }
}

impl From<IngressRule> for Value {
    fn from(rule: IngressRule) -> Self {
        let (source_key, source) = match rule.source {
            RuleSource::Cidr(cidr) => ("CidrIp", Value::String(cidr)),
            RuleSource::SecurityGroupId(id) => ("SourceSecurityGroupId", id),
        };
        Value::map([
            ("IpProtocol", Value::String(rule.ip_protocol)),
            ("FromPort", Value::String(rule.from_port)),
            ("ToPort", Value::String(rule.to_port)),
            (source_key, source),
        ])
    }
}

/// AWS::EC2::SecurityGroup
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityGroup {
    pub group_description: String,
    pub ingress: Vec<IngressRule>,
    pub vpc_id: Option<Value>,
    pub tags: Vec<Tag>,
}

impl SecurityGroup {
    pub fn new(group_description: impl Into<String>) -> Self {
        Self {
            group_description: group_description.into(),
            ingress: Vec::new(),
            vpc_id: None,
            tags: Vec::new(),
        }
    }

    pub fn with_ingress(mut self, rule: IngressRule) -> Self {
        self.ingress.push(rule);
        self
    }

    pub fn with_vpc_id(mut self, vpc_id: impl Into<Value>) -> Self {
        self.vpc_id = Some(vpc_id.into());
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

impl ResourceKind for SecurityGroup {
    fn type_name(&self) -> &'static str {
        "AWS::EC2::SecurityGroup"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set("GroupDescription", self.group_description)
            .set_list("SecurityGroupIngress", self.ingress)
            .set_opt("VpcId", self.vpc_id)
            .set_list("Tags", self.tags)
            .build()
    }
}

/// AWS::EC2::Instance
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub image_id: Value,
    pub instance_type: String,
    pub key_name: Option<Value>,
    pub security_groups: Vec<Value>,
    pub iam_instance_profile: Option<Value>,
    /// Already encoded, typically `Value::base64` of a joined script
    pub user_data: Option<Value>,
    pub tags: Vec<Tag>,
}

impl Instance {
    pub fn new(image_id: impl Into<Value>, instance_type: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            key_name: None,
            security_groups: Vec::new(),
            iam_instance_profile: None,
            user_data: None,
            tags: Vec::new(),
        }
    }

    pub fn with_key_name(mut self, key_name: impl Into<Value>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    pub fn with_security_group(mut self, group: impl Into<Value>) -> Self {
        self.security_groups.push(group.into());
        self
    }

    pub fn with_iam_instance_profile(mut self, profile: impl Into<Value>) -> Self {
        self.iam_instance_profile = Some(profile.into());
        self
    }

    pub fn with_user_data(mut self, user_data: impl Into<Value>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

impl ResourceKind for Instance {
    fn type_name(&self) -> &'static str {
        "AWS::EC2::Instance"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set("ImageId", self.image_id)
            .set("InstanceType", self.instance_type)
            .set_opt("KeyName", self.key_name)
            .set_list("SecurityGroups", self.security_groups)
            .set_opt("IamInstanceProfile", self.iam_instance_profile)
            .set_opt("UserData", self.user_data)
            .set_list("Tags", self.tags)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn security_group_rules_keep_ports_as_strings() {
        let group = SecurityGroup::new("Web")
            .with_ingress(IngressRule::tcp(80, RuleSource::Cidr("0.0.0.0/0".to_string())))
            .with_ingress(IngressRule::tcp(
                10933,
                RuleSource::SecurityGroupId(Value::reference("OctopusSecurityGroupId")),
            ));
        assert_eq!(group.type_name(), "AWS::EC2::SecurityGroup");

        let properties = group.into_properties();
        assert_eq!(
            properties["SecurityGroupIngress"].to_wire(),
            json!([
                { "IpProtocol": "tcp", "FromPort": "80", "ToPort": "80", "CidrIp": "0.0.0.0/0" },
                {
                    "IpProtocol": "tcp",
                    "FromPort": "10933",
                    "ToPort": "10933",
                    "SourceSecurityGroupId": { "Ref": "OctopusSecurityGroupId" }
                }
            ])
        );
        assert!(!properties.contains_key("Tags"));
    }

    #[test]
    fn instance_properties() {
        let properties = Instance::new("ami-59f2d769", "t1.micro")
            .with_key_name(Value::reference("KeyName"))
            .with_security_group(Value::reference("Sg"))
            .with_tag(Tag::new("Name", "Server"))
            .into_properties();

        assert_eq!(
            Value::Map(properties).to_wire(),
            json!({
                "ImageId": "ami-59f2d769",
                "InstanceType": "t1.micro",
                "KeyName": { "Ref": "KeyName" },
                "SecurityGroups": [{ "Ref": "Sg" }],
                "Tags": [{ "Key": "Name", "Value": "Server" }]
            })
        );
    }

    #[test]
    fn port_range_inside_a_vpc() {
        let group = SecurityGroup::new("Ephemeral ports")
            .with_ingress(IngressRule::tcp_range(
                49152,
                65535,
                RuleSource::Cidr("10.0.0.0/16".to_string()),
            ))
            .with_vpc_id(Value::reference("Vpc"));

        let properties = group.into_properties();
        assert_eq!(properties["VpcId"], Value::reference("Vpc"));
        assert_eq!(
            properties["SecurityGroupIngress"].to_wire(),
            json!([{
                "IpProtocol": "tcp",
                "FromPort": "49152",
                "ToPort": "65535",
                "CidrIp": "10.0.0.0/16"
            }])
        );
        assert!(properties["VpcId"].referenced_names().contains("Vpc"));
    }
}
