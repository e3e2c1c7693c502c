//! IAM - Roles, instance profiles and policy documents
//!
//! Policy documents are shared with resource policies such as
//! [`crate::s3::BucketPolicy`].

use cirrus_core::resource::{Properties, ResourceKind};
use cirrus_core::value::Value;

use crate::utils::PropertyBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// Who a statement applies to
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Aws(Value),
    Service(Value),
}

impl From<Principal> for Value {
    fn from(principal: Principal) -> Self {
        match principal {
            Principal::Aws(v) => Value::map([("AWS", v)]),
            Principal::Service(v) => Value::map([("Service", v)]),
        }
    }
}

/// Policy statement
///
/// `Action` and `Resource` render exactly as given, so a single string and a
/// list of strings are both expressible.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sid: Option<String>,
    pub effect: Effect,
    pub principal: Option<Principal>,
    pub action: Value,
    pub resource: Option<Value>,
}

impl Statement {
    pub fn new(effect: Effect, action: impl Into<Value>) -> Self {
        Self {
            sid: None,
            effect,
            principal: None,
            action: action.into(),
            resource: None,
        }
    }

    pub fn allow(action: impl Into<Value>) -> Self {
        Self::new(Effect::Allow, action)
    }

    /// Allow a list of actions on a list of resources
    pub fn allow_all<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<Value>,
        R: IntoIterator,
        R::Item: Into<Value>,
    {
        Self::allow(Value::list(actions)).with_resource(Value::list(resources))
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_resource(mut self, resource: impl Into<Value>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

impl From<Statement> for Value {
    fn from(statement: Statement) -> Self {
        let mut entries = vec![
            ("Effect", Value::from(statement.effect.as_str())),
            ("Action", statement.action),
        ];
        if let Some(sid) = statement.sid {
            entries.push(("Sid", Value::String(sid)));
        }
        if let Some(principal) = statement.principal {
            entries.push(("Principal", principal.into()));
        }
        if let Some(resource) = statement.resource {
            entries.push(("Resource", resource));
        }
        Value::map(entries)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDocument {
    pub version: Option<String>,
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Trust policy letting an AWS service assume a role
    pub fn assume_role(service: impl Into<Value>) -> Self {
        Self::new().with_statement(
            Statement::allow("sts:AssumeRole").with_principal(Principal::Service(service.into())),
        )
    }
}

impl From<PolicyDocument> for Value {
    fn from(document: PolicyDocument) -> Self {
        let statements = Value::list(document.statements);
        match document.version {
            Some(version) => Value::map([
                ("Version", Value::String(version)),
                ("Statement", statements),
            ]),
            None => Value::map([("Statement", statements)]),
        }
    }
}

/// Inline policy attached to a role
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

impl Policy {
    pub fn new(policy_name: impl Into<String>, policy_document: PolicyDocument) -> Self {
        Self {
            policy_name: policy_name.into(),
            policy_document,
        }
    }
}

impl From<Policy> for Value {
    fn from(policy: Policy) -> Self {
        Value::map([
            ("PolicyName", Value::String(policy.policy_name)),
            ("PolicyDocument", policy.policy_document.into()),
        ])
    }
}

/// AWS::IAM::Role
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub assume_role_policy_document: PolicyDocument,
    pub path: Option<String>,
    pub policies: Vec<Policy>,
    pub managed_policy_arns: Vec<Value>,
}

impl Role {
    pub fn new(assume_role_policy_document: PolicyDocument) -> Self {
        Self {
            assume_role_policy_document,
            path: None,
            policies: Vec::new(),
            managed_policy_arns: Vec::new(),
        }
    }

    /// Role assumable by EC2 instances
    pub fn for_ec2() -> Self {
        Self::new(PolicyDocument::assume_role("ec2.amazonaws.com"))
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_managed_policy_arn(mut self, arn: impl Into<Value>) -> Self {
        self.managed_policy_arns.push(arn.into());
        self
    }
}

impl ResourceKind for Role {
    fn type_name(&self) -> &'static str {
        "AWS::IAM::Role"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set("AssumeRolePolicyDocument", self.assume_role_policy_document)
            .set_opt("Path", self.path)
            .set_list("Policies", self.policies)
            .set_list("ManagedPolicyArns", self.managed_policy_arns)
            .build()
    }
}

/// AWS::IAM::InstanceProfile
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceProfile {
    pub path: Option<String>,
    pub roles: Vec<Value>,
}

impl InstanceProfile {
    /// Profile wrapping a single role, usually a `Ref` to it
    pub fn for_role(role: impl Into<Value>) -> Self {
        Self {
            path: None,
            roles: vec![role.into()],
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl ResourceKind for InstanceProfile {
    fn type_name(&self) -> &'static str {
        "AWS::IAM::InstanceProfile"
    }

    fn into_properties(self) -> Properties {
        PropertyBag::new()
            .set_opt("Path", self.path)
            .set("Roles", Value::list(self.roles))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ec2_trust_policy() {
        let document: Value = PolicyDocument::assume_role("ec2.amazonaws.com").into();
        assert_eq!(
            document.to_wire(),
            json!({
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "ec2.amazonaws.com" },
                    "Action": "sts:AssumeRole"
                }]
            })
        );
    }

    #[test]
    fn role_with_inline_policy() {
        let role = Role::for_ec2().with_path("/").with_policy(Policy::new(
            "Queue",
            PolicyDocument::new().with_statement(Statement::allow_all(
                ["sqs:SendMessage"],
                [Value::get_att("Queue", "Arn")],
            )),
        ));
        assert_eq!(role.type_name(), "AWS::IAM::Role");

        let properties = role.into_properties();
        assert_eq!(properties["Path"], Value::from("/"));
        assert_eq!(
            properties["Policies"].to_wire(),
            json!([{
                "PolicyName": "Queue",
                "PolicyDocument": {
                    "Statement": [{
                        "Effect": "Allow",
                        "Action": ["sqs:SendMessage"],
                        "Resource": [{ "Fn::GetAtt": ["Queue", "Arn"] }]
                    }]
                }
            }])
        );
        assert!(properties["Policies"].referenced_names().contains("Queue"));
    }

    #[test]
    fn instance_profile_roles() {
        let properties = InstanceProfile::for_role(Value::reference("WebRole"))
            .with_path("/")
            .into_properties();
        assert_eq!(properties["Roles"], Value::list([Value::reference("WebRole")]));
    }

    #[test]
    fn versioned_document() {
        let document: Value = PolicyDocument::new()
            .with_version("2012-10-17")
            .with_statement(Statement::new(Effect::Deny, "s3:DeleteObject").with_resource("*"))
            .into();
        assert_eq!(document.to_wire()["Version"], json!("2012-10-17"));
        assert_eq!(document.to_wire()["Statement"][0]["Effect"], json!("Deny"));
    }
}
