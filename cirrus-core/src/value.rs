//! Value - Literals and the symbolic reference algebra
//!
//! A `Value` is either a literal or an expression that the provisioning engine
//! resolves at apply time. Reference nodes only carry names; they are looked up
//! against the graph during validation, never at construction, so forward
//! references and any declaration order are fine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::json;

/// Well-known pseudo-parameters resolved by the provisioning engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pseudo {
    Region,
    AccountId,
    StackName,
    NotificationArns,
}

impl Pseudo {
    pub const ALL: [Pseudo; 4] = [
        Pseudo::Region,
        Pseudo::AccountId,
        Pseudo::StackName,
        Pseudo::NotificationArns,
    ];

    /// Name used on the wire (e.g., "AWS::Region")
    pub fn wire_name(&self) -> &'static str {
        match self {
            Pseudo::Region => "AWS::Region",
            Pseudo::AccountId => "AWS::AccountId",
            Pseudo::StackName => "AWS::StackName",
            Pseudo::NotificationArns => "AWS::NotificationARNs",
        }
    }

    /// Recognize a pseudo-parameter by its wire name
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wire_name() == name)
    }
}

impl fmt::Display for Pseudo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A property value: a literal, or a node of the reference algebra
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// By-name reference to a parameter or resource (`Ref`)
    Ref(String),
    /// Attribute of a resource (`Fn::GetAtt`), as (logical_name, attribute_name)
    GetAtt(String, String),
    /// Pseudo-parameter such as the current region
    Pseudo(Pseudo),
    /// Two-level lookup into a declared mapping (`Fn::FindInMap`)
    ///
    /// Both keys are expressions; the subkey in particular is often a pseudo-parameter.
    FindInMap {
        mapping: String,
        key: Box<Value>,
        subkey: Box<Value>,
    },
    /// Ordered concatenation of literal and symbolic fragments (`Fn::Join`)
    Join { separator: String, parts: Vec<Value> },
    /// Base64 encoding of the inner value (`Fn::Base64`)
    Base64(Box<Value>),
}

/// A dependency carried by a value, typed by how it is used
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    /// `Ref` to a parameter or resource
    Name(String),
    /// `Fn::GetAtt` on a resource
    Attribute { target: String, attribute: String },
    /// The table named by `Fn::FindInMap`
    Mapping(String),
    Pseudo(Pseudo),
}

impl Reference {
    /// The logical name (or pseudo-parameter wire name) this reference targets
    pub fn target(&self) -> &str {
        match self {
            Reference::Name(name) => name,
            Reference::Attribute { target, .. } => target,
            Reference::Mapping(name) => name,
            Reference::Pseudo(p) => p.wire_name(),
        }
    }

    pub fn is_pseudo(&self) -> bool {
        matches!(self, Reference::Pseudo(_))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Name(name) => write!(f, "Ref({})", name),
            Reference::Attribute { target, attribute } => {
                write!(f, "GetAtt({}.{})", target, attribute)
            }
            Reference::Mapping(name) => write!(f, "FindInMap({})", name),
            Reference::Pseudo(p) => write!(f, "Ref({})", p),
        }
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Value::Ref(name.into())
    }

    pub fn get_att(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Value::GetAtt(name.into(), attribute.into())
    }

    pub fn find_in_map(
        mapping: impl Into<String>,
        key: impl Into<Value>,
        subkey: impl Into<Value>,
    ) -> Self {
        Value::FindInMap {
            mapping: mapping.into(),
            key: Box::new(key.into()),
            subkey: Box::new(subkey.into()),
        }
    }

    pub fn join<I, V>(separator: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Join {
            separator: separator.into(),
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn base64(value: impl Into<Value>) -> Self {
        Value::Base64(Box::new(value.into()))
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the string contents if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Visit this value and every nested value, parents before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Value)) {
        visit(self);
        match self {
            Value::List(items) => items.iter().for_each(|v| v.walk(visit)),
            Value::Map(map) => map.values().for_each(|v| v.walk(visit)),
            Value::FindInMap { key, subkey, .. } => {
                key.walk(visit);
                subkey.walk(visit);
            }
            Value::Join { parts, .. } => parts.iter().for_each(|v| v.walk(visit)),
            Value::Base64(inner) => inner.walk(visit),
            _ => {}
        }
    }

    /// True if no reference node appears anywhere in this value
    pub fn is_literal(&self) -> bool {
        let mut literal = true;
        self.walk(&mut |v| {
            if matches!(
                v,
                Value::Ref(_)
                    | Value::GetAtt(..)
                    | Value::Pseudo(_)
                    | Value::FindInMap { .. }
                    | Value::Join { .. }
                    | Value::Base64(_)
            ) {
                literal = false;
            }
        });
        literal
    }

    /// All references carried by this value, typed by use
    pub fn references(&self) -> BTreeSet<Reference> {
        let mut refs = BTreeSet::new();
        self.walk(&mut |v| match v {
            Value::Ref(name) => {
                let reference = match Pseudo::from_wire_name(name) {
                    Some(p) => Reference::Pseudo(p),
                    None => Reference::Name(name.clone()),
                };
                refs.insert(reference);
            }
            Value::GetAtt(target, attribute) => {
                refs.insert(Reference::Attribute {
                    target: target.clone(),
                    attribute: attribute.clone(),
                });
            }
            Value::Pseudo(p) => {
                refs.insert(Reference::Pseudo(*p));
            }
            Value::FindInMap { mapping, .. } => {
                refs.insert(Reference::Mapping(mapping.clone()));
            }
            _ => {}
        });
        refs
    }

    /// Logical names and pseudo-parameter names this value depends on
    pub fn referenced_names(&self) -> BTreeSet<String> {
        self.references()
            .iter()
            .map(|r| r.target().to_string())
            .collect()
    }

    /// Render into the provisioning engine's wire representation
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            Value::String(s) => json!(s),
            Value::Int(n) => json!(n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => json!(b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_wire).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_wire())).collect(),
            ),
            Value::Ref(name) => json!({ "Ref": name }),
            Value::GetAtt(target, attribute) => json!({ "Fn::GetAtt": [target, attribute] }),
            Value::Pseudo(p) => json!({ "Ref": p.wire_name() }),
            Value::FindInMap {
                mapping,
                key,
                subkey,
            } => json!({ "Fn::FindInMap": [mapping, key.to_wire(), subkey.to_wire()] }),
            Value::Join { parts, .. } if parts.is_empty() => json!(""),
            Value::Join { separator, parts } => {
                let parts: Vec<_> = parts.iter().map(Value::to_wire).collect();
                json!({ "Fn::Join": [separator, parts] })
            }
            Value::Base64(inner) => json!({ "Fn::Base64": inner.to_wire() }),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Pseudo> for Value {
    fn from(p: Pseudo) -> Self {
        Value::Pseudo(p)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
