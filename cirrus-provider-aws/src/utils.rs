//! Helpers for turning typed kind records into property bags

use cirrus_core::resource::Properties;
use cirrus_core::value::Value;

/// Collects typed fields into a property bag, leaving unset fields out
#[derive(Debug, Default)]
pub struct PropertyBag {
    properties: Properties,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn set_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Set a list property; an empty list is left out
    pub fn set_list<V: Into<Value>>(self, key: &str, items: Vec<V>) -> Self {
        if items.is_empty() {
            self
        } else {
            self.set(key, Value::list(items))
        }
    }

    pub fn build(self) -> Properties {
        self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_left_out() {
        let properties = PropertyBag::new()
            .set("Path", "/")
            .set_opt("RoleName", None::<String>)
            .set_list("Roles", Vec::<Value>::new())
            .set_list("ManagedPolicyArns", vec!["arn:aws:iam::aws:policy/ReadOnlyAccess"])
            .build();

        assert_eq!(properties.len(), 2);
        assert_eq!(properties["Path"], Value::from("/"));
        assert_eq!(
            properties["ManagedPolicyArns"],
            Value::list(["arn:aws:iam::aws:policy/ReadOnlyAccess"])
        );
    }
}
