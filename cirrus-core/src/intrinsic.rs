//! Intrinsic - Preview how the provisioning engine resolves rendered values
//!
//! Evaluates the wire form of a value (`Ref`, `Fn::GetAtt`, `Fn::FindInMap`,
//! `Fn::Join`, `Fn::Base64`) against caller-supplied bindings. Nothing is
//! provisioned; values the engine would only know after apply must be bound
//! explicitly.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as Json;

use crate::document::Document;
use crate::value::Pseudo;

/// Evaluation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("No value bound for Ref '{0}'")]
    UnboundReference(String),

    #[error("No value bound for attribute '{attribute}' of '{name}'")]
    UnboundAttribute { name: String, attribute: String },

    #[error("Mapping '{mapping}' has no entry for '{key}.{subkey}'")]
    MissingMappingEntry {
        mapping: String,
        key: String,
        subkey: String,
    },

    #[error("Malformed {function}: {message}")]
    Malformed {
        function: &'static str,
        message: String,
    },
}

/// Bindings for evaluating intrinsic functions
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    pseudo: HashMap<Pseudo, Json>,
    /// Values returned by `Ref` on parameters and resources
    refs: HashMap<String, Json>,
    attributes: HashMap<(String, String), Json>,
    mappings: HashMap<String, Json>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the mappings and parameter defaults declared in a document
    pub fn from_document(document: &Document) -> Self {
        let mut evaluator = Self::new();
        for (name, table) in document.mappings() {
            evaluator.mappings.insert(name.clone(), table.clone());
        }
        for (name, parameter) in document.parameters() {
            if let Some(default) = parameter.get("Default") {
                evaluator.refs.insert(name.clone(), default.clone());
            }
        }
        evaluator
    }

    pub fn with_pseudo(mut self, pseudo: Pseudo, value: impl Into<Json>) -> Self {
        self.pseudo.insert(pseudo, value.into());
        self
    }

    /// Bind what `Ref` yields for a parameter or resource
    pub fn with_ref(mut self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.refs.insert(name.into(), value.into());
        self
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<Json>,
    ) -> Self {
        self.attributes
            .insert((name.into(), attribute.into()), value.into());
        self
    }

    /// Resolve every intrinsic function inside a rendered value
    pub fn evaluate(&self, value: &Json) -> Result<Json, EvalError> {
        match value {
            Json::Object(map) if map.len() == 1 => {
                let (key, arg) = map.iter().next().ok_or_else(|| EvalError::Malformed {
                    function: "object",
                    message: "empty".to_string(),
                })?;
                match key.as_str() {
                    "Ref" => self.eval_ref(arg),
                    "Fn::GetAtt" => self.eval_get_att(arg),
                    "Fn::FindInMap" => self.eval_find_in_map(arg),
                    "Fn::Join" => self.eval_join(arg),
                    "Fn::Base64" => self.eval_base64(arg),
                    _ => Ok(Json::Object(
                        std::iter::once((key.clone(), self.evaluate(arg)?)).collect(),
                    )),
                }
            }
            Json::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), self.evaluate(v)?);
                }
                Ok(Json::Object(out))
            }
            Json::Array(items) => Ok(Json::Array(
                items
                    .iter()
                    .map(|v| self.evaluate(v))
                    .collect::<Result<_, _>>()?,
            )),
            literal => Ok(literal.clone()),
        }
    }

    fn eval_ref(&self, arg: &Json) -> Result<Json, EvalError> {
        let name = arg.as_str().ok_or_else(|| EvalError::Malformed {
            function: "Ref",
            message: format!("expected a name, got {}", arg),
        })?;
        let bound = match Pseudo::from_wire_name(name) {
            Some(pseudo) => self.pseudo.get(&pseudo),
            None => self.refs.get(name),
        };
        bound
            .cloned()
            .ok_or_else(|| EvalError::UnboundReference(name.to_string()))
    }

    fn eval_get_att(&self, arg: &Json) -> Result<Json, EvalError> {
        let [name, attribute] = string_args::<2>("Fn::GetAtt", arg)?;
        self.attributes
            .get(&(name.clone(), attribute.clone()))
            .cloned()
            .ok_or(EvalError::UnboundAttribute { name, attribute })
    }

    fn eval_find_in_map(&self, arg: &Json) -> Result<Json, EvalError> {
        let args = self.evaluate(arg)?;
        let [mapping, key, subkey] = string_args::<3>("Fn::FindInMap", &args)?;
        self.mappings
            .get(&mapping)
            .and_then(|table| table.get(&key))
            .and_then(|row| row.get(&subkey))
            .cloned()
            .ok_or(EvalError::MissingMappingEntry {
                mapping,
                key,
                subkey,
            })
    }

    fn eval_join(&self, arg: &Json) -> Result<Json, EvalError> {
        let malformed = |message: &str| EvalError::Malformed {
            function: "Fn::Join",
            message: message.to_string(),
        };
        let Some([separator, parts]) = arg
            .as_array()
            .and_then(|a| <&[Json; 2]>::try_from(a.as_slice()).ok())
        else {
            return Err(malformed("expected [separator, [parts...]]"));
        };
        let separator = separator
            .as_str()
            .ok_or_else(|| malformed("separator must be a string"))?;
        let parts = self.evaluate(parts)?;
        let parts = parts
            .as_array()
            .ok_or_else(|| malformed("parts must be a list"))?;

        let mut fragments = Vec::with_capacity(parts.len());
        for part in parts {
            let fragment = part
                .as_str()
                .ok_or_else(|| malformed(&format!("part {} is not a string", part)))?;
            fragments.push(fragment);
        }
        Ok(Json::String(fragments.join(separator)))
    }

    fn eval_base64(&self, arg: &Json) -> Result<Json, EvalError> {
        let inner = self.evaluate(arg)?;
        let text = inner.as_str().ok_or_else(|| EvalError::Malformed {
            function: "Fn::Base64",
            message: format!("expected a string, got {}", inner),
        })?;
        Ok(Json::String(STANDARD.encode(text)))
    }
}

/// Extract exactly `N` string arguments
fn string_args<const N: usize>(
    function: &'static str,
    arg: &Json,
) -> Result<[String; N], EvalError> {
    let malformed = || EvalError::Malformed {
        function,
        message: format!("expected {} string arguments, got {}", N, arg),
    };
    let items = arg.as_array().ok_or_else(malformed)?;
    let strings: Vec<String> = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<_>>()
        .ok_or_else(malformed)?;
    strings.try_into().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceGraph;
    use crate::resource::{Mapping, Resource};
    use crate::document::serialize;
    use crate::validator::{ValidatorConfig, validate};
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn region_lookup_resolves_through_mapping() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_mapping(Mapping::new("RegionMap").with_entry("us-west-2", "AMI", "ami-123"))
            .unwrap();
        graph
            .declare_resource(Resource::new("Web1", "AWS::EC2::Instance").with_property(
                "ImageId",
                Value::find_in_map("RegionMap", Pseudo::Region, "AMI"),
            ))
            .unwrap();

        let order = validate(&graph, ValidatorConfig::default()).unwrap();
        let document = serialize(&graph, &order);
        let image_id = &document.resource("Web1").unwrap()["Properties"]["ImageId"];

        let evaluator = Evaluator::from_document(&document).with_pseudo(Pseudo::Region, "us-west-2");
        assert_eq!(evaluator.evaluate(image_id), Ok(json!("ami-123")));

        let elsewhere = Evaluator::from_document(&document).with_pseudo(Pseudo::Region, "eu-west-1");
        assert!(matches!(
            elsewhere.evaluate(image_id),
            Err(EvalError::MissingMappingEntry { .. })
        ));
    }

    #[test]
    fn join_and_get_att() {
        let value = Value::join(
            "",
            [Value::from("http://"), Value::get_att("Web1", "PublicDnsName")],
        )
        .to_wire();

        let evaluator = Evaluator::new().with_attribute("Web1", "PublicDnsName", "ec2.example.com");
        assert_eq!(evaluator.evaluate(&value), Ok(json!("http://ec2.example.com")));

        assert_eq!(
            Evaluator::new().evaluate(&value),
            Err(EvalError::UnboundAttribute {
                name: "Web1".to_string(),
                attribute: "PublicDnsName".to_string(),
            })
        );
    }

    #[test]
    fn empty_join_stays_empty() {
        let value = Value::join("", Vec::<Value>::new()).to_wire();
        assert_eq!(Evaluator::new().evaluate(&value), Ok(json!("")));
    }

    #[test]
    fn base64_of_joined_script() {
        let value = Value::base64(Value::join(
            "",
            [Value::from("<script>\n"), Value::reference("KeyName"), Value::from("\n</script>")],
        ))
        .to_wire();

        let evaluator = Evaluator::new().with_ref("KeyName", "ops");
        let expected = STANDARD.encode("<script>\nops\n</script>");
        assert_eq!(evaluator.evaluate(&value), Ok(Json::String(expected)));
    }

    #[test]
    fn nested_values_are_resolved_in_place() {
        let value = Value::map([
            ("Name", Value::reference("AWS::StackName")),
            ("Ports", Value::list(["80", "443"])),
        ])
        .to_wire();

        let evaluator = Evaluator::new().with_pseudo(Pseudo::StackName, "prod");
        assert_eq!(
            evaluator.evaluate(&value),
            Ok(json!({ "Name": "prod", "Ports": ["80", "443"] }))
        );
        assert_eq!(
            Evaluator::new().evaluate(&value),
            Err(EvalError::UnboundReference("AWS::StackName".to_string()))
        );
    }

    #[test]
    fn malformed_join_is_reported() {
        let value = json!({ "Fn::Join": ["", [1, 2]] });
        assert!(matches!(
            Evaluator::new().evaluate(&value),
            Err(EvalError::Malformed { function: "Fn::Join", .. })
        ));
    }
}
