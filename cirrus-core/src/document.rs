//! Document - Render a validated graph into a template document
//!
//! Sections always appear in the same order and entries keep their declaration
//! order, so output is stable and diffs read naturally. The dependency order is
//! only consulted for cycle warnings; the provisioning engine derives its own
//! ordering from the references.

use std::string::FromUtf8Error;

use log::info;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, json};

use crate::graph::ResourceGraph;
use crate::resource::{Mapping, Output, Parameter, Resource};
use crate::validator::{CycleWarning, DependencyOrder};

/// Template format version understood by the provisioning engine
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Errors while writing a document out
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

type Entries = Vec<(String, serde_json::Value)>;

/// A rendered template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    description: Option<String>,
    parameters: Entries,
    mappings: Entries,
    resources: Entries,
    outputs: Entries,
    warnings: Vec<CycleWarning>,
}

impl Document {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[(String, serde_json::Value)] {
        &self.parameters
    }

    pub fn mappings(&self) -> &[(String, serde_json::Value)] {
        &self.mappings
    }

    pub fn resources(&self) -> &[(String, serde_json::Value)] {
        &self.resources
    }

    pub fn outputs(&self) -> &[(String, serde_json::Value)] {
        &self.outputs
    }

    pub fn resource(&self, name: &str) -> Option<&serde_json::Value> {
        find(&self.resources, name)
    }

    pub fn output(&self, name: &str) -> Option<&serde_json::Value> {
        find(&self.outputs, name)
    }

    /// Cycle warnings carried over from validation
    pub fn warnings(&self) -> &[CycleWarning] {
        &self.warnings
    }

    /// Pretty-printed JSON with a four-space indent
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Single-line JSON
    pub fn to_json_compact(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The document as a JSON value (object keys sorted)
    pub fn to_value(&self) -> serde_json::Value {
        let section = |entries: &Entries| {
            serde_json::Value::Object(entries.iter().cloned().collect::<Map<_, _>>())
        };
        let mut doc = Map::new();
        doc.insert("AWSTemplateFormatVersion".to_string(), json!(FORMAT_VERSION));
        if let Some(description) = &self.description {
            doc.insert("Description".to_string(), json!(description));
        }
        doc.insert("Parameters".to_string(), section(&self.parameters));
        doc.insert("Mappings".to_string(), section(&self.mappings));
        doc.insert("Conditions".to_string(), json!({}));
        doc.insert("Resources".to_string(), section(&self.resources));
        doc.insert("Outputs".to_string(), section(&self.outputs));
        serde_json::Value::Object(doc)
    }
}

fn find<'a>(entries: &'a Entries, name: &str) -> Option<&'a serde_json::Value> {
    entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

/// Map whose entries serialize in the order given
struct Section<'a>(&'a [(String, serde_json::Value)]);

impl Serialize for Section<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("AWSTemplateFormatVersion", FORMAT_VERSION)?;
        if let Some(description) = &self.description {
            map.serialize_entry("Description", description)?;
        }
        map.serialize_entry("Parameters", &Section(&self.parameters))?;
        map.serialize_entry("Mappings", &Section(&self.mappings))?;
        map.serialize_entry("Conditions", &Section(&[]))?;
        map.serialize_entry("Resources", &Section(&self.resources))?;
        map.serialize_entry("Outputs", &Section(&self.outputs))?;
        map.end()
    }
}

/// Render a validated graph
///
/// Entries follow declaration order; `order` contributes only its warnings.
pub fn serialize(graph: &ResourceGraph, order: &DependencyOrder) -> Document {
    let document = Document {
        description: None,
        parameters: graph
            .parameters()
            .iter()
            .map(|p| (p.name.clone(), render_parameter(p)))
            .collect(),
        mappings: graph
            .mappings()
            .iter()
            .map(|m| (m.name.clone(), render_mapping(m)))
            .collect(),
        resources: graph
            .resources()
            .iter()
            .map(|r| (r.logical_name.clone(), render_resource(r)))
            .collect(),
        outputs: graph
            .outputs()
            .iter()
            .map(|o| (o.name.clone(), render_output(o)))
            .collect(),
        warnings: order.warnings().to_vec(),
    };
    info!(
        "serialized {} parameters, {} mappings, {} resources, {} outputs",
        document.parameters.len(),
        document.mappings.len(),
        document.resources.len(),
        document.outputs.len()
    );
    document
}

fn render_parameter(parameter: &Parameter) -> serde_json::Value {
    let mut out = Map::new();
    out.insert("Type".to_string(), json!(parameter.param_type.wire_name()));
    if !parameter.description.is_empty() {
        out.insert("Description".to_string(), json!(parameter.description));
    }
    if let Some(default) = &parameter.default {
        out.insert("Default".to_string(), default.to_wire());
    }
    if parameter.no_echo {
        out.insert("NoEcho".to_string(), json!(true));
    }
    if !parameter.allowed_values.is_empty() {
        let values = parameter.allowed_values.iter().map(|v| v.to_wire()).collect();
        out.insert("AllowedValues".to_string(), serde_json::Value::Array(values));
    }
    serde_json::Value::Object(out)
}

fn render_mapping(mapping: &Mapping) -> serde_json::Value {
    let table = mapping
        .table
        .iter()
        .map(|(key, row)| {
            let row: Map<_, _> = row.iter().map(|(k, v)| (k.clone(), v.to_wire())).collect();
            (key.clone(), serde_json::Value::Object(row))
        })
        .collect();
    serde_json::Value::Object(table)
}

fn render_resource(resource: &Resource) -> serde_json::Value {
    let mut out = Map::new();
    out.insert("Type".to_string(), json!(resource.kind));
    if !resource.properties.is_empty() {
        let properties = resource
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_wire()))
            .collect();
        out.insert("Properties".to_string(), serde_json::Value::Object(properties));
    }
    if let Some(metadata) = &resource.metadata {
        out.insert("Metadata".to_string(), metadata.to_wire());
    }
    if !resource.depends_on.is_empty() {
        out.insert("DependsOn".to_string(), json!(resource.depends_on));
    }
    serde_json::Value::Object(out)
}

fn render_output(output: &Output) -> serde_json::Value {
    let mut out = Map::new();
    if !output.description.is_empty() {
        out.insert("Description".to_string(), json!(output.description));
    }
    out.insert("Value".to_string(), output.value.to_wire());
    if let Some(name) = &output.export_name {
        out.insert("Export".to_string(), json!({ "Name": name.to_wire() }));
    }
    serde_json::Value::Object(out)
}
