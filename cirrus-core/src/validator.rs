//! Validator - Check references and compute dependency order
//!
//! Walks every value of every resource and output, confirms each reference
//! targets a declaration of the right kind (or a pseudo-parameter), and orders
//! declarations so dependencies come first. All problems are collected before
//! returning so a single run reports every one of them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::{debug, info, warn};

use crate::graph::{DeclarationKind, ResourceGraph};
use crate::schema::{ResourceSchema, TypeError};
use crate::value::{Reference, Value};

/// Validator configuration
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    /// Treat dependency cycles as errors instead of warnings
    pub strict_cycles: bool,
}

/// Non-fatal report of a dependency cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWarning {
    /// Names in the cycle, in declaration order
    pub members: Vec<String>,
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency cycle between: {}", self.members.join(", "))
    }
}

/// Validation-time errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{from}' references '{to}', which is not declared")]
    UnresolvedReference { from: String, to: String },

    #[error("'{name}' references itself")]
    SelfReference { name: String },

    #[error("'{from}' references '{to}' as a {expected}, but it is declared as a {found}")]
    ReferenceKindMismatch {
        from: String,
        to: String,
        expected: &'static str,
        found: DeclarationKind,
    },

    #[error("'{from}' looks up key '{key}' which mapping '{mapping}' does not define")]
    UnknownMappingKey {
        from: String,
        mapping: String,
        key: String,
    },

    #[error("'{from}' reads attribute '{attribute}' which {kind} '{target}' does not expose")]
    UnknownAttribute {
        from: String,
        target: String,
        attribute: String,
        kind: String,
    },

    #[error("'{from}': {message}")]
    InvalidLiteral { from: String, message: String },

    #[error("{resource}: {error}")]
    Schema { resource: String, error: TypeError },

    #[error("Dependency cycle between: {}", members.join(", "))]
    Cycle { members: Vec<String> },
}

/// Outcome of a successful validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyOrder {
    order: Vec<String>,
    ranks: HashMap<String, usize>,
    /// Name -> names it depends on
    edges: BTreeMap<String, BTreeSet<String>>,
    warnings: Vec<CycleWarning>,
}

impl DependencyOrder {
    /// All logical names, dependencies before dependents
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Position of a name in the order
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.ranks.get(name).copied()
    }

    /// Names the given declaration depends on directly
    pub fn dependencies_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Names that depend directly on the given declaration
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.contains(name))
            .map(|(from, _)| from.as_str())
            .collect()
    }

    pub fn warnings(&self) -> &[CycleWarning] {
        &self.warnings
    }

    pub fn has_cycles(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validate a graph with the given configuration and no resource schemas
pub fn validate(
    graph: &ResourceGraph,
    config: ValidatorConfig,
) -> Result<DependencyOrder, Vec<ValidationError>> {
    Validator::new(config).validate(graph)
}

/// Reference and schema validator
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
    schemas: HashMap<String, ResourceSchema>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            schemas: HashMap::new(),
        }
    }

    /// Type check resources whose kind has one of these schemas
    pub fn with_schemas(mut self, schemas: impl IntoIterator<Item = ResourceSchema>) -> Self {
        for schema in schemas {
            self.schemas.insert(schema.resource_type.clone(), schema);
        }
        self
    }

    /// Replace the config, keeping registered schemas
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(
        &self,
        graph: &ResourceGraph,
    ) -> Result<DependencyOrder, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for parameter in graph.parameters() {
            let values = parameter.default.iter().chain(&parameter.allowed_values);
            for value in values {
                if !value.is_literal() {
                    errors.push(ValidationError::InvalidLiteral {
                        from: parameter.name.clone(),
                        message: "parameter values must be literals".to_string(),
                    });
                }
                check_literals(&parameter.name, value, &mut errors);
            }
        }

        for mapping in graph.mappings() {
            for value in mapping.table.values().flat_map(|row| row.values()) {
                if !value.is_literal() {
                    errors.push(ValidationError::InvalidLiteral {
                        from: mapping.name.clone(),
                        message: "mapping values must be literals".to_string(),
                    });
                }
                check_literals(&mapping.name, value, &mut errors);
            }
        }

        for resource in graph.resources() {
            let from = &resource.logical_name;
            let deps = edges.entry(from.clone()).or_default();
            for value in resource.values() {
                self.check_value(graph, from, value, deps, &mut errors);
            }
            for target in &resource.depends_on {
                self.check_depends_on(graph, from, target, deps, &mut errors);
            }

            if let Some(schema) = self.schemas.get(&resource.kind)
                && let Err(type_errors) = schema.validate(&resource.properties)
            {
                errors.extend(type_errors.into_iter().map(|error| ValidationError::Schema {
                    resource: from.clone(),
                    error,
                }));
            }
        }

        for output in graph.outputs() {
            let from = &output.name;
            let deps = edges.entry(from.clone()).or_default();
            for value in output.values() {
                self.check_value(graph, from, value, deps, &mut errors);
            }
        }

        // Unresolved references are reported once per (from, to) pair
        let mut seen = BTreeSet::new();
        errors.retain(|e| match e {
            ValidationError::UnresolvedReference { from, to } => {
                seen.insert((from.clone(), to.clone()))
            }
            _ => true,
        });

        let order = build_order(graph, edges);
        for warning in &order.warnings {
            if self.config.strict_cycles {
                errors.push(ValidationError::Cycle {
                    members: warning.members.clone(),
                });
            } else {
                warn!("{}", warning);
            }
        }

        if errors.is_empty() {
            info!(
                "validated {} declarations ({} cycle warnings)",
                order.order.len(),
                order.warnings.len()
            );
            Ok(order)
        } else {
            info!("validation failed with {} errors", errors.len());
            Err(errors)
        }
    }

    fn check_value(
        &self,
        graph: &ResourceGraph,
        from: &str,
        value: &Value,
        deps: &mut BTreeSet<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        check_literals(from, value, errors);

        for reference in value.references() {
            if reference.is_pseudo() {
                continue;
            }
            let to = reference.target();
            if to == from {
                errors.push(ValidationError::SelfReference {
                    name: from.to_string(),
                });
                continue;
            }
            let Some(found) = graph.declaration_kind(to) else {
                errors.push(ValidationError::UnresolvedReference {
                    from: from.to_string(),
                    to: to.to_string(),
                });
                continue;
            };

            let (allowed, expected): (&[DeclarationKind], &'static str) = match &reference {
                Reference::Name(_) => (
                    &[DeclarationKind::Parameter, DeclarationKind::Resource][..],
                    "parameter or resource",
                ),
                Reference::Attribute { .. } => (&[DeclarationKind::Resource][..], "resource"),
                Reference::Mapping(_) => (&[DeclarationKind::Mapping][..], "mapping"),
                Reference::Pseudo(_) => continue,
            };
            if !allowed.contains(&found) {
                errors.push(ValidationError::ReferenceKindMismatch {
                    from: from.to_string(),
                    to: to.to_string(),
                    expected,
                    found,
                });
                continue;
            }

            if let Reference::Attribute { attribute, .. } = &reference {
                self.check_attribute(graph, from, to, attribute, errors);
            }

            debug!("edge {} -> {}", from, to);
            deps.insert(to.to_string());
        }

        check_mapping_keys(graph, from, value, errors);
    }

    fn check_attribute(
        &self,
        graph: &ResourceGraph,
        from: &str,
        target: &str,
        attribute: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        let Some(kind) = graph.lookup_kind(target) else {
            return;
        };
        if let Some(schema) = self.schemas.get(kind)
            && !schema.readable.is_empty()
            && !schema.is_readable(attribute)
        {
            errors.push(ValidationError::UnknownAttribute {
                from: from.to_string(),
                target: target.to_string(),
                attribute: attribute.to_string(),
                kind: kind.to_string(),
            });
        }
    }

    fn check_depends_on(
        &self,
        graph: &ResourceGraph,
        from: &str,
        target: &str,
        deps: &mut BTreeSet<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        if target == from {
            errors.push(ValidationError::SelfReference {
                name: from.to_string(),
            });
            return;
        }
        match graph.declaration_kind(target) {
            None => errors.push(ValidationError::UnresolvedReference {
                from: from.to_string(),
                to: target.to_string(),
            }),
            Some(DeclarationKind::Resource) => {
                deps.insert(target.to_string());
            }
            Some(found) => errors.push(ValidationError::ReferenceKindMismatch {
                from: from.to_string(),
                to: target.to_string(),
                expected: "resource",
                found,
            }),
        }
    }
}

/// Report literals the wire format cannot represent
fn check_literals(from: &str, value: &Value, errors: &mut Vec<ValidationError>) {
    value.walk(&mut |v| match v {
        Value::Float(f) if !f.is_finite() => {
            errors.push(ValidationError::InvalidLiteral {
                from: from.to_string(),
                message: format!("number {} cannot be represented", f),
            });
        }
        // Would render as an intrinsic the validator never resolved
        Value::Map(map) => {
            for key in map.keys().filter(|k| is_intrinsic_key(k)) {
                errors.push(ValidationError::InvalidLiteral {
                    from: from.to_string(),
                    message: format!("literal map key '{}' is an intrinsic function", key),
                });
            }
        }
        _ => {}
    });
}

fn is_intrinsic_key(key: &str) -> bool {
    key == "Ref" || key.starts_with("Fn::")
}

/// Check literal `Fn::FindInMap` keys against the declared table
fn check_mapping_keys(
    graph: &ResourceGraph,
    from: &str,
    value: &Value,
    errors: &mut Vec<ValidationError>,
) {
    value.walk(&mut |v| {
        let Value::FindInMap {
            mapping,
            key,
            subkey,
        } = v
        else {
            return;
        };
        let (Some(table), Some(key)) = (graph.mapping(mapping), key.as_str()) else {
            return;
        };
        let unknown = match (table.table.get(key), subkey.as_str()) {
            (None, _) => Some(key.to_string()),
            (Some(row), Some(subkey)) if !row.contains_key(subkey) => {
                Some(format!("{}.{}", key, subkey))
            }
            _ => None,
        };
        if let Some(key) = unknown {
            errors.push(ValidationError::UnknownMappingKey {
                from: from.to_string(),
                mapping: mapping.clone(),
                key,
            });
        }
    });
}

/// Order every declaration so that dependencies come first
///
/// Ties are broken by declaration order. Declarations left over because they
/// sit on or behind a cycle are appended in declaration order.
fn build_order(graph: &ResourceGraph, edges: BTreeMap<String, BTreeSet<String>>) -> DependencyOrder {
    let names: Vec<&str> = graph.all_logical_names().collect();
    let index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (*n, i)).collect();

    let mut remaining: Vec<usize> = vec![0; names.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    for (from, deps) in &edges {
        let Some(&from_idx) = index.get(from.as_str()) else {
            continue;
        };
        for dep in deps {
            if let Some(&dep_idx) = index.get(dep.as_str()) {
                remaining[from_idx] += 1;
                dependents[dep_idx].push(from_idx);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..names.len()).filter(|&i| remaining[i] == 0).collect();
    let mut placed = vec![false; names.len()];
    let mut order = Vec::with_capacity(names.len());

    while let Some(next) = ready.pop_first() {
        placed[next] = true;
        order.push(names[next].to_string());
        for &dependent in &dependents[next] {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    let mut warnings = Vec::new();
    if order.len() < names.len() {
        let blocked: Vec<usize> = (0..names.len()).filter(|&i| !placed[i]).collect();
        for component in strongly_connected(&blocked, &edges, &names, &index) {
            if component.len() > 1 {
                warnings.push(CycleWarning {
                    members: component.iter().map(|&i| names[i].to_string()).collect(),
                });
            }
        }
        order.extend(blocked.iter().map(|&i| names[i].to_string()));
    }

    let ranks = order
        .iter()
        .enumerate()
        .map(|(rank, name)| (name.clone(), rank))
        .collect();

    DependencyOrder {
        order,
        ranks,
        edges,
        warnings,
    }
}

/// Tarjan's strongly connected components over the given nodes
///
/// Each component is sorted by declaration index; components are sorted by
/// their first member.
fn strongly_connected(
    nodes: &[usize],
    edges: &BTreeMap<String, BTreeSet<String>>,
    names: &[&str],
    index: &HashMap<&str, usize>,
) -> Vec<Vec<usize>> {
    struct Tarjan {
        adjacency: HashMap<usize, Vec<usize>>,
        counter: usize,
        indices: HashMap<usize, usize>,
        lowlink: HashMap<usize, usize>,
        stack: Vec<usize>,
        on_stack: BTreeSet<usize>,
        components: Vec<Vec<usize>>,
    }

    impl Tarjan {
        fn visit(&mut self, v: usize) {
            self.indices.insert(v, self.counter);
            self.lowlink.insert(v, self.counter);
            self.counter += 1;
            self.stack.push(v);
            self.on_stack.insert(v);

            let successors = self.adjacency.get(&v).cloned().unwrap_or_default();
            for w in successors {
                if !self.indices.contains_key(&w) {
                    self.visit(w);
                    let low = self.lowlink[&v].min(self.lowlink[&w]);
                    self.lowlink.insert(v, low);
                } else if self.on_stack.contains(&w) {
                    let low = self.lowlink[&v].min(self.indices[&w]);
                    self.lowlink.insert(v, low);
                }
            }

            if self.lowlink[&v] == self.indices[&v] {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(&w);
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                component.sort_unstable();
                self.components.push(component);
            }
        }
    }

    let members: BTreeSet<usize> = nodes.iter().copied().collect();
    let mut adjacency = HashMap::new();
    for &node in nodes {
        let successors: Vec<usize> = edges
            .get(names[node])
            .into_iter()
            .flatten()
            .filter_map(|dep| index.get(dep.as_str()).copied())
            .filter(|dep| members.contains(dep))
            .collect();
        adjacency.insert(node, successors);
    }

    let mut tarjan = Tarjan {
        adjacency,
        counter: 0,
        indices: HashMap::new(),
        lowlink: HashMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        components: Vec::new(),
    };
    for &node in nodes {
        if !tarjan.indices.contains_key(&node) {
            tarjan.visit(node);
        }
    }

    let mut components = tarjan.components;
    components.sort_by_key(|c| c[0]);
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Mapping, Output, Parameter, ParameterType, Resource};
    use crate::schema::{AttributeSchema, AttributeType};
    use crate::value::Pseudo;

    fn instance(name: &str) -> Resource {
        Resource::new(name, "AWS::EC2::Instance")
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(
                instance("Web1").with_property("UserData", Value::get_att("Web1", "PublicDnsName")),
            )
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::SelfReference {
                name: "Web1".to_string()
            }]
        );
    }

    #[test]
    fn chain_of_references_resolves() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(instance("A").with_property("X", Value::reference("B")))
            .unwrap();
        graph
            .declare_resource(instance("B").with_property("X", Value::get_att("C", "Arn")))
            .unwrap();
        graph.declare_resource(instance("C")).unwrap();

        let order = validate(&graph, ValidatorConfig::default()).unwrap();
        assert_eq!(order.order(), ["C", "B", "A"]);
        assert_eq!(order.rank("C"), Some(0));
        assert_eq!(order.dependencies_of("A").collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(order.dependents_of("C"), vec!["B"]);
        assert!(!order.has_cycles());
    }

    #[test]
    fn one_error_per_distinct_dangling_reference() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(
                instance("Web1")
                    .with_property("KeyName", Value::reference("KeyName"))
                    .with_property("Tags", Value::list([Value::reference("KeyName")]))
                    .with_property("Role", Value::get_att("Role", "Arn")),
            )
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::UnresolvedReference {
            from: "Web1".to_string(),
            to: "KeyName".to_string(),
        }));

        graph
            .declare_parameter(Parameter::new("KeyName", ParameterType::String))
            .unwrap();
        graph.declare_resource(Resource::new("Role", "AWS::IAM::Role")).unwrap();
        assert!(validate(&graph, ValidatorConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_are_accumulated() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(instance("A").with_property("X", Value::reference("Missing1")))
            .unwrap();
        graph
            .declare_resource(instance("B").with_property("X", Value::reference("B")))
            .unwrap();
        graph
            .declare_output(Output::new("Url", Value::get_att("Missing2", "Url")))
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn pseudo_parameters_need_no_declaration() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(instance("Web1").with_property(
                "UserData",
                Value::join(
                    "",
                    [
                        Value::reference("AWS::StackName"),
                        Value::Pseudo(Pseudo::Region),
                        Value::Pseudo(Pseudo::NotificationArns),
                    ],
                ),
            ))
            .unwrap();

        let order = validate(&graph, ValidatorConfig::default()).unwrap();
        assert_eq!(order.dependencies_of("Web1").count(), 0);
    }

    #[test]
    fn reference_kinds_are_checked() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_parameter(Parameter::new("KeyName", ParameterType::String))
            .unwrap();
        graph.declare_output(Output::new("Out", "x")).unwrap();
        graph
            .declare_resource(
                instance("Web1")
                    .with_property("A", Value::get_att("KeyName", "Arn"))
                    .with_property("B", Value::reference("Out"))
                    .with_property("C", Value::find_in_map("KeyName", "a", "b")),
            )
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ReferenceKindMismatch {
            from: "Web1".to_string(),
            to: "Out".to_string(),
            expected: "parameter or resource",
            found: DeclarationKind::Output,
        }));
    }

    #[test]
    fn literal_mapping_keys_are_checked() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_mapping(Mapping::new("RegionMap").with_entry("us-west-2", "AMI", "ami-1"))
            .unwrap();
        graph
            .declare_resource(
                instance("Web1")
                    .with_property("A", Value::find_in_map("RegionMap", Pseudo::Region, "AMI"))
                    .with_property("B", Value::find_in_map("RegionMap", "eu-west-1", "AMI"))
                    .with_property("C", Value::find_in_map("RegionMap", "us-west-2", "Kernel")),
            )
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownMappingKey {
                    from: "Web1".to_string(),
                    mapping: "RegionMap".to_string(),
                    key: "eu-west-1".to_string(),
                },
                ValidationError::UnknownMappingKey {
                    from: "Web1".to_string(),
                    mapping: "RegionMap".to_string(),
                    key: "us-west-2.Kernel".to_string(),
                },
            ]
        );
    }

    #[test]
    fn cycles_warn_by_default_and_fail_when_strict() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(instance("A").with_property("X", Value::get_att("B", "Id")))
            .unwrap();
        graph
            .declare_resource(instance("B").with_property("X", Value::get_att("A", "Id")))
            .unwrap();
        graph
            .declare_resource(instance("C").with_property("X", Value::reference("A")))
            .unwrap();
        graph.declare_resource(instance("D")).unwrap();

        let order = validate(&graph, ValidatorConfig::default()).unwrap();
        assert_eq!(
            order.warnings(),
            [CycleWarning {
                members: vec!["A".to_string(), "B".to_string()]
            }]
        );
        assert_eq!(order.order(), ["D", "A", "B", "C"]);

        let errors = validate(
            &graph,
            ValidatorConfig {
                strict_cycles: true,
            },
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Cycle {
                members: vec!["A".to_string(), "B".to_string()]
            }]
        );
    }

    #[test]
    fn depends_on_is_validated() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_parameter(Parameter::new("KeyName", ParameterType::String))
            .unwrap();
        graph
            .declare_resource(
                instance("Web1")
                    .with_depends_on("Db")
                    .with_depends_on("KeyName")
                    .with_depends_on("Web1"),
            )
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 3);

        let mut graph = ResourceGraph::new();
        graph.declare_resource(instance("Web1").with_depends_on("Db")).unwrap();
        graph.declare_resource(Resource::new("Db", "AWS::DynamoDB::Table")).unwrap();
        let order = validate(&graph, ValidatorConfig::default()).unwrap();
        assert_eq!(order.order(), ["Db", "Web1"]);
    }

    #[test]
    fn schemas_type_check_known_kinds() {
        let schema = ResourceSchema::new("AWS::SQS::Queue")
            .attribute(AttributeSchema::new("VisibilityTimeout", AttributeType::Int))
            .readable(["Arn", "QueueName"]);

        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(
                Resource::new("Queue", "AWS::SQS::Queue").with_property("VisibilityTimeout", "soon"),
            )
            .unwrap();
        graph
            .declare_resource(Resource::new("Custom", "Custom::Thing").with_property("Any", 1i64))
            .unwrap();
        graph
            .declare_output(Output::new("QueueUrl", Value::get_att("Queue", "Url")))
            .unwrap();

        let errors = Validator::new(ValidatorConfig::default())
            .with_schemas([schema])
            .validate(&graph)
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::Schema { .. }));
        assert!(matches!(errors[1], ValidationError::UnknownAttribute { .. }));
    }

    #[test]
    fn non_literal_parameter_defaults_and_bad_numbers_are_rejected() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_parameter(
                Parameter::new("Size", ParameterType::Number).with_default(Value::reference("Other")),
            )
            .unwrap();
        graph
            .declare_resource(instance("Web1").with_property("Weight", f64::NAN))
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, ValidationError::InvalidLiteral { .. }))
        );
    }

    #[test]
    fn literal_maps_cannot_smuggle_intrinsics() {
        let mut graph = ResourceGraph::new();
        graph
            .declare_resource(
                Resource::new("Web1", "X")
                    .with_property("Tags", Value::map([("Ref", "Missing")]))
                    .with_property(
                        "Nested",
                        Value::list([Value::map([("Fn::GetAtt", Value::list(["Db", "Arn"]))])]),
                    )
                    .with_property("Plain", Value::map([("Reference", "fine")])),
            )
            .unwrap();

        let errors = validate(&graph, ValidatorConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidLiteral {
                    from: "Web1".to_string(),
                    message: "literal map key 'Fn::GetAtt' is an intrinsic function".to_string(),
                },
                ValidationError::InvalidLiteral {
                    from: "Web1".to_string(),
                    message: "literal map key 'Ref' is an intrinsic function".to_string(),
                },
            ]
        );
    }
}
