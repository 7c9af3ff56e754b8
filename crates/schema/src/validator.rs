//! Schema-driven template validation
//!
//! Walks a parsed tree alongside the schema, mirroring the resolver's
//! descent rules, and reports property-level findings: missing required
//! properties, unknown fields, and values outside an element's allowed set.
//! A resource whose `Type` is unknown is checked against the generic
//! placeholder only — a wrong type string is an editing state, not a
//! cascade of spurious findings.

use cfn_template_toolkit_common::{Location, TemplatePath};
use cfn_template_toolkit_parser::{NodeId, TemplateTree};

use crate::types::{TemplateElement, TemplateSchema};

/// How severe a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding, anchored to the node it concerns.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub path: TemplatePath,
    pub start: Location,
    pub end: Location,
}

/// Validate a parsed template against a schema.
pub fn validate(tree: &TemplateTree, schema: &TemplateSchema) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if let Some(root) = tree.root() {
        check_object(tree, root, schema.root_element(), &mut diagnostics);
    }
    diagnostics
}

fn diagnostic(
    tree: &TemplateTree,
    node: NodeId,
    severity: Severity,
    message: String,
) -> Diagnostic {
    let n = tree.node(node);
    Diagnostic {
        severity,
        message,
        path: tree.path_of(node),
        start: n.start,
        end: n.end,
    }
}

fn check_object(
    tree: &TemplateTree,
    object: NodeId,
    element: &TemplateElement,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if !tree.node(object).is_object() {
        return;
    }

    let field_names = tree.field_names(object);

    // Required properties must be present.
    if let Some(properties) = &element.properties {
        for (name, property) in properties {
            if property.is_required() && !field_names.contains(&name.as_str()) {
                diagnostics.push(diagnostic(
                    tree,
                    object,
                    Severity::Error,
                    format!("missing required property \"{}\"", name),
                ));
            }
        }
    }

    let has_fixed_properties = element.properties.is_some();
    for name in field_names {
        let Some(value) = tree.field(object, name) else {
            continue;
        };
        match child_element(tree, element, name, value) {
            Some(child) => check_value(tree, value, child, diagnostics),
            None => {
                // Free-form elements (Json, scalar wrappers holding an
                // intrinsic call) validate nothing; intrinsic keys are
                // always legal.
                if has_fixed_properties && !is_intrinsic(name) {
                    diagnostics.push(diagnostic(
                        tree,
                        value,
                        Severity::Warning,
                        format!("unknown property \"{}\"", name),
                    ));
                }
            }
        }
    }
}

fn is_intrinsic(name: &str) -> bool {
    name == "Ref" || name.starts_with("Fn::")
}

/// The schema element governing `value` stored under `name`, following the
/// resolver's descent rules. `None` means the field is unknown.
fn child_element<'a>(
    tree: &TemplateTree,
    element: &'a TemplateElement,
    name: &str,
    value: NodeId,
) -> Option<&'a TemplateElement> {
    if let Some(property) = element.property(name) {
        return Some(property);
    }
    if let Some(default) = element.default_child_schema.as_deref() {
        return Some(default);
    }
    if element.child_schemas.is_some() {
        // Discriminated entry: select by the value's own Type field.
        let selected = tree
            .field(value, "Type")
            .and_then(|type_node| tree.node(type_node).value_text())
            .and_then(|type_text| element.child_schema(type_text));
        return Some(selected.unwrap_or_else(|| TemplateElement::generic_resource()));
    }
    None
}

fn check_value(
    tree: &TemplateTree,
    value: NodeId,
    element: &TemplateElement,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let node = tree.node(value);
    if node.is_object() {
        check_object(tree, value, element, diagnostics);
    } else if node.is_array() {
        for item in tree.items(value) {
            // Array members share the element's own property map.
            check_value(tree, item, element, diagnostics);
        }
    } else if let Some(text) = node.value_text() {
        check_allowed_values(tree, value, text, element, diagnostics);
    }
}

fn check_allowed_values(
    tree: &TemplateTree,
    value: NodeId,
    text: &str,
    element: &TemplateElement,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(allowed) = &element.allowed_values else {
        return;
    };
    if allowed.iter().any(|candidate| candidate.value == text) {
        return;
    }
    let expected: Vec<&str> = allowed.iter().map(|c| c.value.as_str()).collect();
    diagnostics.push(diagnostic(
        tree,
        value,
        Severity::Warning,
        format!(
            "value \"{}\" is not one of the allowed values ({})",
            text,
            expected.join(", ")
        ),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;
    use cfn_template_toolkit_parser::parse_template;

    fn parsed(template: &str) -> TemplateTree {
        parse_template(template).tree.expect("test template parses")
    }

    fn bundled() -> TemplateSchema {
        loader::bundled().expect("bundled schema")
    }

    #[test]
    fn test_valid_template_has_no_findings() {
        let tree = parsed(
            r#"{
            "Resources": {
                "B": {
                    "Type": "AWS::S3::Bucket",
                    "Properties": {"BucketName": "my-bucket", "AccessControl": "Private"}
                }
            }
        }"#,
        );
        let diagnostics = validate(&tree, &bundled());
        assert!(diagnostics.is_empty(), "unexpected findings: {:?}", diagnostics);
    }

    #[test]
    fn test_missing_required_type_is_an_error() {
        let tree = parsed(r#"{"Resources": {"B": {"Properties": {}}}}"#);
        let diagnostics = validate(&tree, &bundled());
        assert!(diagnostics.iter().any(|d| {
            d.severity == Severity::Error && d.message.contains("\"Type\"")
        }));
    }

    #[test]
    fn test_unknown_property_is_a_warning() {
        let tree = parsed(
            r#"{
            "Resources": {
                "B": {"Type": "AWS::S3::Bucket", "Properties": {"NotARealProperty": 1}}
            }
        }"#,
        );
        let diagnostics = validate(&tree, &bundled());
        let finding = diagnostics
            .iter()
            .find(|d| d.message.contains("NotARealProperty"))
            .expect("unknown property reported");
        assert_eq!(finding.severity, Severity::Warning);
        assert!(finding
            .path
            .to_string()
            .starts_with("ROOT/Resources/B,AWS::S3::Bucket/Properties/"));
    }

    #[test]
    fn test_disallowed_value_is_a_warning() {
        let tree = parsed(
            r#"{
            "Resources": {
                "B": {"Type": "AWS::S3::Bucket", "Properties": {"AccessControl": "Sneaky"}}
            }
        }"#,
        );
        let diagnostics = validate(&tree, &bundled());
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("\"Sneaky\"") && d.severity == Severity::Warning));
    }

    #[test]
    fn test_unknown_resource_type_checks_generic_shape_only() {
        let tree = parsed(
            r#"{
            "Resources": {
                "X": {"Type": "Custom::Widget", "AnythingGoes": {"Free": "form"}}
            }
        }"#,
        );
        let diagnostics = validate(&tree, &bundled());
        // The generic placeholder knows only Type, so the extra field is
        // flagged, but nothing inside it is descended into.
        assert_eq!(
            diagnostics
                .iter()
                .filter(|d| d.message.contains("AnythingGoes"))
                .count(),
            1
        );
        assert!(!diagnostics.iter().any(|d| d.message.contains("Free")));
    }

    #[test]
    fn test_intrinsic_function_objects_are_not_value_checked() {
        // AccessControl via Fn::If: an object where a scalar is expected
        // must not trip the allowed-values check.
        let tree = parsed(
            r#"{
            "Resources": {
                "B": {
                    "Type": "AWS::S3::Bucket",
                    "Properties": {"AccessControl": {"Fn::If": ["IsProd", "Private", "PublicRead"]}}
                }
            }
        }"#,
        );
        let diagnostics = validate(&tree, &bundled());
        assert!(!diagnostics
            .iter()
            .any(|d| d.message.contains("allowed values")));
    }

    #[test]
    fn test_nested_required_properties() {
        let tree = parsed(
            r#"{
            "Resources": {
                "B": {
                    "Type": "AWS::S3::Bucket",
                    "Properties": {"VersioningConfiguration": {}}
                }
            }
        }"#,
        );
        let diagnostics = validate(&tree, &bundled());
        assert!(diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("\"Status\"")));
    }
}
