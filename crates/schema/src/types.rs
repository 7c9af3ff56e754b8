//! CloudFormation schema document type definitions
//!
//! These types mirror the structure of the published
//! `CloudFormationV1.schema` document: a root schema object describing the
//! template's top-level shape, plus the intrinsic-function and
//! pseudo-parameter catalogs. All keys in the document are kebab-case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Root schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSchema {
    /// Shape of the template's root object
    #[serde(rename = "root-schema-object")]
    root_schema_object: TemplateElement,

    /// Intrinsic functions (Ref, Fn::GetAtt, ...), keyed by name
    #[serde(rename = "intrinsic-functions", default)]
    intrinsic_functions: BTreeMap<String, IntrinsicFunction>,

    /// Pseudo parameters (AWS::Region, AWS::AccountId, ...), keyed by name
    #[serde(rename = "pseudo-parameters", default)]
    pseudo_parameters: BTreeMap<String, PseudoParameter>,
}

impl TemplateSchema {
    /// The element describing the template root object.
    pub fn root_element(&self) -> &TemplateElement {
        &self.root_schema_object
    }

    pub fn intrinsic_functions(&self) -> &BTreeMap<String, IntrinsicFunction> {
        &self.intrinsic_functions
    }

    pub fn pseudo_parameters(&self) -> &BTreeMap<String, PseudoParameter> {
        &self.pseudo_parameters
    }

    /// The resource type names this schema knows: the child-schema keys of
    /// the root's `Resources` property.
    pub fn resource_type_names(&self) -> Vec<&str> {
        self.root_schema_object
            .property("Resources")
            .and_then(|resources| resources.child_schemas.as_ref())
            .map(|schemas| schemas.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The child schema registered for a resource type, if any.
    pub fn resource_type(&self, type_name: &str) -> Option<&TemplateElement> {
        self.root_schema_object
            .property("Resources")
            .and_then(|resources| resources.child_schema(type_name))
    }
}

/// A union type for all kinds of template element
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateElement {
    /// Declared shape of this element
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,

    /// String-typed in the document: "true", "false", or "Json"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "allowed-values", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<AllowedValue>>,

    #[serde(rename = "disable-refs", default, skip_serializing_if = "Option::is_none")]
    pub disable_refs: Option<bool>,

    #[serde(rename = "disable-functions", default, skip_serializing_if = "Option::is_none")]
    pub disable_functions: Option<bool>,

    /// Element type of array members, for array-shaped elements
    #[serde(rename = "array-type", default, skip_serializing_if = "Option::is_none")]
    pub array_type: Option<String>,

    /// Field whose value selects among `child-schemas` (e.g. `Type`)
    #[serde(
        rename = "schema-lookup-property",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_lookup_property: Option<String>,

    /// Resource types a Ref to this element may target
    #[serde(rename = "resource-ref-type", default, skip_serializing_if = "Option::is_none")]
    pub resource_ref_type: Option<Vec<String>>,

    /// Values available through Fn::GetAtt on this element
    #[serde(rename = "return-values", default, skip_serializing_if = "Option::is_none")]
    pub return_values: Option<Vec<ReturnValue>>,

    /// Child schemas keyed by discriminator value
    #[serde(rename = "child-schemas", default, skip_serializing_if = "Option::is_none")]
    pub child_schemas: Option<BTreeMap<String, TemplateElement>>,

    /// Schema shared by every key of a homogeneous map
    #[serde(
        rename = "default-child-schema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_child_schema: Option<Box<TemplateElement>>,

    /// Fixed property map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, TemplateElement>>,
}

impl TemplateElement {
    /// Whether this element's `required` flag is the literal "true".
    pub fn is_required(&self) -> bool {
        self.required.as_deref() == Some("true")
    }

    /// Whether this element is array-shaped (`Array` or `Named-Array`).
    pub fn is_array_like(&self) -> bool {
        matches!(
            self.element_type,
            Some(ElementType::Array) | Some(ElementType::NamedArray)
        )
    }

    /// Look up a fixed property by name.
    pub fn property(&self, name: &str) -> Option<&TemplateElement> {
        self.properties.as_ref().and_then(|map| map.get(name))
    }

    /// Look up a child schema by discriminator value.
    pub fn child_schema(&self, key: &str) -> Option<&TemplateElement> {
        self.child_schemas.as_ref().and_then(|map| map.get(key))
    }

    /// The shared placeholder element returned when a resource's schema is
    /// not known: an object whose only property is a required string `Type`.
    pub fn generic_resource() -> &'static TemplateElement {
        static GENERIC: OnceLock<TemplateElement> = OnceLock::new();
        GENERIC.get_or_init(|| {
            let type_property = TemplateElement {
                element_type: Some(ElementType::String),
                required: Some("true".to_string()),
                ..Default::default()
            };
            let mut properties = BTreeMap::new();
            properties.insert("Type".to_string(), type_property);
            TemplateElement {
                element_type: Some(ElementType::Object),
                properties: Some(properties),
                ..Default::default()
            }
        })
    }
}

/// Declared shape of a template element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    Array,
    Boolean,
    ConditionDeclaration,
    ConditionDefinitions,
    Json,
    #[serde(rename = "Named-Array")]
    NamedArray,
    Number,
    Object,
    Policy,
    Reference,
    Resource,
    String,
}

impl ElementType {
    /// Text inserted when a property of this type is completed, and the
    /// backwards offset (from the end of the insertion) where the cursor
    /// should land.
    pub fn insertion_snippet(&self) -> (&'static str, usize) {
        match self {
            ElementType::Object
            | ElementType::Resource
            | ElementType::Json
            | ElementType::Policy
            | ElementType::ConditionDefinitions => ("{}", 1),
            ElementType::Array | ElementType::NamedArray => ("[]", 1),
            ElementType::String
            | ElementType::Reference
            | ElementType::ConditionDeclaration => ("\"\"", 1),
            ElementType::Number | ElementType::Boolean => ("", 0),
        }
    }
}

/// One allowed value of an enumerated element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    pub value: String,

    #[serde(rename = "display-label", default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
}

impl AllowedValue {
    pub fn new(value: impl Into<String>) -> Self {
        AllowedValue {
            value: value.into(),
            display_label: None,
        }
    }
}

/// A value available through Fn::GetAtt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnValue {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A pseudo parameter such as AWS::Region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudoParameter {
    #[serde(rename = "type")]
    pub parameter_type: String,

    pub description: String,
}

/// An intrinsic function such as Ref or Fn::GetAtt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrinsicFunction {
    /// Human-readable description of the expected argument
    pub parameter: String,

    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_kebab_case_keys() {
        let json = r#"{
            "root-schema-object": {
                "type": "Object",
                "properties": {
                    "Resources": {
                        "type": "Object",
                        "required": "true",
                        "schema-lookup-property": "Type",
                        "child-schemas": {
                            "AWS::S3::Bucket": {"type": "Resource", "description": "bucket"}
                        }
                    }
                }
            },
            "intrinsic-functions": {
                "Ref": {"parameter": "logical name", "description": "References a value"}
            },
            "pseudo-parameters": {
                "AWS::Region": {"type": "String", "description": "The region"}
            }
        }"#;

        let schema: TemplateSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.resource_type_names(), vec!["AWS::S3::Bucket"]);
        assert!(schema.intrinsic_functions().contains_key("Ref"));
        assert!(schema.pseudo_parameters().contains_key("AWS::Region"));

        let resources = schema.root_element().property("Resources").unwrap();
        assert!(resources.is_required());
        assert_eq!(resources.schema_lookup_property.as_deref(), Some("Type"));
    }

    #[test]
    fn test_named_array_type_round_trips() {
        let element: TemplateElement =
            serde_json::from_str(r#"{"type": "Named-Array"}"#).unwrap();
        assert!(element.is_array_like());
        let json = serde_json::to_string(&element).unwrap();
        assert!(json.contains("Named-Array"));
    }

    #[test]
    fn test_generic_resource_shape() {
        let generic = TemplateElement::generic_resource();
        let type_property = generic.property("Type").expect("generic has Type");
        assert!(type_property.is_required());
        assert_eq!(type_property.element_type, Some(ElementType::String));
    }
}
