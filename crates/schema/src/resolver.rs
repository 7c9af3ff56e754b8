//! Path-driven schema lookup
//!
//! Walks the schema element tree along a [`TemplatePath`] to find the
//! element describing the addressed node. Resource schemas are selected by
//! the discriminator parameter the parser attached to the resource's path
//! segment (its `Type` value); a resource whose type is not yet known
//! resolves to the generic placeholder element instead of failing, since an
//! unresolved type is a normal state while the user is still typing it.

use cfn_template_toolkit_common::{PathSegment, Result, TemplateError, TemplatePath};

use crate::types::{TemplateElement, TemplateSchema};

/// Resolves template paths against a schema document.
pub struct SchemaResolver<'a> {
    schema: &'a TemplateSchema,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schema: &'a TemplateSchema) -> Self {
        SchemaResolver { schema }
    }

    /// Find the schema element for the node at `path`.
    pub fn resolve(&self, path: &TemplatePath) -> Result<&'a TemplateElement> {
        let mut element = self.schema.root_element();

        for segment in path.segments() {
            element = match segment {
                PathSegment::Root => element,
                PathSegment::Index(_) => {
                    // Arrays of named sub-objects are addressed by field, not
                    // by position: index segments pass through array-shaped
                    // elements unchanged.
                    if element.is_array_like() {
                        element
                    } else {
                        return Err(self.not_found(path));
                    }
                }
                PathSegment::Field { name, params } => {
                    if let Some(property) = element.property(name) {
                        property
                    } else if let Some(default) = element.default_child_schema.as_deref() {
                        default
                    } else if element.child_schemas.is_some() {
                        match params.first() {
                            Some(param) => element
                                .child_schema(param)
                                .unwrap_or_else(|| TemplateElement::generic_resource()),
                            None => TemplateElement::generic_resource(),
                        }
                    } else {
                        return Err(self.not_found(path));
                    }
                }
            };
        }

        Ok(element)
    }

    fn not_found(&self, path: &TemplatePath) -> TemplateError {
        TemplateError::SchemaElementNotFound {
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfn_template_toolkit_common::PathSegment;

    fn test_schema() -> TemplateSchema {
        serde_json::from_str(
            r#"{
            "root-schema-object": {
                "type": "Object",
                "properties": {
                    "Description": {"type": "String"},
                    "Resources": {
                        "type": "Object",
                        "required": "true",
                        "schema-lookup-property": "Type",
                        "child-schemas": {
                            "AWS::S3::Bucket": {
                                "type": "Resource",
                                "description": "An S3 bucket",
                                "properties": {
                                    "Type": {"type": "String", "required": "true"},
                                    "Properties": {
                                        "type": "Object",
                                        "properties": {
                                            "BucketName": {"type": "String"}
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "Parameters": {
                        "type": "Object",
                        "default-child-schema": {
                            "type": "Object",
                            "properties": {
                                "Type": {"type": "String", "required": "true"},
                                "Default": {"type": "String"}
                            }
                        }
                    },
                    "Tags": {
                        "type": "Array",
                        "properties": {
                            "Key": {"type": "String"}
                        }
                    }
                }
            }
        }"#,
        )
        .unwrap()
    }

    fn path(segments: Vec<PathSegment>) -> TemplatePath {
        segments.into()
    }

    #[test]
    fn test_resolve_fixed_property() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![PathSegment::Root, PathSegment::field("Description")]))
            .unwrap();
        assert_eq!(element.element_type, Some(crate::types::ElementType::String));
    }

    #[test]
    fn test_resolve_resource_by_type_parameter() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Resources"),
                PathSegment::field_with_param("B", "AWS::S3::Bucket"),
            ]))
            .unwrap();
        assert_eq!(element.description.as_deref(), Some("An S3 bucket"));
    }

    #[test]
    fn test_resolve_into_resource_properties() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Resources"),
                PathSegment::field_with_param("B", "AWS::S3::Bucket"),
                PathSegment::field("Properties"),
                PathSegment::field("BucketName"),
            ]))
            .unwrap();
        assert_eq!(element.element_type, Some(crate::types::ElementType::String));
    }

    #[test]
    fn test_unknown_type_resolves_to_generic_placeholder() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Resources"),
                PathSegment::field_with_param("B", "Custom::DoesNotExist"),
            ]))
            .unwrap();
        assert!(std::ptr::eq(element, TemplateElement::generic_resource()));
    }

    #[test]
    fn test_untyped_resource_resolves_to_generic_placeholder() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Resources"),
                PathSegment::field("B"),
            ]))
            .unwrap();
        assert!(std::ptr::eq(element, TemplateElement::generic_resource()));
    }

    #[test]
    fn test_default_child_schema_matches_any_key() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Parameters"),
                PathSegment::field("AnyParameterName"),
                PathSegment::field("Default"),
            ]))
            .unwrap();
        assert_eq!(element.element_type, Some(crate::types::ElementType::String));
    }

    #[test]
    fn test_array_element_skips_index_segments() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let element = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Tags"),
                PathSegment::Index(3),
                PathSegment::field("Key"),
            ]))
            .unwrap();
        assert_eq!(element.element_type, Some(crate::types::ElementType::String));
    }

    #[test]
    fn test_unknown_field_fails() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let err = resolver
            .resolve(&path(vec![PathSegment::Root, PathSegment::field("Nope")]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::SchemaElementNotFound { .. }));
    }

    #[test]
    fn test_index_into_non_array_fails() {
        let schema = test_schema();
        let resolver = SchemaResolver::new(&schema);
        let err = resolver
            .resolve(&path(vec![
                PathSegment::Root,
                PathSegment::field("Description"),
                PathSegment::Index(0),
            ]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::SchemaElementNotFound { .. }));
    }
}
