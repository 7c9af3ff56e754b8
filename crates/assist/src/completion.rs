//! Completion proposals
//!
//! Computes content-assist proposals for a cursor position: attribute names
//! when the cursor sits inside an object, allowed values (including resource
//! type names) when it sits in a value position. The cursor path comes from
//! parsing the buffer prefix up to the cursor; the schema element for that
//! path decides what is offered.

use cfn_template_toolkit_common::TemplatePath;
use cfn_template_toolkit_parser::{NodeId, TemplateParser, TemplateTree};
use cfn_template_toolkit_schema::{
    AllowedValue, ElementType, SchemaResolver, TemplateElement, TemplateSchema,
};
use log::debug;

use crate::document::{
    read_to_next_char, read_to_previous_char, read_to_previous_quote,
    read_to_previous_unmatched_open_brace,
};

/// One completion proposal.
///
/// `insertion_text` replaces `replacement_length` bytes starting at
/// `replacement_offset`; `cursor_offset` is where the cursor lands within
/// the inserted text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionProposal {
    pub label: String,
    pub insertion_text: String,
    pub replacement_offset: usize,
    pub replacement_length: usize,
    pub cursor_offset: usize,
    pub description: Option<String>,
}

/// Schema-driven completion engine.
pub struct CompletionEngine<'a> {
    schema: &'a TemplateSchema,
}

impl<'a> CompletionEngine<'a> {
    pub fn new(schema: &'a TemplateSchema) -> Self {
        CompletionEngine { schema }
    }

    /// Compute proposals for the cursor at byte `offset`.
    pub fn complete(&self, text: &str, offset: usize) -> Vec<CompletionProposal> {
        let mut parser = TemplateParser::new();
        let outcome = parser.parse_prefix(text, offset);
        let cursor_path = outcome.path;

        let resolver = SchemaResolver::new(self.schema);
        let Ok(element) = resolver.resolve(&cursor_path) else {
            debug!("no schema element for cursor path {}", cursor_path);
            return Vec::new();
        };

        // The prefix of the string being typed.
        let Some(string_to_replace) = read_to_previous_quote(text, offset) else {
            return Vec::new();
        };
        // Scan from just before the opening quote of that string.
        let Some(scan_position) = offset
            .checked_sub(string_to_replace.len())
            .and_then(|p| p.checked_sub(1))
        else {
            return Vec::new();
        };

        let previous_char = read_to_previous_char(text, scan_position);
        let unmatched_brace = read_to_previous_unmatched_open_brace(text, scan_position);

        let mut proposals = Vec::new();
        if previous_char == Some(':') || unmatched_brace == Some('[') {
            self.value_proposals(
                text,
                offset,
                element,
                &cursor_path,
                &string_to_replace,
                &mut proposals,
            );
        } else if unmatched_brace == Some('{') {
            self.attribute_proposals(
                text,
                offset,
                element,
                &cursor_path,
                &string_to_replace,
                &mut proposals,
            );
        }
        proposals
    }

    /// Field-name proposals for the object containing the cursor.
    fn attribute_proposals(
        &self,
        text: &str,
        offset: usize,
        element: &TemplateElement,
        cursor_path: &TemplatePath,
        string_to_replace: &str,
        proposals: &mut Vec<CompletionProposal>,
    ) {
        let Some(properties) = &element.properties else {
            return;
        };

        let existing = self.existing_fields(text, cursor_path);
        let prefix = string_to_replace.to_lowercase();

        // The closing quote, if already typed, is replaced along with the
        // prefix.
        let mut replacement_length = string_to_replace.len();
        if read_to_next_char(text, offset) == Some('"') {
            replacement_length += 1;
        }

        for (name, property) in properties {
            if existing.contains(name) {
                continue;
            }
            if !name.to_lowercase().starts_with(&prefix) {
                continue;
            }

            let (snippet, back) = property
                .element_type
                .map(|t| t.insertion_snippet())
                .unwrap_or(("", 0));
            let insertion_text = format!("{}\" : {}", name, snippet);
            let cursor_offset = insertion_text.len() - back;

            proposals.push(CompletionProposal {
                label: name.clone(),
                insertion_text,
                replacement_offset: offset - string_to_replace.len(),
                replacement_length,
                cursor_offset,
                description: property.description.clone(),
            });
        }
    }

    /// Value proposals: booleans, allowed values, or resource type names.
    fn value_proposals(
        &self,
        _text: &str,
        offset: usize,
        element: &TemplateElement,
        cursor_path: &TemplatePath,
        string_to_replace: &str,
        proposals: &mut Vec<CompletionProposal>,
    ) {
        let allowed: Vec<AllowedValue> = if element.element_type == Some(ElementType::Boolean) {
            vec![AllowedValue::new("true"), AllowedValue::new("false")]
        } else if let Some(values) = &element.allowed_values {
            values.clone()
        } else if cursor_path.len() > 2
            && cursor_path.last().and_then(|s| s.field_name()) == Some("Type")
        {
            // Typing a resource's Type: offer the discriminator keys of the
            // element two levels up (the Resources section).
            self.resource_type_values(cursor_path)
        } else {
            Vec::new()
        };

        let prefix = string_to_replace.to_lowercase();
        for candidate in allowed {
            if !candidate.value.to_lowercase().starts_with(&prefix) {
                continue;
            }
            proposals.push(CompletionProposal {
                label: candidate.value.clone(),
                insertion_text: candidate.value.clone(),
                replacement_offset: offset - string_to_replace.len(),
                replacement_length: string_to_replace.len(),
                cursor_offset: candidate.value.len(),
                description: candidate.display_label,
            });
        }
    }

    fn resource_type_values(
        &self,
        cursor_path: &TemplatePath,
    ) -> Vec<AllowedValue> {
        let parent_path = cursor_path.truncated(cursor_path.len() - 2);
        let resolver = SchemaResolver::new(self.schema);
        let Ok(parent) = resolver.resolve(&parent_path) else {
            return Vec::new();
        };
        let Some(child_schemas) = &parent.child_schemas else {
            return Vec::new();
        };
        child_schemas
            .iter()
            .map(|(key, child)| AllowedValue {
                value: key.clone(),
                display_label: child
                    .property("Type")
                    .and_then(|t| t.description.clone())
                    .or_else(|| child.description.clone()),
            })
            .collect()
    }

    /// Field names already present in the object at the cursor path, taken
    /// from a full-buffer parse when one succeeds.
    fn existing_fields(
        &self,
        text: &str,
        cursor_path: &TemplatePath,
    ) -> Vec<String> {
        let outcome = TemplateParser::new().parse(text);
        let Some(tree) = outcome.tree else {
            return Vec::new();
        };
        let Some(node) = tree.lookup(cursor_path) else {
            return Vec::new();
        };
        object_field_names(&tree, node)
    }
}

fn object_field_names(tree: &TemplateTree, node: NodeId) -> Vec<String> {
    tree.field_names(node)
        .into_iter()
        .map(str::to_string)
        .collect()
}
