//! Position-tracking tree parser for CloudFormation JSON templates
//!
//! This crate turns a template buffer (or a prefix of one, for
//! parse-up-to-cursor use) into a [`TemplateTree`]: an arena of object,
//! array, field, index, and value nodes, each spanning its source text.
//! Alongside the tree the parser maintains a [`TemplatePath`] stack, so a
//! malformed document yields the exact path of the failure instead of a tree.
//!
//! ```
//! use cfn_template_toolkit_parser::parse_template;
//!
//! let outcome = parse_template(r#"{"Resources": {"B": {"Type": "AWS::S3::Bucket"}}}"#);
//! let tree = outcome.tree.expect("valid template");
//! let root = tree.root().unwrap();
//! let resources = tree.field(root, "Resources").unwrap();
//! let bucket = tree.field(resources, "B").unwrap();
//! assert_eq!(tree.path_of(bucket).to_string(), "ROOT/Resources/B,AWS::S3::Bucket/");
//! ```

mod node;
mod parser;
mod token;

pub use node::{NodeId, NodeKind, TemplateNode, TemplateTree};
pub use parser::{parse_template, ParseOutcome, TemplateParser};
pub use token::{Token, TokenKind, Tokenizer};

pub use cfn_template_toolkit_common::TemplatePath;
