//! Editing assistance for CloudFormation templates
//!
//! Combines the prefix parser and the schema into cursor-aware tooling: the
//! [`CompletionEngine`] produces content-assist proposals for a byte offset
//! in a template buffer, and the [`document`] module holds the character
//! scans it uses to classify the cursor context.

pub mod document;

mod completion;

pub use completion::{CompletionEngine, CompletionProposal};
