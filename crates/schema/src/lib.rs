//! CloudFormation schema support for cfn-template-toolkit
//!
//! This crate owns everything schema-side: the serde model of the
//! `CloudFormationV1.schema` document, loading it (bundled copy, local file,
//! or URL fetch with fallback), resolving a [`TemplatePath`] to the
//! [`TemplateElement`] describing that position, and validating a parsed
//! template against the schema.
//!
//! The schema is plain data passed by reference into the resolver and
//! validator; there is no global singleton. Hosts load it once at startup:
//!
//! ```no_run
//! use cfn_template_toolkit_schema::loader;
//!
//! let schema = loader::load_default().expect("schema available");
//! println!("{} resource types", schema.resource_type_names().len());
//! ```

pub mod loader;
mod resolver;
mod types;
mod validator;

pub use resolver::SchemaResolver;
pub use types::{
    AllowedValue, ElementType, IntrinsicFunction, PseudoParameter, ReturnValue, TemplateElement,
    TemplateSchema,
};
pub use validator::{validate, Diagnostic, Severity};

pub use cfn_template_toolkit_common::TemplatePath;
