//! cfn-template-toolkit CLI
//!
//! Command-line front end for the template parser, validator, and
//! completion engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use cfn_template_toolkit_assist::CompletionEngine;
use cfn_template_toolkit_parser::{NodeKind, TemplateParser, TemplateTree};
use cfn_template_toolkit_schema::{loader, validate, Severity, TemplateSchema};

#[derive(Parser)]
#[command(name = "cfn-template-toolkit")]
#[command(version, about = "Parse, validate, and complete AWS CloudFormation templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a template and print its node outline
    #[command(after_help = "EXAMPLES:\n  \
        # Parse a full template\n  \
        cfn-template-toolkit parse --template stack.template\n\n  \
        # Parse only the first 120 bytes (editor prefix parse)\n  \
        cfn-template-toolkit parse --template stack.template --offset 120")]
    Parse {
        /// Path to the template file
        #[arg(short, long)]
        template: PathBuf,

        /// Parse only the buffer up to this byte offset
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Validate a template against the CloudFormation schema
    #[command(after_help = "EXAMPLES:\n  \
        # Validate against the bundled schema\n  \
        cfn-template-toolkit validate --template stack.template\n\n  \
        # Validate against a local schema document\n  \
        cfn-template-toolkit validate --template stack.template --schema CloudFormationV1.schema\n\n  \
        # Fetch the published schema, falling back to the bundled copy\n  \
        cfn-template-toolkit validate --template stack.template --schema-url")]
    Validate {
        /// Path to the template file
        #[arg(short, long)]
        template: PathBuf,

        /// Path to a local schema document
        #[arg(long, conflicts_with = "schema_url")]
        schema: Option<PathBuf>,

        /// Fetch the schema from a URL (the published location if no value
        /// is given), falling back to the bundled copy
        #[arg(long, num_args = 0..=1, default_missing_value = loader::DEFAULT_SCHEMA_URL)]
        schema_url: Option<String>,
    },

    /// List completion proposals for a cursor position
    #[command(after_help = "EXAMPLES:\n  \
        # Proposals for the cursor at byte 57\n  \
        cfn-template-toolkit complete --template stack.template --offset 57")]
    Complete {
        /// Path to the template file
        #[arg(short, long)]
        template: PathBuf,

        /// Cursor position as a byte offset
        #[arg(long)]
        offset: usize,

        /// Path to a local schema document
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// List the resource types the schema knows
    Types {
        /// Path to a local schema document
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { template, offset } => parse_command(&template, offset, cli.verbose),
        Commands::Validate {
            template,
            schema,
            schema_url,
        } => validate_command(&template, schema.as_deref(), schema_url.as_deref(), cli.verbose),
        Commands::Complete {
            template,
            offset,
            schema,
        } => complete_command(&template, offset, schema.as_deref(), cli.verbose),
        Commands::Types { schema } => types_command(schema.as_deref(), cli.verbose),
    }
}

/// Load the schema from the requested source (local file, URL with fallback,
/// or the bundled copy).
fn load_schema(schema: Option<&Path>, schema_url: Option<&str>) -> Result<TemplateSchema> {
    match (schema, schema_url) {
        (Some(path), _) => loader::from_file(path)
            .with_context(|| format!("Failed to load schema from {}", path.display())),
        (None, Some(url)) => {
            println!("{} Fetching schema from {}", "→".cyan(), url);
            loader::load_with_fallback(&loader::HttpSchemaSource::new(url))
                .context("Failed to load schema")
        }
        (None, None) => loader::bundled().context("Failed to load bundled schema"),
    }
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read template file {}", path.display()))
}

fn parse_command(template_path: &Path, offset: Option<usize>, verbose: bool) -> Result<()> {
    println!(
        "{} Parsing template: {}",
        "→".cyan(),
        template_path.display()
    );
    let text = read_template(template_path)?;
    let offset = offset.unwrap_or(text.len());

    let mut parser = TemplateParser::new();
    let outcome = parser.parse_prefix(&text, offset);

    match outcome.tree {
        Some(tree) => {
            println!("\n{}", "✓ Parse successful!".green().bold());
            println!(
                "  Nodes: {} ({} containers, {} values)",
                tree.len(),
                tree.container_count(),
                tree.leaf_count()
            );
            println!("\n{}", "Outline:".bold());
            if let Some(root) = tree.root() {
                print_outline(&tree, root, 1, verbose);
            }
            Ok(())
        }
        None => {
            let error = outcome
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown parse failure".to_string());
            println!("\n{} {}", "✗".red().bold(), error.red());
            println!("  At path: {}", outcome.path.to_string().yellow());
            anyhow::bail!("Template did not parse")
        }
    }
}

/// Print the container outline, one bullet per field or element.
fn print_outline(
    tree: &TemplateTree,
    node: cfn_template_toolkit_parser::NodeId,
    depth: usize,
    verbose: bool,
) {
    let indent = "  ".repeat(depth);
    match &tree.node(node).kind {
        NodeKind::Object { .. } => {
            for name in tree.field_names(node) {
                let Some(value) = tree.field(node, name) else {
                    continue;
                };
                let value_node = tree.node(value);
                let summary = match &value_node.kind {
                    NodeKind::Object { fields } => format!("object, {} fields", fields.len()),
                    NodeKind::Array { items } => format!("array, {} items", items.len()),
                    NodeKind::Value { text } if verbose => format!("\"{}\"", text),
                    NodeKind::Value { .. } => "value".to_string(),
                    _ => String::new(),
                };
                println!(
                    "{}• {} ({}, line {})",
                    indent,
                    name.cyan(),
                    summary,
                    value_node.start.line
                );
                print_outline(tree, value, depth + 1, verbose);
            }
        }
        NodeKind::Array { .. } => {
            for (index, item) in tree.items(node).into_iter().enumerate() {
                let item_node = tree.node(item);
                let summary = match &item_node.kind {
                    NodeKind::Object { fields } => format!("object, {} fields", fields.len()),
                    NodeKind::Array { items } => format!("array, {} items", items.len()),
                    NodeKind::Value { text } if verbose => format!("\"{}\"", text),
                    NodeKind::Value { .. } => "value".to_string(),
                    _ => String::new(),
                };
                println!("{}• [{}] ({})", indent, index, summary);
                print_outline(tree, item, depth + 1, verbose);
            }
        }
        _ => {}
    }
}

fn validate_command(
    template_path: &Path,
    schema_path: Option<&Path>,
    schema_url: Option<&str>,
    verbose: bool,
) -> Result<()> {
    println!(
        "{} Validating template: {}",
        "→".cyan(),
        template_path.display()
    );
    let text = read_template(template_path)?;
    let schema = load_schema(schema_path, schema_url)?;

    if verbose {
        println!("  Schema resource types: {}", schema.resource_type_names().len());
    }

    let mut parser = TemplateParser::new();
    let outcome = parser.parse(&text);
    let Some(tree) = outcome.tree else {
        let error = outcome
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown parse failure".to_string());
        println!("\n{} {}", "✗".red().bold(), error.red());
        println!("  At path: {}", outcome.path.to_string().yellow());
        anyhow::bail!("Template did not parse");
    };

    let diagnostics = validate(&tree, &schema);
    if diagnostics.is_empty() {
        println!("\n{}", "✓ No problems found".green().bold());
        return Ok(());
    }

    println!();
    let mut errors = 0;
    for diagnostic in &diagnostics {
        let (marker, label) = match diagnostic.severity {
            Severity::Error => {
                errors += 1;
                ("✗".red().bold(), "error".red().bold())
            }
            Severity::Warning => ("⚠".yellow(), "warning".yellow()),
        };
        println!(
            "{} {} line {}: {}",
            marker, label, diagnostic.start.line, diagnostic.message
        );
        if verbose {
            println!("    at {}", diagnostic.path.to_string().yellow());
        }
    }
    println!(
        "\n{} {} error(s), {} warning(s)",
        if errors > 0 { "✗".red().bold() } else { "⚠".yellow() },
        errors,
        diagnostics.len() - errors
    );

    if errors > 0 {
        anyhow::bail!("Validation failed with {} error(s)", errors);
    }
    Ok(())
}

fn complete_command(
    template_path: &Path,
    offset: usize,
    schema_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let text = read_template(template_path)?;
    let schema = load_schema(schema_path, None)?;

    let engine = CompletionEngine::new(&schema);
    let proposals = engine.complete(&text, offset);

    if proposals.is_empty() {
        println!("{} No proposals at offset {}", "⚠".yellow(), offset);
        return Ok(());
    }

    println!(
        "{} {} proposal(s) at offset {}:",
        "✓".green(),
        proposals.len(),
        offset
    );
    for proposal in &proposals {
        match &proposal.description {
            Some(description) if verbose => {
                println!("  • {} — {}", proposal.label.cyan(), description.dimmed())
            }
            _ => println!("  • {}", proposal.label.cyan()),
        }
    }
    Ok(())
}

fn types_command(schema_path: Option<&Path>, verbose: bool) -> Result<()> {
    let schema = load_schema(schema_path, None)?;

    let names = schema.resource_type_names();
    println!("{} {} resource types:", "✓".green(), names.len());
    for name in names {
        if verbose {
            let description = schema
                .resource_type(name)
                .and_then(|element| element.description.clone())
                .unwrap_or_default();
            println!("  • {} — {}", name.cyan(), description.dimmed());
        } else {
            println!("  • {}", name.cyan());
        }
    }
    Ok(())
}
