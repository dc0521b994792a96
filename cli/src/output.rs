//! Output formatting for match results and leaf listings.

use usage_grammar_core::{Bindings, LeafNode};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats match bindings in the requested output format.
pub fn format_bindings(bindings: &Bindings, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(bindings)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(bindings).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(bindings_to_table(bindings)),
    }
}

/// Formats a leaf listing in the requested output format.
pub fn format_nodes(nodes: &[LeafNode], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(nodes)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(nodes).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(nodes_to_table(nodes)),
    }
}

fn bindings_to_table(bindings: &Bindings) -> String {
    let width = bindings.iter().map(|(name, _)| name.len()).max().unwrap_or(4);
    let mut out = String::new();
    for (name, value) in bindings {
        out.push_str(&format!("{name:<width$}  {value}\n"));
    }
    out
}

fn nodes_to_table(nodes: &[LeafNode]) -> String {
    let width = nodes.iter().map(|node| node.name.len()).max().unwrap_or(4);
    let mut out = String::new();
    for node in nodes {
        out.push_str(&format!(
            "{:<width$}  {:<8}  {:?}\n",
            node.name,
            format!("{:?}", node.kind).to_lowercase(),
            node.value_kind,
        ));
    }
    out
}
