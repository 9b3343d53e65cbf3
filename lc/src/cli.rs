//! CLI command definitions and output rendering

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::controller::ControllerState;
use crate::domain::{JsonRow, SortItem};
use crate::fields::set;

/// lc - drive a debounced list controller from the command line
#[derive(Parser)]
#[command(
    name = "lc",
    about = "Query paginated, filterable row sets through a list controller",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one page of a JSON row file
    Query {
        /// JSON file holding an array of rows, each with an `id`
        #[arg(short, long)]
        rows: PathBuf,

        /// Field schema (YAML or JSON) providing default filter values
        #[arg(long)]
        fields: Option<PathBuf>,

        /// Filter value as key=value (dotted keys nest); repeatable
        #[arg(short, long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,

        /// Sort item as field or field:asc|desc; repeatable, first wins
        #[arg(short, long)]
        sort: Vec<SortItem>,

        /// Enable a chip (rows with a truthy field of that name); repeatable
        #[arg(long = "chip")]
        chips: Vec<String>,

        /// Search string
        #[arg(long)]
        search: Option<String>,

        /// Rows per page (defaults to config)
        #[arg(long)]
        limit: Option<usize>,

        /// Page index (defaults to config)
        #[arg(short, long)]
        page: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the default filter values of a field schema
    Defaults {
        /// Field schema (YAML or JSON)
        #[arg(long)]
        fields: PathBuf,

        /// Payload JSON passed to computed defaults
        #[arg(long)]
        payload: Option<String>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },
}

/// Output format for query results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Parse `key=value`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid filter '{}': expected key=value", s)),
    }
}

/// Build filter data from `key=value` pairs
///
/// Values that parse as JSON scalars (numbers, booleans) keep their type;
/// everything else is a string.
pub fn build_filter_data(filters: &[(String, String)]) -> Value {
    let mut data = Value::Object(Map::new());
    for (key, raw) in filters {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
            _ => Value::String(raw.clone()),
        };
        set(&mut data, key, value);
    }
    data
}

/// Text rendering of a committed page
pub fn render_page_text(state: &ControllerState<JsonRow>) -> String {
    let total = state
        .total()
        .map(|total| total.to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut out = format!(
        "{} {} {}\n",
        format!("page {}", state.page()).bold(),
        format!("rows {}-{}", state.offset(), state.offset() + state.rows().len()).dimmed(),
        format!("of {}", total).dimmed(),
    );
    for row in state.rows() {
        let fields = Value::Object(row.fields.clone());
        out.push_str(&format!("{} {}\n", row.id.to_string().yellow(), fields));
    }
    out
}

/// JSON rendering of a committed page
pub fn render_page_json(state: &ControllerState<JsonRow>) -> Value {
    json!({
        "page": state.page(),
        "limit": state.limit(),
        "offset": state.offset(),
        "total": state.total(),
        "hasMore": state.has_more(),
        "rows": state.rows(),
    })
}

/// `path = value` lines for every leaf of `data`
pub fn render_values_text(data: &Value) -> String {
    let mut lines = Vec::new();
    collect_leaves(data, String::new(), &mut lines);
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

fn collect_leaves(value: &Value, prefix: String, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_leaves(child, path, lines);
            }
        }
        leaf if !prefix.is_empty() => lines.push(format!("{} = {}", prefix, leaf)),
        _ => {}
    }
}
