//! lc - list controller CLI
//!
//! Loads rows from a JSON file and serves one page of them through a
//! `ListController`, the same way an application list view would.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use tracing::{debug, info};

use listctl::cli::{
    Cli, Command, OutputFormat, build_filter_data, render_page_json, render_page_text, render_values_text,
};
use listctl::config::ListConfig;
use listctl::fields::{FieldDescriptor, load_fields, resolve_defaults};
use listctl::{
    ChipSpec, ControllerOptions, FetchOutcome, Handler, JsonRow, ListController, SortItem,
    paginators::ArrayPaginator,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listctl")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("listctl.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ListConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Query {
            rows,
            fields,
            filters,
            sort,
            chips,
            search,
            limit,
            page,
            format,
        } => {
            let request = QueryRequest {
                rows,
                fields,
                filter_data: build_filter_data(&filters),
                sort,
                chips,
                search,
                limit,
                page,
            };
            cmd_query(&config, request, format).await
        }
        Command::Defaults {
            fields,
            payload,
            format,
        } => cmd_defaults(&fields, payload.as_deref(), format),
    }
}

struct QueryRequest {
    rows: PathBuf,
    fields: Option<PathBuf>,
    filter_data: Value,
    sort: Vec<SortItem>,
    chips: Vec<String>,
    search: Option<String>,
    limit: Option<usize>,
    page: Option<usize>,
}

/// Mount a controller over the row file and print the committed page
async fn cmd_query(config: &ListConfig, request: QueryRequest, format: OutputFormat) -> Result<()> {
    debug!(rows = %request.rows.display(), "cmd_query: called");
    let content = fs::read_to_string(&request.rows).context(format!("Failed to read {}", request.rows.display()))?;
    let rows: Vec<JsonRow> =
        serde_json::from_str(&content).context(format!("Failed to parse rows from {}", request.rows.display()))?;
    info!(count = rows.len(), "cmd_query: loaded rows");

    let fields = match &request.fields {
        Some(path) => load_fields(path)?,
        None => Vec::new(),
    };

    let mut options = ControllerOptions::from_config(config, Handler::new(ArrayPaginator::from_rows(rows)))
        .with_fields(fields)
        .with_filter_data(request.filter_data)
        .with_sort_model(request.sort)
        .with_chips(request.chips.into_iter().map(|name| ChipSpec::new(name, true)).collect());
    if let Some(search) = request.search {
        options = options.with_search(search);
    }
    if let Some(limit) = request.limit {
        if limit == 0 {
            return Err(eyre!("--limit must be at least 1"));
        }
        options = options.with_limit(limit);
    }
    if let Some(page) = request.page {
        options = options.with_page(page);
    }

    let (controller, outcome) = ListController::mount(options).await?;
    if let FetchOutcome::Failed(message) = outcome {
        controller.unmount().await?;
        return Err(eyre!("Query failed: {}", message));
    }

    let state = controller.get_state().await?;
    controller.unmount().await?;

    match format {
        OutputFormat::Text => print!("{}", render_page_text(&state)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_page_json(&state))?),
    }
    Ok(())
}

/// Print the default filter values of a schema
fn cmd_defaults(fields: &Path, payload: Option<&str>, format: OutputFormat) -> Result<()> {
    debug!(fields = %fields.display(), "cmd_defaults: called");
    let schema: Vec<FieldDescriptor> = load_fields(fields)?;
    let payload = match payload {
        Some(raw) => serde_json::from_str(raw).context("Failed to parse --payload as JSON")?,
        None => Value::Object(Default::default()),
    };

    let data = resolve_defaults(&schema, &payload);
    match format {
        OutputFormat::Text => print!("{}", render_values_text(&data)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
    }
    Ok(())
}
