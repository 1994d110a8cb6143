//! CLI entry point for the storefront API client.
//!
//! Issues GET/POST/PUT/DELETE calls against the configured storefront API and
//! manages the stored access token those calls authenticate with.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use storefront_client::config::ServiceConfig;
use storefront_client::infra::storage::{FileTokenStore, TokenProvider};
use storefront_client::output::print_json;
use storefront_client::services::{Attachment, BaseService, FormData, Params};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Call the storefront API from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// Query parameter as key=value; repeat a key to send a list
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Send the request as multipart form data instead of JSON
    #[arg(long, default_value_t = false)]
    attachment: bool,
}

#[derive(Args)]
struct BodyArgs {
    /// JSON request body
    #[arg(short, long, value_name = "JSON")]
    data: Option<String>,

    /// File to upload as FIELD=PATH; implies --attachment
    #[arg(short = 'f', long = "file", value_name = "FIELD=PATH", value_parser = parse_key_value)]
    files: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource
    Get {
        path: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// POST a JSON body or form
    Post {
        path: String,
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// PUT a JSON body or form
    Update {
        path: String,
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// DELETE a resource
    Remove {
        path: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Print whether a token is stored
    Show,
    /// Store a new access token
    Set { value: String },
    /// Remove the stored access token
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/storefront.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("storefront.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::from_env()?;

    match cli.command {
        Commands::Token { action } => {
            let store = FileTokenStore::new(&config.storage_path);
            match action {
                TokenAction::Show => match store.current_token() {
                    Some(token) => info!(path = %store.path().display(), length = token.len(), "Access token stored"),
                    None => info!(path = %store.path().display(), "No access token stored"),
                },
                TokenAction::Set { value } => {
                    store.set(&value)?;
                    info!(path = %store.path().display(), "Access token saved");
                }
                TokenAction::Clear => {
                    store.clear()?;
                    info!(path = %store.path().display(), "Access token cleared");
                }
            }
        }
        command => {
            let service = BaseService::from_config(&config)?;
            let response = call(&service, command).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}

/// Runs one verb subcommand and returns the decoded response body.
#[tracing::instrument(skip_all)]
async fn call(service: &BaseService, command: Commands) -> Result<Value> {
    match command {
        Commands::Get { path, query } => {
            let params = to_params(&query);
            service.get(&path, params.as_ref(), query.attachment).await
        }
        Commands::Remove { path, query } => {
            let params = to_params(&query);
            service.remove(&path, params.as_ref(), query.attachment).await
        }
        Commands::Post { path, query, body } => {
            let params = to_params(&query);
            let payload = parse_body(&body)?;
            if body.files.is_empty() {
                service
                    .post(&path, &payload, params.as_ref(), query.attachment)
                    .await
            } else {
                let form = build_form(&payload, &body.files)?;
                service.post_form(&path, form, params.as_ref()).await
            }
        }
        Commands::Update { path, query, body } => {
            let params = to_params(&query);
            let payload = parse_body(&body)?;
            if body.files.is_empty() {
                service
                    .update(&path, &payload, params.as_ref(), query.attachment)
                    .await
            } else {
                let form = build_form(&payload, &body.files)?;
                service.update_form(&path, form, params.as_ref()).await
            }
        }
        Commands::Token { .. } => Err(anyhow!("token commands do not call the API")),
    }
}

fn to_params(query: &QueryArgs) -> Option<Params> {
    if query.params.is_empty() {
        None
    } else {
        Some(Params::from_pairs(query.params.iter().cloned()))
    }
}

fn parse_body(body: &BodyArgs) -> Result<Value> {
    match &body.data {
        Some(raw) => serde_json::from_str(raw).context("--data is not valid JSON"),
        None => Ok(Value::Object(Default::default())),
    }
}

fn build_form(payload: &Value, files: &[(String, String)]) -> Result<FormData> {
    let mut form = FormData::from_serialize(payload)?;
    for (field, path) in files {
        let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
        let file_name = Path::new(path)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(path)
            .to_string();
        form = form.file(field, Attachment::new(file_name, bytes));
    }
    Ok(form)
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}
