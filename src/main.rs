//! Toolbridge CLI - talk to one MCP server over HTTP.
//!
//! Subcommands:
//! - `list`: print the server's tool catalog
//! - `call`: invoke a tool with JSON arguments and an optional timeout
//! - `cancel`: send `notifications/cancelled` for a progress token
//!
//! Every command prints one JSON document on stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use toolbridge::tools::ArgumentMap;
use toolbridge::{Config, HttpTransport, ProgressToken, ServerHandle, ToolDispatcher};

#[derive(Parser)]
#[command(
    name = "toolbridge",
    version,
    about = "MCP tool client: list tools, call them under a deadline, cancel calls"
)]
struct Cli {
    /// Streamable HTTP endpoint of the MCP server
    #[arg(long, env = "TOOLBRIDGE_URL")]
    url: String,

    /// Name used for the server in logs and messages
    #[arg(long, default_value = "default")]
    server_name: String,

    /// JSON configuration file
    #[arg(long, env = "TOOLBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Bearer token (overrides config and TOOLBRIDGE_AUTH_TOKEN)
    #[arg(long)]
    auth_token: Option<String>,

    /// Skip the initialize handshake
    #[arg(long)]
    no_initialize: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the server's tools
    List,
    /// Call a tool
    Call {
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Seconds before the call is abandoned; -1 waits forever
        #[arg(long, allow_hyphen_values = true)]
        timeout: Option<f64>,
        /// Validate arguments against the tool's inputSchema first
        #[arg(long)]
        check: bool,
    },
    /// Cancel an in-flight call by progress token
    Cancel {
        token: String,
        #[arg(long, default_value = "Cancelled by user")]
        reason: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    toolbridge::observability::init_tracing(&config.observability);

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> toolbridge::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    let mut config = config.apply_env();
    if let Some(token) = &cli.auth_token {
        config.http.auth_token = Some(token.clone());
    }
    Ok(config)
}

/// Returns whether the command succeeded.
async fn run(cli: Cli, config: Config) -> toolbridge::Result<bool> {
    let transport = Arc::new(HttpTransport::new(&cli.url, &config.http));
    if !cli.no_initialize {
        transport
            .initialize(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            .await?;
    }
    let handle = ServerHandle::connected(&cli.server_name, transport);
    let dispatcher = ToolDispatcher::with_config(config.dispatch);

    match cli.command {
        Command::List => {
            let listing = dispatcher
                .list_server_tools(Some(&handle), &cli.server_name)
                .await;
            print_json(&serde_json::to_value(&listing)?);
            Ok(listing.error.is_none())
        }
        Command::Call {
            tool,
            args,
            timeout,
            check,
        } => {
            let arguments: ArgumentMap = serde_json::from_str(&args)
                .map_err(|e| toolbridge::Error::validation(format!("--args: {}", e)))?;

            let outcome = if check {
                let listing = dispatcher
                    .list_server_tools(Some(&handle), &cli.server_name)
                    .await;
                match listing.tools.iter().find(|t| t.name == tool) {
                    Some(descriptor) => {
                        dispatcher
                            .call_tool_checked(
                                Some(&handle),
                                &cli.server_name,
                                &tool,
                                &arguments,
                                timeout,
                                &descriptor.input_schema,
                            )
                            .await
                    }
                    None => {
                        tracing::warn!(tool = %tool, "tool not in catalog; calling unchecked");
                        dispatcher
                            .call_tool(Some(&handle), &cli.server_name, &tool, &arguments, timeout)
                            .await
                    }
                }
            } else {
                dispatcher
                    .call_tool(Some(&handle), &cli.server_name, &tool, &arguments, timeout)
                    .await
            };

            outcome.log.emit(&cli.server_name, &tool);
            print_json(&serde_json::to_value(outcome.result.to_response(&tool))?);
            Ok(outcome.result.is_success() && !outcome.result.is_tool_error())
        }
        Command::Cancel { token, reason } => {
            let token = ProgressToken::from_string(token).map_err(toolbridge::Error::validation)?;
            dispatcher
                .cancel_tool_execution(&handle, &token, &reason)
                .await?;
            print_json(&serde_json::json!({"success": true, "progressToken": token}));
            Ok(true)
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("cannot render output: {}", e),
    }
}

