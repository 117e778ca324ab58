//! rpc-dispatch-server entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use rpc_dispatch::Dispatcher;
use rpc_dispatch_server::config::{ConfigOverrides, ServerConfig};
use rpc_dispatch_server::methods::{default_registry, list_methods};
use rpc_dispatch_server::protocol::ProtocolHandler;
use rpc_dispatch_server::transport::StdioTransport;
use rpc_dispatch_server::types::ServerInfo;

#[derive(Parser)]
#[command(
    name = "rpc-dispatch-server",
    about = "JSON-RPC 2.0 demo server with concurrent batches and strict notification handling",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-RPC over HTTP (default).
    #[cfg(feature = "http")]
    Serve {
        /// Listen address (host:port). Also reads RPC_ADDR.
        #[arg(long)]
        addr: Option<String>,

        /// Endpoint path. Also reads RPC_PATH.
        #[arg(long)]
        path: Option<String>,

        /// Maximum request body size in bytes. Also reads RPC_MAX_BODY_BYTES.
        #[arg(long)]
        max_body_bytes: Option<usize>,

        /// Per-request timeout in seconds. Also reads RPC_REQUEST_TIMEOUT_SECS.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Batch elements evaluated at once. Also reads RPC_BATCH_CONCURRENCY.
        #[arg(long)]
        batch_concurrency: Option<usize>,

        /// Answer CORS preflight requests permissively.
        #[arg(long)]
        cors: bool,
    },

    /// Serve JSON-RPC over stdio, one payload per line.
    Stdio {
        /// Batch elements evaluated at once. Also reads RPC_BATCH_CONCURRENCY.
        #[arg(long)]
        batch_concurrency: Option<usize>,
    },

    /// Print the registered methods as JSON.
    Methods,

    /// Run the scripted demo calls in-process and print the exchanges.
    Demo,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   rpc-dispatch-server completions bash > ~/.local/share/bash-completion/completions/rpc-dispatch-server
    ///   rpc-dispatch-server completions zsh > ~/.zfunc/_rpc-dispatch-server
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

fn build_handler(config: &ServerConfig) -> anyhow::Result<ProtocolHandler> {
    let registry = Arc::new(default_registry()?);
    Ok(ProtocolHandler::new(Dispatcher::new(registry))
        .with_batch_concurrency(config.batch_concurrency))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    #[cfg(feature = "http")]
    let default_command = Commands::Serve {
        addr: None,
        path: None,
        max_body_bytes: None,
        timeout_secs: None,
        batch_concurrency: None,
        cors: false,
    };
    #[cfg(not(feature = "http"))]
    let default_command = Commands::Stdio {
        batch_concurrency: None,
    };

    match cli.command.unwrap_or(default_command) {
        #[cfg(feature = "http")]
        Commands::Serve {
            addr,
            path,
            max_body_bytes,
            timeout_secs,
            batch_concurrency,
            cors,
        } => {
            use rpc_dispatch_server::transport::HttpTransport;

            let config = ServerConfig::resolve(ConfigOverrides {
                addr,
                path,
                max_body_bytes,
                request_timeout_secs: timeout_secs,
                batch_concurrency,
                cors,
            })?;
            tracing::debug!(?config, "resolved configuration");
            let handler = build_handler(&config)?;
            let transport = HttpTransport::new(handler, config);
            transport.run().await?;
        }

        Commands::Stdio { batch_concurrency } => {
            let config = ServerConfig::resolve(ConfigOverrides {
                batch_concurrency,
                ..Default::default()
            })?;
            let handler = build_handler(&config)?;
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Methods => {
            let info = ServerInfo::new(list_methods());
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Demo => {
            let dispatcher = Dispatcher::new(Arc::new(default_registry()?));
            rpc_dispatch_server::demo::run(&dispatcher, &mut std::io::stdout())?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "rpc-dispatch-server",
                &mut std::io::stdout(),
            );
        }

        Commands::Repl => {
            rpc_dispatch_server::repl::run()?;
        }
    }

    Ok(())
}
