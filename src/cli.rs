use clap::Parser;

/// Quay-Control: client-side core for a remote resource-orchestration console
#[derive(Parser, Debug, Clone)]
#[command(name = "quay-control")]
#[command(version)]
#[command(about = "Interactive console client over a persistent WebSocket", long_about = None)]
pub struct Cli {
    /// Server address, e.g. ws://127.0.0.1:3000/ws or wss://host/ws
    #[arg(value_name = "URL", env = "QUAY_SERVER", default_value = "ws://127.0.0.1:3000/ws")]
    pub server: String,

    /// Server secret used for the initial authentication prompt
    #[arg(long, env = "QUAY_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
