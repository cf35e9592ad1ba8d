use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ot2net",
    about = "ot2net gateway - backend API, edge proxy and AI usage tools",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, env = "OT2NET_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(short, long, env = "OT2NET_CONFIG", global = true, help = "Path to config.json")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the backend API (default if no command specified)")]
    Serve {
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    #[command(about = "Start the browser-facing edge proxy")]
    Edge {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long, help = "Backend origin, e.g. http://127.0.0.1:3001")]
        upstream: Option<String>,
    },

    #[command(about = "Show AI call usage and cost from the audit log")]
    Usage {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Only include calls from the last N hours")]
        hours: Option<u32>,

        #[arg(long, default_value = "10", help = "Number of recent calls to list")]
        recent: usize,
    },

    #[command(subcommand, about = "Inspect configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Print the config file location")]
    Path,
}
