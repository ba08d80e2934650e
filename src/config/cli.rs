use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Folio portfolio server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the portfolio over HTTP.
    Serve(Box<ServeArgs>),
    /// Load all content, report warnings and exit.
    Check(CheckArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Exit with a failure status when any entry was skipped.
    #[arg(long = "deny-warnings", action = clap::ArgAction::SetTrue)]
    pub deny_warnings: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the TOML file holding profile, projects, skills, certifications and timeline.
    #[arg(long = "content-tables", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub tables: Option<PathBuf>,

    /// Override the directory scanned for Markdown blog posts.
    #[arg(long = "content-blog-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub blog_dir: Option<PathBuf>,

    /// Override the directory served under `/assets`.
    #[arg(long = "content-assets-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub assets_dir: Option<PathBuf>,

    /// Refuse to start when a content source cannot be loaded.
    #[arg(
        long = "content-strict",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub strict: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override how contact messages are delivered (log|outbox).
    #[arg(long = "contact-transport", value_name = "TRANSPORT")]
    pub contact_transport: Option<String>,

    /// Override the directory receiving outbox messages.
    #[arg(long = "contact-outbox-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub contact_outbox_dir: Option<PathBuf>,

    /// Override the delivery timeout for contact messages.
    #[arg(long = "contact-timeout-seconds", value_name = "SECONDS")]
    pub contact_timeout_seconds: Option<u64>,

    /// Override the number of visitor sessions kept in memory.
    #[arg(long = "sessions-capacity", value_name = "COUNT")]
    pub sessions_capacity: Option<u64>,
}
