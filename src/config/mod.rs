//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::{CheckArgs, CliArgs, Command, ContentOverrides, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 10;
const DEFAULT_TABLES_PATH: &str = "content/site.toml";
const DEFAULT_BLOG_DIR: &str = "content/blog";
const DEFAULT_ASSETS_DIR: &str = "content/assets";
const DEFAULT_BLOG_ASSET_PREFIX: &str = "/assets/blog";
const DEFAULT_OUTBOX_DIR: &str = "outbox";
const DEFAULT_CONTACT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub contact: ContactSettings,
    pub sessions: SessionSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub tables: PathBuf,
    pub blog_dir: PathBuf,
    pub assets_dir: PathBuf,
    /// URL prefix that relative references inside posts are rewritten under.
    pub blog_asset_prefix: String,
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTransport {
    Log,
    Outbox,
}

impl FromStr for ContactTransport {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "outbox" => Ok(Self::Outbox),
            other => Err(format!("unknown transport `{other}` (expected log|outbox)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub transport: ContactTransport,
    pub outbox_dir: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub capacity: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Check(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    contact: RawContactSettings,
    sessions: RawSessionSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(transport) = overrides.contact_transport.as_ref() {
            self.contact.transport = Some(transport.clone());
        }
        if let Some(dir) = overrides.contact_outbox_dir.as_ref() {
            self.contact.outbox_dir = Some(dir.clone());
        }
        if let Some(seconds) = overrides.contact_timeout_seconds {
            self.contact.timeout_seconds = Some(seconds);
        }
        if let Some(capacity) = overrides.sessions_capacity {
            self.sessions.capacity = Some(capacity);
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(path) = overrides.tables.as_ref() {
            self.content.tables = Some(path.clone());
        }
        if let Some(dir) = overrides.blog_dir.as_ref() {
            self.content.blog_dir = Some(dir.clone());
        }
        if let Some(dir) = overrides.assets_dir.as_ref() {
            self.content.assets_dir = Some(dir.clone());
        }
        if let Some(strict) = overrides.strict {
            self.content.strict = Some(strict);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            contact,
            sessions,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            contact: build_contact_settings(contact)?,
            sessions: build_session_settings(sessions)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    let graceful_shutdown =
        Duration::from_secs(non_zero_u64(graceful_secs, "server.graceful_shutdown_seconds")?.get());

    Ok(ServerSettings {
        addr,
        graceful_shutdown,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let tables = non_empty_path(content.tables, DEFAULT_TABLES_PATH, "content.tables")?;
    let blog_dir = non_empty_path(content.blog_dir, DEFAULT_BLOG_DIR, "content.blog_dir")?;
    let assets_dir = non_empty_path(content.assets_dir, DEFAULT_ASSETS_DIR, "content.assets_dir")?;

    let blog_asset_prefix = content
        .blog_asset_prefix
        .unwrap_or_else(|| DEFAULT_BLOG_ASSET_PREFIX.to_string());
    if !blog_asset_prefix.starts_with('/') {
        return Err(LoadError::invalid(
            "content.blog_asset_prefix",
            "prefix must start with `/`",
        ));
    }

    Ok(ContentSettings {
        tables,
        blog_dir,
        assets_dir,
        blog_asset_prefix: blog_asset_prefix.trim_end_matches('/').to_string(),
        strict: content.strict.unwrap_or(false),
    })
}

fn build_contact_settings(contact: RawContactSettings) -> Result<ContactSettings, LoadError> {
    let transport = match contact.transport {
        Some(value) => ContactTransport::from_str(&value)
            .map_err(|reason| LoadError::invalid("contact.transport", reason))?,
        None => ContactTransport::Log,
    };

    let outbox_dir = non_empty_path(contact.outbox_dir, DEFAULT_OUTBOX_DIR, "contact.outbox_dir")?;

    let timeout_secs = contact
        .timeout_seconds
        .unwrap_or(DEFAULT_CONTACT_TIMEOUT_SECS);
    let timeout = Duration::from_secs(non_zero_u64(timeout_secs, "contact.timeout_seconds")?.get());

    Ok(ContactSettings {
        transport,
        outbox_dir,
        timeout,
    })
}

fn build_session_settings(sessions: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let value = sessions.capacity.unwrap_or(DEFAULT_SESSION_CAPACITY);
    let value = usize::try_from(non_zero_u64(value, "sessions.capacity")?.get()).map_err(|_| {
        LoadError::invalid(
            "sessions.capacity",
            "value exceeds supported range for usize",
        )
    })?;
    let capacity = NonZeroUsize::new(value)
        .ok_or_else(|| LoadError::invalid("sessions.capacity", "must be greater than zero"))?;

    Ok(SessionSettings { capacity })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    tables: Option<PathBuf>,
    blog_dir: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    blog_asset_prefix: Option<String>,
    strict: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContactSettings {
    transport: Option<String>,
    outbox_dir: Option<PathBuf>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    capacity: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u64(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
