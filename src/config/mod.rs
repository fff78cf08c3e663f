//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroU64},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "mortar";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_MEDIA_DIR: &str = "media";
const DEFAULT_MEDIA_PUBLIC_BASE: &str = "/media";
const DEFAULT_MEDIA_REQUEST_LIMIT_BYTES: u64 = 20 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 14;
const DEFAULT_SESSION_RESOLVE_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_PUBLIC_PAGE_SIZE: u32 = 9;
const DEFAULT_ADMIN_PAGE_SIZE: u32 = 10;

/// Command-line arguments for the Mortar binary.
#[derive(Debug, Parser)]
#[command(name = "mortar", version, about = "Mortar site server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MORTAR_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Provision an administrator account.
    #[command(name = "create-admin")]
    CreateAdmin(CreateAdminArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
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

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the media storage directory.
    #[arg(long = "media-directory", value_name = "PATH")]
    pub media_directory: Option<PathBuf>,

    /// Override the maximum request size for image uploads in bytes.
    #[arg(long = "media-max-request-bytes", value_name = "BYTES")]
    pub media_max_request_bytes: Option<u64>,

    /// Override the public base under which stored media is served.
    #[arg(long = "media-public-base", value_name = "BASE")]
    pub media_public_base: Option<String>,

    /// Override the session lifetime in hours.
    #[arg(long = "session-ttl-hours", value_name = "HOURS")]
    pub session_ttl_hours: Option<u64>,

    /// Override the session resolution timeout in milliseconds.
    #[arg(long = "session-resolve-timeout-ms", value_name = "MILLIS")]
    pub session_resolve_timeout_ms: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct CreateAdminArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Email address for the new administrator.
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// Password for the new administrator.
    #[arg(long, value_name = "PASSWORD")]
    pub password: String,

    /// Display name for the new administrator.
    #[arg(long, value_name = "NAME", default_value = "Administrator")]
    pub name: String,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub session: SessionSettings,
    pub pages: PageSettings,
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
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct MediaSettings {
    pub directory: PathBuf,
    pub max_request_bytes: NonZeroU64,
    pub public_base: String,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub resolve_timeout: Duration,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub public_page_size: NonZeroU32,
    pub admin_page_size: NonZeroU32,
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

/// Parse the CLI and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("MORTAR").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::CreateAdmin(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    media: RawMediaSettings,
    session: RawSessionSettings,
    pages: RawPageSettings,
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
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMediaSettings {
    directory: Option<PathBuf>,
    max_request_bytes: Option<u64>,
    public_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    ttl_hours: Option<u64>,
    resolve_timeout_ms: Option<u64>,
    cookie_secure: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPageSettings {
    public_page_size: Option<u32>,
    admin_page_size: Option<u32>,
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
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(directory) = overrides.media_directory.as_ref() {
            self.media.directory = Some(directory.clone());
        }
        if let Some(limit) = overrides.media_max_request_bytes {
            self.media.max_request_bytes = Some(limit);
        }
        if let Some(base) = overrides.media_public_base.as_ref() {
            self.media.public_base = Some(base.clone());
        }
        if let Some(hours) = overrides.session_ttl_hours {
            self.session.ttl_hours = Some(hours);
        }
        if let Some(millis) = overrides.session_resolve_timeout_ms {
            self.session.resolve_timeout_ms = Some(millis);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            media,
            session,
            pages,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            media: build_media_settings(media)?,
            session: build_session_settings(session)?,
            pages: build_page_settings(pages)?,
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

    let addr = format!("{host}:{port}")
        .parse()
        .map_err(|err| LoadError::invalid("server.addr", format!("failed to parse: {err}")))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
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

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = NonZeroU32::new(max_connections).ok_or_else(|| {
        LoadError::invalid("database.max_connections", "must be greater than zero")
    })?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_media_settings(media: RawMediaSettings) -> Result<MediaSettings, LoadError> {
    let directory = media
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DIR));

    let max_request_bytes = media
        .max_request_bytes
        .unwrap_or(DEFAULT_MEDIA_REQUEST_LIMIT_BYTES);
    let max_request_bytes = NonZeroU64::new(max_request_bytes).ok_or_else(|| {
        LoadError::invalid("media.max_request_bytes", "must be greater than zero")
    })?;

    let public_base = media
        .public_base
        .unwrap_or_else(|| DEFAULT_MEDIA_PUBLIC_BASE.to_string());
    // Accept a site-relative prefix or a full URL, nothing in between.
    if !public_base.starts_with('/') {
        Url::parse(&public_base).map_err(|err| {
            LoadError::invalid(
                "media.public_base",
                format!("must start with `/` or be an absolute URL: {err}"),
            )
        })?;
    }

    Ok(MediaSettings {
        directory,
        max_request_bytes,
        public_base,
    })
}

fn build_session_settings(session: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let ttl_hours = session.ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS);
    if ttl_hours == 0 {
        return Err(LoadError::invalid(
            "session.ttl_hours",
            "must be greater than zero",
        ));
    }

    let resolve_timeout_ms = session
        .resolve_timeout_ms
        .unwrap_or(DEFAULT_SESSION_RESOLVE_TIMEOUT_MS);
    if resolve_timeout_ms == 0 {
        return Err(LoadError::invalid(
            "session.resolve_timeout_ms",
            "must be greater than zero",
        ));
    }

    Ok(SessionSettings {
        ttl: Duration::from_secs(ttl_hours * 3600),
        resolve_timeout: Duration::from_millis(resolve_timeout_ms),
        cookie_secure: session.cookie_secure.unwrap_or(false),
    })
}

fn build_page_settings(pages: RawPageSettings) -> Result<PageSettings, LoadError> {
    let public_page_size = pages.public_page_size.unwrap_or(DEFAULT_PUBLIC_PAGE_SIZE);
    let public_page_size = NonZeroU32::new(public_page_size).ok_or_else(|| {
        LoadError::invalid("pages.public_page_size", "must be greater than zero")
    })?;

    let admin_page_size = pages.admin_page_size.unwrap_or(DEFAULT_ADMIN_PAGE_SIZE);
    let admin_page_size = NonZeroU32::new(admin_page_size)
        .ok_or_else(|| LoadError::invalid("pages.admin_page_size", "must be greater than zero"))?;

    Ok(PageSettings {
        public_page_size,
        admin_page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_without_any_sources() {
        let settings = Settings::from_raw(RawSettings::default()).expect("defaults are valid");
        assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
        assert_eq!(settings.media.public_base, DEFAULT_MEDIA_PUBLIC_BASE);
        assert_eq!(settings.pages.public_page_size.get(), 9);
        assert!(!settings.session.cookie_secure);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let raw = RawSettings {
            database: RawDatabaseSettings {
                url: None,
                max_connections: Some(0),
            },
            ..Default::default()
        };
        assert!(matches!(
            Settings::from_raw(raw),
            Err(LoadError::Invalid { key: "database.max_connections", .. })
        ));
    }

    #[test]
    fn media_base_must_be_prefix_or_url() {
        let raw = RawSettings {
            media: RawMediaSettings {
                public_base: Some("media-files".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Settings::from_raw(raw).is_err());

        let raw = RawSettings {
            media: RawMediaSettings {
                public_base: Some("https://cdn.example.com/m".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Settings::from_raw(raw).is_ok());
    }

    #[test]
    fn serve_overrides_take_precedence() {
        let mut raw = RawSettings::default();
        raw.apply_serve_overrides(&ServeOverrides {
            server_port: Some(8080),
            log_json: Some(true),
            session_ttl_hours: Some(1),
            ..Default::default()
        });
        let settings = Settings::from_raw(raw).expect("valid");
        assert_eq!(settings.server.addr.port(), 8080);
        assert!(matches!(settings.logging.format, LogFormat::Json));
        assert_eq!(settings.session.ttl, Duration::from_secs(3600));
    }
}
