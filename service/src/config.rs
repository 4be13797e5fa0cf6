use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Header set by the authenticating reverse proxy in front of this service.
pub const DEFAULT_PRINCIPAL_HEADER: &str = "x-forwarded-user";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Seconds between keep-alive comments written to idle push streams
    #[arg(long, env, default_value_t = 15)]
    pub keep_alive_secs: u64,

    /// Request header carrying the principal name asserted by the authenticating proxy.
    /// Clients can set this header themselves, so only run behind a proxy that strips
    /// it from incoming requests; otherwise any client can take over another user's session.
    #[arg(long, env, default_value = DEFAULT_PRINCIPAL_HEADER)]
    principal_header: String,

    /// Initial capacity of the session registry (expected concurrent users)
    #[arg(long, env, default_value_t = 41)]
    pub registry_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Header names are matched case-insensitively, so this is always lowercase.
    pub fn principal_header(&self) -> String {
        self.principal_header.to_lowercase()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}
