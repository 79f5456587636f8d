use clap::{Parser, Subcommand, ValueEnum};
use ppa_core::ShortCode;
use ppa_generator::digest::{DEFAULT_CODE_LEN, DEFAULT_NAMESPACE};
use std::fmt::{Display, Formatter};

pub const STORAGE_BACKEND_ENV: &str = "PPA_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "PPA_MYSQL_DSN";
pub const NAMESPACE_ENV: &str = "PPA_NAMESPACE";
pub const CODE_LEN_ENV: &str = "PPA_CODE_LEN";
pub const OPERATION_TIMEOUT_ENV: &str = "PPA_OPERATION_TIMEOUT_MS";
pub const LOG_JSON_ENV: &str = "PPA_LOG_JSON";

pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ppa", about = "Shorten URLs and resolve short codes")]
pub struct CLI {
    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = NAMESPACE_ENV, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    #[arg(long, env = CODE_LEN_ENV, default_value_t = DEFAULT_CODE_LEN)]
    pub code_len: usize,

    #[arg(long, env = OPERATION_TIMEOUT_ENV, default_value_t = DEFAULT_OPERATION_TIMEOUT_MS)]
    pub operation_timeout_ms: u64,

    /// Emit logs as JSON lines.
    #[arg(long, env = LOG_JSON_ENV)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a short code for a URL.
    Shorten { url: String },
    /// Point a short code at a new URL.
    Update { code: ShortCode, url: String },
    /// Print the URL a short code resolves to.
    Resolve { code: ShortCode },
    /// Push back the expiry of a short code.
    Extend { code: ShortCode, days: u32 },
    /// Print the stored record, expired or not.
    Inspect { code: ShortCode },
    /// Shorten, update, resolve and extend an example URL.
    Demo,
}
