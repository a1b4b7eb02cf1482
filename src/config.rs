//! CLI arguments and server configuration defaults.

use clap::Parser;

pub const SESSION_COOKIE_NAME: &str = "FILEDROP_SESSION";
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const DEFAULT_AUTH_USER: &str = "admin";
pub const DEFAULT_AUTH_PASS: &str = "admin";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_UPLOAD_MAX_SIZE: u64 = 1024 * 1024 * 1024;
pub const SESSION_PRUNE_INTERVAL_SECS: u64 = 300;

/// CLI arguments and environment configuration for the server.
///
/// Parsed once at startup and handed into the router wiring; nothing reads
/// configuration from ambient state after that.
#[derive(Parser, Debug)]
#[command(name = "filedrop", version, about = "Authenticated file-upload server")]
pub struct Args {
    #[arg(
        short = 's',
        long,
        env = "FILEDROP_STORAGE_DIR",
        default_value = ".filedrop/uploads",
        help = "Directory where uploaded files are stored"
    )]
    pub storage_dir: String,
    #[arg(
        long,
        env = "FILEDROP_AUTH_USER",
        default_value = DEFAULT_AUTH_USER,
        help = "Login username"
    )]
    pub auth_user: String,
    #[arg(
        long,
        env = "FILEDROP_AUTH_PASS",
        default_value = DEFAULT_AUTH_PASS,
        help = "Login password"
    )]
    pub auth_pass: String,
    #[arg(
        short = 'b',
        long,
        env = "FILEDROP_BIND",
        default_value = "0.0.0.0",
        help = "Bind address"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "FILEDROP_PORT",
        default_value_t = 3000,
        help = "Listen port"
    )]
    pub port: u16,
    #[arg(
        long,
        env = "FILEDROP_SESSION_TTL_SECS",
        default_value_t = DEFAULT_SESSION_TTL_SECS,
        help = "Session expiration in seconds"
    )]
    pub session_ttl_secs: u64,
    #[arg(
        long,
        env = "FILEDROP_UPLOAD_MAX_SIZE",
        default_value_t = DEFAULT_UPLOAD_MAX_SIZE,
        help = "Max upload size in bytes"
    )]
    pub upload_max_size: u64,
    #[arg(
        long,
        env = "FILEDROP_STRICT_UNIQUE_NAMES",
        default_value_t = false,
        help = "Append a random token to stored names so same-millisecond uploads cannot collide"
    )]
    pub strict_unique_names: bool,
    #[arg(
        long,
        env = "FILEDROP_PROTECT_DOWNLOADS",
        default_value_t = false,
        help = "Require a session to download stored files"
    )]
    pub protect_downloads: bool,
}
