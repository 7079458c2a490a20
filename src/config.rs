//! Remote CMS settings.
//!
//! Flags fall back to environment variables, which binaries populate from a
//! `.env` file via `dotenvy` before parsing.

use clap::Args;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection flags shared by the publishing binaries.
#[derive(Args, Debug, Clone)]
pub struct CmsArgs {
    /// Pages collection endpoint (e.g. https://site/wp-json/wp/v2/pages)
    #[arg(long = "endpoint", env = "WP_PAGES_URL")]
    pub endpoint: String,

    /// Basic-auth user
    #[arg(long = "user", env = "WP_USER")]
    pub username: Option<String>,

    /// Basic-auth password (application password)
    #[arg(long = "password", env = "WP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", env = "WP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsConfig {
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl From<CmsArgs> for CmsConfig {
    fn from(args: CmsArgs) -> Self {
        Self {
            endpoint: args.endpoint.trim().to_string(),
            username: args.username.filter(|user| !user.trim().is_empty()),
            password: args.password.filter(|password| !password.is_empty()),
            timeout_secs: args.timeout_secs,
        }
    }
}

impl CmsConfig {
    /// Reject settings that cannot produce a working client.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("WP_PAGES_URL (or --endpoint) is required".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }
        if self.username.is_some() && self.password.is_none() {
            return Err("WP_USER is set but WP_PASSWORD is missing".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("WP_TIMEOUT_SECS must be greater than zero".to_string());
        }
        Ok(())
    }
}
