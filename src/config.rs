use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_REGION_CODE: &str = "US-NY";
pub const DEFAULT_REGION_NAME: &str = "New York";
pub const DEFAULT_DAYS_BACK: u8 = 7;
pub const MAX_DAYS_BACK: u8 = 30;
pub const DEFAULT_OUTPUT_PATH: &str = "data/birds.json";
pub const DEFAULT_API_BASE: &str = "https://api.ebird.org/v2/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 実行時設定。起動時に環境変数から一度だけ読む。
pub struct Config {
    pub api_key: String,
    pub region_code: String,
    pub region_name: String,
    pub days_back: u8,
    pub output_path: PathBuf,
    pub api_base: Url,
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    // api_key はログに出さない
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("region_code", &self.region_code)
            .field("region_name", &self.region_name)
            .field("days_back", &self.days_back)
            .field("output_path", &self.output_path)
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset, so `EBIRD_DAYS_BACK=` falls back to the
    /// default. The credential has no default and must be non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("EBIRD_API_KEY").ok_or(ConfigError::MissingCredential)?;

        let region_code = get("EBIRD_REGION_CODE").unwrap_or_else(|| DEFAULT_REGION_CODE.to_string());
        if !is_valid_region_code(&region_code) {
            return Err(ConfigError::InvalidRegion(region_code));
        }

        let region_name = get("EBIRD_REGION_NAME").unwrap_or_else(|| DEFAULT_REGION_NAME.to_string());

        let days_back = match get("EBIRD_DAYS_BACK") {
            Some(raw) => parse_days_back(&raw)?,
            None => DEFAULT_DAYS_BACK,
        };

        let output_path = get("EBIRD_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let api_base = parse_api_base(&get("EBIRD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()))?;

        let timeout = match get("EBIRD_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let config = Self {
            api_key,
            region_code,
            region_name,
            days_back,
            output_path,
            api_base,
            timeout,
        };
        debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// `{base}/data/obs/{region}/recent/notable`
    pub fn notable_url(&self) -> Url {
        let mut url = self.api_base.clone();
        // parse_api_base で cannot-be-a-base は弾いている
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["data", "obs", self.region_code.as_str(), "recent", "notable"]);
        }
        url
    }
}

fn is_valid_region_code(code: &str) -> bool {
    !code.is_empty()
        && !code.starts_with('-')
        && !code.ends_with('-')
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn parse_days_back(raw: &str) -> Result<u8, ConfigError> {
    match raw.parse::<u8>() {
        Ok(days) if (1..=MAX_DAYS_BACK).contains(&days) => Ok(days),
        _ => Err(ConfigError::InvalidDaysBack(raw.to_string())),
    }
}

fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    Ok(url)
}
