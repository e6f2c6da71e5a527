use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// 設定値の検証エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("EBIRD_API_KEY is not set or empty")]
    MissingCredential,
    #[error("invalid region code {0:?}: expected letters, digits and '-'")]
    InvalidRegion(String),
    #[error("invalid lookback window {0:?}: expected an integer in 1..=30")]
    InvalidDaysBack(String),
    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// 1回の実行で起こり得る失敗。いずれも致命的で、出力ファイルには触れない。
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("response body is not a JSON array: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode output document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
