use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::observation::ObservationRecord;

pub const TOKEN_HEADER: &str = "X-eBirdApiToken";

/// エラーボディはログ用に先頭だけ残す
const ERROR_BODY_LIMIT: usize = 200;

pub struct EbirdClient {
    client: Client,
    url: Url,
    api_key: String,
    days_back: u8,
}

impl EbirdClient {
    pub fn new(config: &Config) -> Result<Self> {
        let url = config.notable_url();
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            url,
            api_key: config.api_key.clone(),
            days_back: config.days_back,
        })
    }

    /// 直近の notable observations を1回だけ取得する。リトライはしない。
    pub async fn fetch_notable(&self) -> Result<Vec<ObservationRecord>> {
        let transport = |source: reqwest::Error| Error::Transport {
            url: self.url.to_string(),
            source,
        };

        debug!(url = %self.url, back = self.days_back, "requesting notable observations");
        let resp = self
            .client
            .get(self.url.clone())
            .header(TOKEN_HEADER, &self.api_key)
            .query(&[
                ("back", self.days_back.to_string()),
                ("detail", "full".to_string()),
                ("hotspot", "false".to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status,
                body: trim_body(&body),
            });
        }

        let bytes = resp.bytes().await.map_err(transport)?;
        let elements: Vec<Value> = serde_json::from_slice(&bytes).map_err(Error::Decode)?;
        debug!(count = elements.len(), "decoded response array");
        Ok(elements.into_iter().map(ObservationRecord::from_value).collect())
    }
}

fn trim_body(body: &str) -> String {
    body.trim().chars().take(ERROR_BODY_LIMIT).collect()
}
