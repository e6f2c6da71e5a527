mod config;
mod display;
mod error;
mod http_client;
mod observation;
mod output;
mod pipeline;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::pipeline::RunSummary;

async fn try_main(config: std::result::Result<Config, ConfigError>) -> Result<RunSummary> {
    let config = config?;
    pipeline::run(&config).await
}

/// 実行結果をログに出し、プロセスの終了ステータスを返す (成功 0 / 失敗 1)
fn report(result: &Result<RunSummary>) -> u8 {
    match result {
        Ok(summary) => {
            info!(
                path = %summary.path.display(),
                observations = summary.observations,
                species = summary.species,
                generated_at = %summary.generated_at,
                "done"
            );
            0
        }
        Err(e) => {
            // 前回のファイルはそのまま残る
            error!("run failed: {}", e);
            1
        }
    }
}

// 引数は取らない。スケジューラから毎日1回起動される想定
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ebird_notable=info")),
        )
        .init();

    let result = try_main(Config::from_env()).await;
    ExitCode::from(report(&result))
}
