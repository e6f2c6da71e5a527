use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::display::OutputDocument;
use crate::error::Result;
use crate::http_client::EbirdClient;
use crate::output::write_document;

/// 1回分の実行結果
#[derive(Debug)]
pub struct RunSummary {
    pub path: PathBuf,
    pub observations: usize,
    pub species: usize,
    pub generated_at: DateTime<Utc>,
}

/// fetch → project → persist を一度だけ通す。
///
/// 取得か変換で失敗した場合はファイルに触れずにエラーを返す。
pub async fn run(config: &Config) -> Result<RunSummary> {
    info!(
        region = %config.region_code,
        days_back = config.days_back,
        "fetching notable observations"
    );

    let client = EbirdClient::new(config)?;
    let records = client.fetch_notable().await?;
    info!("retrieved {} raw observations", records.len());

    let generated_at = Utc::now();
    let doc = OutputDocument::build(&records, config, generated_at);
    info!(
        species = doc.total_species,
        observations = doc.total_observations,
        "projected observations"
    );

    write_document(&config.output_path, &doc)?;
    info!(path = %config.output_path.display(), "data saved");

    Ok(RunSummary {
        path: config.output_path.clone(),
        observations: doc.total_observations,
        species: doc.total_species,
        generated_at,
    })
}
