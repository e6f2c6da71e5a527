use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::observation::ObservationRecord;

/// 表示用に絞ったレコード。静的ページはこの形だけを読む。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    pub species_code: String,
    pub com_name: String,
    pub sci_name: String,
    pub loc_name: String,
    pub obs_dt: String,
    pub how_many: Option<u64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub sub_id: String,
    pub user_display_name: String,
}

impl From<&ObservationRecord> for DisplayRecord {
    fn from(obs: &ObservationRecord) -> Self {
        Self {
            species_code: obs.species_code.clone(),
            com_name: obs.com_name.clone(),
            sci_name: obs.sci_name.clone(),
            loc_name: obs.loc_name.clone(),
            obs_dt: obs.obs_dt.clone(),
            how_many: obs.how_many,
            lat: obs.lat,
            lng: obs.lng,
            sub_id: obs.sub_id.clone(),
            user_display_name: obs.user_display_name.clone(),
        }
    }
}

/// 出力ファイル全体。毎回まるごと書き換える。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    pub last_updated: DateTime<Utc>,
    pub region: String,
    pub region_code: String,
    pub days_back: u8,
    pub total_observations: usize,
    pub total_species: usize,
    pub observations: Vec<DisplayRecord>,
}

impl OutputDocument {
    /// Project upstream records in their original order.
    pub fn build(records: &[ObservationRecord], config: &Config, generated_at: DateTime<Utc>) -> Self {
        let observations: Vec<DisplayRecord> = records.iter().map(DisplayRecord::from).collect();
        Self {
            last_updated: generated_at,
            region: config.region_name.clone(),
            region_code: config.region_code.clone(),
            days_back: config.days_back,
            total_observations: observations.len(),
            total_species: count_species(&observations),
            observations,
        }
    }
}

// 集計値のみ。レコード自体はまとめない
fn count_species(records: &[DisplayRecord]) -> usize {
    records
        .iter()
        .map(|r| r.species_code.as_str())
        .filter(|code| !code.is_empty())
        .collect::<HashSet<_>>()
        .len()
}
