use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// eBird の観察レコード (`detail=full` のレスポンス要素)
///
/// 上流のスキーマは保証されないので、欠けている・型が違うフィールドは
/// 文字列なら `""`、数値なら `None` に落とす。要素自体は捨てない。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub species_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub com_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sci_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub loc_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub obs_dt: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub how_many: Option<u64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub sub_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub user_display_name: String,
}

impl ObservationRecord {
    /// Decode one element of the upstream array.
    ///
    /// Non-object elements become an all-default record so the output keeps
    /// one entry per upstream element.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            warn!(kind = value_kind(&value), "non-object observation element, using defaults");
            return Self::default();
        }
        // フィールド単位で寛容にしてあるので、オブジェクトなら失敗しないはず
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!("failed to decode observation element: {}", e);
                Self::default()
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_record() {
        let record = ObservationRecord::from_value(json!({
            "speciesCode": "snoowl1",
            "comName": "Snowy Owl",
            "sciName": "Bubo scandiacus",
            "locId": "L123",
            "locName": "Jones Beach",
            "obsDt": "2026-01-10 08:15",
            "howMany": 2,
            "lat": 40.59,
            "lng": -73.51,
            "obsValid": true,
            "obsReviewed": false,
            "locationPrivate": false,
            "subId": "S1000",
            "userDisplayName": "Ada",
            "firstName": "ignored"
        }));
        assert_eq!(record.species_code, "snoowl1");
        assert_eq!(record.com_name, "Snowy Owl");
        assert_eq!(record.sci_name, "Bubo scandiacus");
        assert_eq!(record.loc_name, "Jones Beach");
        assert_eq!(record.obs_dt, "2026-01-10 08:15");
        assert_eq!(record.how_many, Some(2));
        assert_eq!(record.lat, Some(40.59));
        assert_eq!(record.lng, Some(-73.51));
        assert_eq!(record.sub_id, "S1000");
        assert_eq!(record.user_display_name, "Ada");
    }

    #[test]
    fn test_missing_fields_default() {
        let record = ObservationRecord::from_value(json!({ "comName": "Black Vulture" }));
        assert_eq!(record.com_name, "Black Vulture");
        assert_eq!(record.loc_name, "");
        assert_eq!(record.obs_dt, "");
        assert_eq!(record.how_many, None);
        assert_eq!(record.lat, None);
        assert_eq!(record.lng, None);
    }

    #[test]
    fn test_wrong_types_are_tolerated() {
        let record = ObservationRecord::from_value(json!({
            "comName": null,
            "locName": 42,
            "howMany": "3",
            "lat": "41.5",
            "lng": [1, 2],
            "obsValid": "yes",
            "subId": { "nested": true }
        }));
        assert_eq!(record.com_name, "");
        assert_eq!(record.loc_name, "42");
        assert_eq!(record.how_many, Some(3));
        assert_eq!(record.lat, Some(41.5));
        assert_eq!(record.lng, None);
        assert_eq!(record.sub_id, "");
    }

    #[test]
    fn test_negative_or_fractional_count_is_none() {
        let record = ObservationRecord::from_value(json!({ "howMany": -1 }));
        assert_eq!(record.how_many, None);
        let record = ObservationRecord::from_value(json!({ "howMany": 1.5 }));
        assert_eq!(record.how_many, None);
    }

    #[test]
    fn test_non_object_element_becomes_default() {
        for value in [json!(null), json!(7), json!("Golden Eagle"), json!([1, 2])] {
            assert_eq!(ObservationRecord::from_value(value), ObservationRecord::default());
        }
    }
}
