use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Runtime-tunable provider settings.
///
/// A plain value type: every read hands out a copy, and updates replace the
/// whole value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Whether clients ship diagnostic logs to the server.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub log_enabled: bool,
}

impl Settings {
    pub fn new(log_enabled: bool) -> Self {
        Self { log_enabled }
    }

    /// Encode as `{"logEnabled": <bool>}`.
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "logEnabled": self.log_enabled })
    }

    /// Decode permissively: a missing or unrecognised `logEnabled` reads as
    /// `false`, never as an error.
    pub fn from_json(value: &Value) -> Self {
        Self {
            log_enabled: value.get("logEnabled").map(bool_from_value).unwrap_or(false),
        }
    }
}

/// `true`/`false` booleans, plus their case-insensitive string spellings.
fn bool_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(bool_from_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip() {
        for s in [Settings::new(true), Settings::new(false)] {
            assert_eq!(Settings::from_json(&s.to_json()), s);
            let text = serde_json::to_string(&s).unwrap();
            assert_eq!(serde_json::from_str::<Settings>(&text).unwrap(), s);
        }
    }

    #[test]
    fn wire_shape() {
        assert_eq!(Settings::new(true).to_json(), json!({ "logEnabled": true }));
        assert_eq!(
            serde_json::to_value(Settings::new(false)).unwrap(),
            json!({ "logEnabled": false })
        );
    }

    #[test]
    fn missing_field_reads_false() {
        assert_eq!(Settings::from_json(&json!({})), Settings::new(false));
        assert_eq!(serde_json::from_str::<Settings>("{}").unwrap(), Settings::new(false));
    }

    #[test]
    fn string_booleans_are_accepted() {
        assert!(Settings::from_json(&json!({ "logEnabled": "TRUE" })).log_enabled);
        assert!(!Settings::from_json(&json!({ "logEnabled": "nope" })).log_enabled);
        assert!(!Settings::from_json(&json!({ "logEnabled": 1 })).log_enabled);
        assert!(serde_json::from_str::<Settings>(r#"{"logEnabled":"true"}"#).unwrap().log_enabled);
    }

    #[test]
    fn non_object_reads_default() {
        assert_eq!(Settings::from_json(&json!("oops")), Settings::default());
        assert_eq!(Settings::from_json(&Value::Null), Settings::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let s: Settings = serde_json::from_str(r#"{"logEnabled":true,"extra":1}"#).unwrap();
        assert!(s.log_enabled);
    }
}
