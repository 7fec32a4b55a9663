// src/common/serde_utils.rs

use serde::{Deserialize, Deserializer};

/// Distingue campo ausente (`None`) de `null` explícito (`Some(None)`) nos patches.
/// Usar junto com `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        notes: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"notes": "ok"}"#).unwrap();

        assert_eq!(absent.notes, None);
        assert_eq!(cleared.notes, Some(None));
        assert_eq!(set.notes, Some(Some("ok".to_string())));
    }
}
