use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Domain attributes of a record, opaque to the sync engine. Always a JSON
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPayload(Map<String, Value>);

impl RecordPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err("Record payload must be a JSON object".to_string()),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| format!("Invalid payload JSON: {err}"))?;
        Self::new(value)
    }

    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn to_json_string(&self) -> Result<String, String> {
        serde_json::to_string(&self.0).map_err(|err| err.to_string())
    }

    /// Overlay `patch` onto this payload, replacing colliding keys.
    pub fn merged_with(&self, patch: &RecordPayload) -> RecordPayload {
        let mut map = self.0.clone();
        for (key, value) in patch.as_map() {
            map.insert(key.clone(), value.clone());
        }
        RecordPayload(map)
    }
}

impl From<RecordPayload> for Value {
    fn from(payload: RecordPayload) -> Self {
        Value::Object(payload.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payloads() {
        assert!(RecordPayload::new(json!("scalar")).is_err());
        assert!(RecordPayload::new(json!([1, 2])).is_err());
        assert!(RecordPayload::new(json!({"name": "Test"})).is_ok());
    }

    #[test]
    fn merged_with_overlays_keys() {
        let base = RecordPayload::new(json!({"name": "Test", "phone": "0100"})).unwrap();
        let patch = RecordPayload::new(json!({"phone": "0200"})).unwrap();
        let merged = base.merged_with(&patch);
        assert_eq!(merged.as_map()["name"], json!("Test"));
        assert_eq!(merged.as_map()["phone"], json!("0200"));
    }
}
