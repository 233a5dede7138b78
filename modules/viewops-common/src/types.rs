use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The `data` object of a read query, exactly as the engine returned it.
///
/// Column types (dates, numerics, bigints) vary with the database schema, so
/// read results are forwarded without being decoded into fixed structs.
pub type RawData = Value;

/// A note to be written together with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub batch_id: Uuid,
    pub content: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertedNote {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_note_decodes_engine_shape() {
        let note: InsertedNote = serde_json::from_value(serde_json::json!({
            "id": "1a4f09f6-125d-48ee-a5a2-d1e13f035d5c"
        }))
        .unwrap();
        assert_eq!(note.id.to_string(), "1a4f09f6-125d-48ee-a5a2-d1e13f035d5c");
    }

    #[test]
    fn raw_data_keeps_engine_formatting() {
        let body = r#"{"batches":[{"kill_date":"2024-03-14T00:00:00+00:00","cost_per_kg":"6.420"}]}"#;
        let data: RawData = serde_json::from_str(body).unwrap();
        assert_eq!(data["batches"][0]["kill_date"], "2024-03-14T00:00:00+00:00");
        assert_eq!(data["batches"][0]["cost_per_kg"], "6.420");
    }
}
