//! JSON encoding of completion records.
//!
//! The persisted document shape is the stable exchange format for a
//! future backend: `{sessionId, date, score, passed, timeSpentSeconds,
//! perItem: [{itemId, response, correct}]}` with ISO-8601 dates.

use coach_core::model::CompletionRecord;

use crate::repository::StorageError;

/// Serialize a completion record to the persisted JSON document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_record(record: &CompletionRecord) -> Result<String, StorageError> {
    serde_json::to_string(record).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a completion record from its persisted JSON document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document is malformed.
pub fn decode_record(json: &str) -> Result<CompletionRecord, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::model::{ItemId, ItemOutcome, Response, SessionId};
    use coach_core::time::fixed_now;

    fn sample_record() -> CompletionRecord {
        CompletionRecord {
            session_id: SessionId::new(3),
            date: fixed_now(),
            score: 67,
            passed: Some(false),
            quality: None,
            time_spent_seconds: 95,
            per_item: vec![
                ItemOutcome {
                    item_id: ItemId::new(10),
                    response: Some(Response::Choice(2)),
                    correct: Some(true),
                },
                ItemOutcome {
                    item_id: ItemId::new(11),
                    response: None,
                    correct: Some(false),
                },
            ],
        }
    }

    #[test]
    fn document_uses_the_persisted_field_names() {
        let json = encode_record(&sample_record()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sessionId"], 3);
        assert_eq!(value["score"], 67);
        assert_eq!(value["passed"], false);
        assert_eq!(value["timeSpentSeconds"], 95);
        assert_eq!(value["perItem"][0]["itemId"], 10);
        assert_eq!(value["perItem"][0]["correct"], true);
        // ISO-8601 date
        assert!(value["date"].as_str().unwrap().starts_with("2024-01-01T"));
        // absent options are omitted, not null
        assert!(value.get("quality").is_none());
        assert!(value["perItem"][1].get("response").is_none());
    }

    #[test]
    fn record_round_trips_through_the_document() {
        let record = sample_record();
        let json = encode_record(&record).unwrap();
        let decoded = decode_record(&json).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn malformed_document_is_a_serialization_error() {
        let err = decode_record("{\"sessionId\":").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
