//! Batch envelopes in and batch responses out.
//!
//! Two input layouts are accepted:
//!
//! - the stream layout, `{"Records": [{"eventID", "eventName", "dynamodb": {"NewImage": {..}}}]}`,
//!   whose images are typed attribute maps;
//! - a plain array, `[{"eventKind", "recordId", "newImage"}]`, whose images
//!   are plain documents.
//!
//! Responses use the partial-batch-failure layout
//! `{"batchItemFailures": [{"itemIdentifier": id}]}`.

use domain::{BatchResponse, ChangeRecord, EventKind, RecordId, RecordImage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize)]
struct StreamEnvelope {
    #[serde(rename = "Records")]
    records: Vec<StreamRecord>,
}

#[derive(Deserialize)]
struct StreamRecord {
    #[serde(rename = "eventID")]
    event_id: RecordId,
    #[serde(rename = "eventName")]
    event_name: EventKind,
    #[serde(default)]
    dynamodb: StreamChange,
}

#[derive(Default, Deserialize)]
struct StreamChange {
    #[serde(rename = "NewImage", default)]
    new_image: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlainRecord {
    event_kind: EventKind,
    record_id: RecordId,
    #[serde(default)]
    new_image: Option<Value>,
}

/// Decodes one batch envelope.
///
/// # Errors
///
/// Returns the parse error when `text` is neither layout. Individual record
/// images are not inspected here; a malformed image fails only its record
/// later on.
pub fn decode_batch(text: &str) -> Result<Vec<ChangeRecord>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_object() {
        let envelope = StreamEnvelope::deserialize(value)?;
        return Ok(envelope
            .records
            .into_iter()
            .map(|record| ChangeRecord {
                event_kind: record.event_name,
                record_id: record.event_id,
                new_image: record.dynamodb.new_image.map(RecordImage::Attributes),
            })
            .collect());
    }

    let records = Vec::<PlainRecord>::deserialize(value)?;
    Ok(records
        .into_iter()
        .map(|record| ChangeRecord {
            event_kind: record.event_kind,
            record_id: record.record_id,
            new_image: record.new_image.map(RecordImage::Document),
        })
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchItemFailures<'a> {
    batch_item_failures: Vec<ItemFailure<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemFailure<'a> {
    item_identifier: &'a RecordId,
}

/// Encodes `response` in the partial-batch-failure layout.
///
/// # Errors
///
/// Propagates the serialiser error; none is expected for this layout.
pub fn encode_response(response: &BatchResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(&BatchItemFailures {
        batch_item_failures: response
            .failed_record_ids
            .iter()
            .map(|id| ItemFailure {
                item_identifier: id,
            })
            .collect(),
    })
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
