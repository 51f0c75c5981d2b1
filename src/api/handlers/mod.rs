use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::db::{Database, StoreError};
use crate::models::*;

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid_id())
}

/// Decode a request body as JSON regardless of its `Content-Type`.
///
/// Only the first JSON value is read and anything after it is ignored. A
/// `null` body decodes as the default value. Object keys are matched
/// case-insensitively; when two keys fold to the same name the later wins.
fn decode_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    let value = match serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
    {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(ApiError::bad_request(e)),
        None => return Err(ApiError::bad_request("EOF")),
    };

    let value = match value {
        Value::Null => return Ok(T::default()),
        Value::Object(fields) => Value::Object(fold_keys(fields)),
        other => other,
    };

    serde_json::from_value(value).map_err(ApiError::bad_request)
}

fn fold_keys(fields: Map<String, Value>) -> Map<String, Value> {
    let mut folded = Map::new();
    for (key, value) in fields {
        folded.insert(key.to_lowercase(), value);
    }
    folded
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Notes
// ============================================================

/// Insert a note and echo the request back with the id storage assigned.
pub async fn create_note(
    State(db): State<Database>,
    body: Bytes,
) -> Result<Json<Note>, ApiError> {
    let input: CreateNoteInput = decode_body(&body)?;
    let id = db.create_note(&input).map_err(ApiError::internal)?;

    tracing::info!("created note: {}", id);

    Ok(Json(Note {
        id,
        title: input.title,
        content: input.content,
        created_at: input.created_at,
    }))
}

/// Update the non-empty fields of a note and echo the request back.
///
/// Title and content are written by separate statements. A failure in one
/// does not stop the other; any failure turns the response into a 400.
pub async fn update_note(
    State(db): State<Database>,
    body: Bytes,
) -> Result<Json<Note>, ApiError> {
    let input: UpdateNoteInput = decode_body(&body)?;
    let mut failures = Vec::new();

    if input.updates_title() {
        if let Err(e) = db.update_note_title(input.id, &input.title) {
            failures.push(e.to_string());
        }
    }

    if input.updates_content() {
        if let Err(e) = db.update_note_content(input.id, &input.content) {
            failures.push(e.to_string());
        }
    }

    if !failures.is_empty() {
        return Err(ApiError::BadRequest(failures.join("\n")));
    }

    tracing::info!("updated note: {}", input.id);

    Ok(Json(input.into()))
}

pub async fn delete_note(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    db.delete_note(id).map_err(ApiError::internal)?;

    tracing::info!("deleted note: {}", id);

    Ok(StatusCode::OK)
}

pub async fn get_note(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_id(&id)?;
    db.get_note(id)
        .map_err(ApiError::internal)?
        .map(Json)
        .ok_or_else(ApiError::note_not_found)
}

/// List every note. A query that cannot run is reported as a 400; a row
/// that cannot be decoded as a 500.
pub async fn list_notes(State(db): State<Database>) -> Result<Json<Vec<Note>>, ApiError> {
    db.get_all_notes().map(Json).map_err(|e| match e {
        StoreError::Statement(_) => ApiError::bad_request(e),
        _ => ApiError::internal(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_signed_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-7").unwrap(), -7);
    }

    #[test]
    fn decode_body_reads_only_the_first_value() {
        let input: CreateNoteInput =
            decode_body(br#"{"title": "a"} {"title": "b"} trailing"#).unwrap();
        assert_eq!(input.title, "a");
    }

    #[test]
    fn decode_body_treats_null_as_empty() {
        let input: UpdateNoteInput = decode_body(b"null").unwrap();
        assert_eq!(input.id, 0);
        assert!(!input.updates_title());
        assert!(!input.updates_content());
    }

    #[test]
    fn decode_body_matches_keys_case_insensitively() {
        let input: UpdateNoteInput =
            decode_body(br#"{"ID": 3, "Title": "x", "CONTENT": "y"}"#).unwrap();
        assert_eq!(input.id, 3);
        assert_eq!(input.title, "x");
        assert_eq!(input.content, "y");
    }

    #[test]
    fn decode_body_later_folded_key_wins() {
        let input: CreateNoteInput = decode_body(br#"{"title": "first", "TITLE": "second"}"#).unwrap();
        assert_eq!(input.title, "second");
    }

    #[test]
    fn decode_body_rejects_empty_and_malformed_bodies() {
        let bodies: [&[u8]; 5] = [b"", b"   ", b"{not json", b"[1, 2]", br#"{"title": 5}"#];
        for body in bodies {
            let err = decode_body::<CreateNoteInput>(body).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn parse_id_rejects_non_integers() {
        for raw in ["abc", "1.5", "", "9999999999999999999999"] {
            let err = parse_id(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
