//! Book routes.
//!
//! - GET /books, GET /book - List books
//! - POST /book - Create a book
//! - GET /book/{id} - Fetch a book
//! - PATCH /book/{id} - Partial update
//! - DELETE /book/{id} - Delete a book

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use bookshelf_core::{Book, BookPatch, NewBook, Resource, bson};
use bookshelf_store::InsertOutcome;

use crate::error::{ApiError, ApiResult};
use crate::extract::{Payload, RecordId};
use crate::routes::records::{
    UpdateResponse, delete_record, get_record, insert_record, list_records, load_record,
    update_record, update_response,
};
use crate::state::AppState;

/// Guarded copy-count updates tried before answering 409.
const COPY_UPDATE_ATTEMPTS: u32 = 3;

/// POST /book - Create a book.
///
/// # Request
///
/// Body: `{ "title": "...", "author": "...", "totalCopies": 3, "availableCopies": 3, ... }`
///
/// # Response
///
/// - 201 Created: `{ "acknowledged": true, "insertedId": "..." }`
/// - 400 Bad Request: invalid body, or `availableCopies` above `totalCopies`
async fn create_book(
    State(state): State<AppState>,
    Payload(payload): Payload,
) -> ApiResult<(StatusCode, Json<InsertOutcome>)> {
    let book = NewBook::from_payload(payload)?;
    insert_record::<Book>(&state, bson::to_document(&book)?).await
}

/// PATCH /book/{id} - Merge fields into a book.
///
/// Identifier fields in the body are ignored. When the patch changes a copy
/// count, the stored book is read first so the merged result still has
/// `availableCopies <= totalCopies`, and the write only lands while the
/// stored counts are the ones that were checked. A book whose counts keep
/// changing is answered with 409.
///
/// # Response
///
/// - 200 OK: `{ "message": "Book updated successfully" | "No changes made", "result": {...} }`
/// - 400 Bad Request: malformed id, empty or invalid body
/// - 404 Not Found: no such book
/// - 409 Conflict: copy counts changed on every attempt
async fn update_book(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Payload(payload): Payload,
) -> ApiResult<Json<UpdateResponse>> {
    let patch = BookPatch::from_payload(payload)?;
    let fields = bson::to_document(&patch)?;

    if !patch.touches_copies() {
        return update_record::<Book>(&state, id, fields).await;
    }

    for attempt in 1..=COPY_UPDATE_ATTEMPTS {
        let current = load_record::<Book>(&state, id).await?;
        patch.check_against(&current)?;

        let expected = bson::doc! {
            "totalCopies": current.total_copies,
            "availableCopies": current.available_copies,
        };
        let outcome = state
            .gateway()
            .update_one(Book::COLLECTION, id, expected, fields.clone())
            .await?;
        if outcome.matched_count > 0 {
            return update_response::<Book>(id, outcome);
        }

        tracing::debug!(id = %id, attempt, "Copy counts changed during update");
    }

    Err(ApiError::Conflict(format!(
        "Book {id} changed while it was being updated; try again"
    )))
}

/// Build book routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_records::<Book>))
        .route("/book", get(list_records::<Book>).post(create_book))
        .route(
            "/book/{id}",
            get(get_record::<Book>)
                .patch(update_book)
                .delete(delete_record::<Book>),
        )
}
