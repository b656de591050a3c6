//! Handlers shared by every resource.
//!
//! List, get and delete behave the same for users and books, so they are
//! written once against [`Resource`] and mounted per record type, e.g.
//! `get(get_record::<Book>)`. Create and update differ per resource and
//! live in their own modules, but finish through [`insert_record`] and
//! [`update_record`].

use axum::{Json, extract::State, http::StatusCode};
use bookshelf_core::{
    Page, PageRequest, Resource,
    bson::{self, Document, oid::ObjectId},
};
use bookshelf_store::{InsertOutcome, UpdateOutcome};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ListQuery, QueryParams, RecordId};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// List response: a page, or every record when pagination is switched off.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    All(Vec<T>),
}

/// Response carrying only a confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for a partial update.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub result: UpdateOutcome,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Decode a listing. Documents that do not fit the record type are logged
/// and left out; they still count towards `totalCount`.
fn decode_all<R: Resource>(documents: Vec<Document>) -> Vec<R> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get("_id").cloned();
            match bson::from_document(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        id = ?id,
                        error = %e,
                        "Skipping undecodable document"
                    );
                    None
                }
            }
        })
        .collect()
}

fn not_found<R: Resource>(id: ObjectId) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", R::LABEL, id))
}

/// Load one record, or 404.
pub(crate) async fn load_record<R: Resource>(state: &AppState, id: ObjectId) -> ApiResult<R> {
    let document = state
        .gateway()
        .find_one(R::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    Ok(bson::from_document(document)?)
}

/// Insert a validated, identifier-free document and answer 201.
pub(crate) async fn insert_record<R: Resource>(
    state: &AppState,
    document: Document,
) -> ApiResult<(StatusCode, Json<InsertOutcome>)> {
    let outcome = state.gateway().insert_one(R::COLLECTION, document).await?;

    tracing::info!(
        collection = R::COLLECTION,
        id = %outcome.inserted_id,
        "{} created",
        R::LABEL
    );

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Apply a validated `$set` and translate the acknowledgment.
pub(crate) async fn update_record<R: Resource>(
    state: &AppState,
    id: ObjectId,
    fields: Document,
) -> ApiResult<Json<UpdateResponse>> {
    let outcome = state
        .gateway()
        .update_one(R::COLLECTION, id, Document::new(), fields)
        .await?;
    update_response::<R>(id, outcome)
}

/// Translate an update acknowledgment; nothing matched means 404.
pub(crate) fn update_response<R: Resource>(
    id: ObjectId,
    outcome: UpdateOutcome,
) -> ApiResult<Json<UpdateResponse>> {
    if outcome.matched_count == 0 {
        return Err(not_found::<R>(id));
    }

    let message = if outcome.modified_count == 0 {
        "No changes made".to_string()
    } else {
        tracing::info!(collection = R::COLLECTION, id = %id, "{} updated", R::LABEL);
        format!("{} updated successfully", R::LABEL)
    };

    Ok(Json(UpdateResponse {
        message,
        result: outcome,
    }))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /books, /users - List records.
///
/// # Response
///
/// - 200 OK: `{ "items": [...], "totalCount", "totalPages", "currentPage" }`,
///   or a plain array when pagination is disabled
/// - 400 Bad Request: `page`/`limit` not positive integers, or `limit` too large
pub async fn list_records<R: Resource>(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Listing<R>>> {
    let gateway = state.gateway();
    let config = state.config();

    if !config.pagination {
        let documents = gateway.find(R::COLLECTION, 0, None).await?;
        return Ok(Json(Listing::All(decode_all(documents))));
    }

    let request = PageRequest::new(query.page, query.limit, config.max_page_size)?;
    let total = gateway.count(R::COLLECTION).await?;
    let documents = gateway
        .find(R::COLLECTION, request.skip(), Some(request.limit()))
        .await?;

    tracing::debug!(
        collection = R::COLLECTION,
        page = request.page(),
        returned = documents.len(),
        total,
        "Listed records"
    );

    Ok(Json(Listing::Paged(Page::new(
        decode_all(documents),
        total,
        request,
    ))))
}

/// GET /book/{id}, /user/{id} - Fetch one record.
///
/// # Response
///
/// - 200 OK: the record
/// - 400 Bad Request: malformed id
/// - 404 Not Found: no such record
pub async fn get_record<R: Resource>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<R>> {
    Ok(Json(load_record::<R>(&state, id).await?))
}

/// DELETE /book/{id}, /user/{id} - Delete one record.
///
/// # Response
///
/// - 200 OK: `{ "message": "... deleted successfully" }`
/// - 400 Bad Request: malformed id
/// - 404 Not Found: nothing was removed
pub async fn delete_record<R: Resource>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<MessageResponse>> {
    let outcome = state.gateway().delete_one(R::COLLECTION, id).await?;

    if outcome.deleted_count == 0 {
        return Err(not_found::<R>(id));
    }

    tracing::info!(collection = R::COLLECTION, id = %id, "{} deleted", R::LABEL);

    Ok(Json(MessageResponse {
        message: format!("{} deleted successfully", R::LABEL),
    }))
}
