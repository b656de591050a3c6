//! User routes.
//!
//! - GET /users - List users
//! - POST /user - Create a user
//! - GET /user/{id} - Fetch a user
//! - PATCH /user/{id} - Partial update
//! - DELETE /user/{id} - Delete a user
//!
//! Passwords are hashed before they are written and never returned.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use bookshelf_core::{NewUser, User, UserPatch, bson};
use bookshelf_store::InsertOutcome;

use crate::error::ApiResult;
use crate::extract::{Payload, RecordId};
use crate::routes::records::{
    UpdateResponse, delete_record, get_record, insert_record, list_records, update_record,
};
use crate::state::AppState;

/// POST /user - Create a user.
///
/// # Response
///
/// - 201 Created: `{ "acknowledged": true, "insertedId": "..." }`
/// - 400 Bad Request: invalid body
async fn create_user(
    State(state): State<AppState>,
    Payload(payload): Payload,
) -> ApiResult<(StatusCode, Json<InsertOutcome>)> {
    let mut user = NewUser::from_payload(payload)?;
    user.hash_password()?;
    insert_record::<User>(&state, bson::to_document(&user)?).await
}

/// PATCH /user/{id} - Merge fields into a user.
///
/// # Response
///
/// - 200 OK: `{ "message": "User updated successfully" | "No changes made", "result": {...} }`
/// - 400 Bad Request: malformed id, empty or invalid body
/// - 404 Not Found: no such user
async fn update_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Payload(payload): Payload,
) -> ApiResult<Json<UpdateResponse>> {
    let mut patch = UserPatch::from_payload(payload)?;
    patch.hash_password()?;
    update_record::<User>(&state, id, bson::to_document(&patch)?).await
}

/// Build user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_records::<User>))
        .route("/user", post(create_user))
        .route(
            "/user/{id}",
            get(get_record::<User>)
                .patch(update_user)
                .delete(delete_record::<User>),
        )
}
