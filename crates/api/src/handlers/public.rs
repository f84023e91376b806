//! Unauthenticated handlers: public submission and the token-based
//! response protocol.
//!
//! The response token in the path is the caller's only credential. These
//! handlers never expose more than [`PublicRequestView`].
//!
//! [`PublicRequestView`]: staffpurchase_db::models::purchase_request::PublicRequestView

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use staffpurchase_core::lifecycle::RequestStatus;
use staffpurchase_core::purchase_request::PurchaseRequestInput;

use super::purchase_requests::{CreatedId, CREATED_MESSAGE};
use crate::engine::lifecycle::{Sender, PUBLIC_SENDER_NAME};
use crate::error::{AppError, AppResult};
use crate::response::MessageWith;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RespondQuery {
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RespondBody {
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: RequestStatus,
}

/// POST /api/public/purchase-requests
///
/// Public submission. The configured administrator is recorded as sender.
pub async fn create_public_purchase_request(
    State(state): State<AppState>,
    Json(input): Json<PurchaseRequestInput>,
) -> AppResult<impl IntoResponse> {
    let sender = Sender {
        email: state.config.notifications.admin_email.clone(),
        name: PUBLIC_SENDER_NAME.to_string(),
    };
    let request = state.lifecycle().create(input, sender).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageWith::new(CREATED_MESSAGE, CreatedId { id: request.id })),
    ))
}

/// GET /api/public/request/{token}
///
/// Restricted read-only view for the response page.
pub async fn get_request_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let view = state.lifecycle().public_view(&token).await?;
    Ok(Json(view))
}

/// GET|POST /api/respond/{token}?action=confirm|approve|reject|needinfo
///
/// Redeems the token. A POST may carry `{"note": "..."}`; an empty body is
/// treated as no note. The body is only parsed once the token resolves.
pub async fn respond(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<RespondQuery>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let lifecycle = state.lifecycle();
    let current = lifecycle.resolve_by_token(&token).await?;
    let note = parse_note(&body)?;
    let request = lifecycle
        .respond_to(current, query.action.as_deref(), note)
        .await?;

    Ok(Json(MessageWith::new(
        "Response recorded successfully",
        StatusBody {
            status: request.status,
        },
    )))
}

fn parse_note(body: &[u8]) -> AppResult<Option<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let parsed: RespondBody = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
    Ok(parsed.note)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_body_means_no_note() {
        assert_eq!(parse_note(b"").unwrap(), None);
        assert_eq!(parse_note(b"  \n").unwrap(), None);
    }

    #[test]
    fn note_is_read_from_json_body() {
        assert_eq!(
            parse_note(br#"{"note":"Call me"}"#).unwrap().as_deref(),
            Some("Call me")
        );
        assert_eq!(parse_note(b"{}").unwrap(), None);
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        assert_matches!(parse_note(b"note=hi"), Err(AppError::BadRequest(_)));
    }
}
