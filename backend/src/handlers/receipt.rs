//! HTTP handler for order slip generation

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use super::extract::ApiJson;
use crate::error::AppResult;
use crate::services::receipt::ReceiptRequest;
use crate::AppState;

/// Render an order slip; the body is the printable document itself
pub async fn generate_receipt(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReceiptRequest>,
) -> AppResult<Response> {
    let document = state
        .receipts
        .render(&request.transaction, &request.items)?;

    tracing::info!(
        slip_no = %request.transaction.slip_no,
        lines = request.items.len(),
        "Order slip rendered"
    );
    Ok(([(header::CONTENT_TYPE, state.receipts.content_type())], document).into_response())
}
