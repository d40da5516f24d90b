//! HTTP request handlers

use super::types::{
    CharityDetailResponse, CharityListQuery, CharityListResponse, ChatRequest, ChatResponse,
    ConversationCreatedResponse, ErrorResponse, SelectCharityRequest, TransactionListResponse,
    WalletConnectResponse,
};
use super::AppState;
use crate::registry::{Category, CharityId};
use crate::runtime::{failure_message, DonationOutcome, RuntimeError};
use crate::wallet::{format_short, resolve_cronos_id, WalletError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Charity browsing
        .route("/api/charities", get(list_charities))
        .route("/api/charities/:id", get(get_charity))
        // Dialogue sessions
        .route("/api/conversations/new", post(create_conversation))
        .route("/api/conversations/:id/chat", post(send_chat))
        .route("/api/conversations/:id/select", post(select_charity))
        // Payment
        .route(
            "/api/conversations/:id/invoices/:invoice_id/pay",
            post(pay_invoice),
        )
        .route("/api/wallet/connect", post(connect_wallet))
        .route("/api/transactions", get(list_transactions))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Charity Browsing
// ============================================================

async fn list_charities(
    State(state): State<AppState>,
    Query(query): Query<CharityListQuery>,
) -> Result<Json<CharityListResponse>, AppError> {
    let registry = state.runtime.registry();
    let charities = match query.category.as_deref().map(str::trim) {
        None | Some("") => registry.all().to_vec(),
        Some(all) if all.eq_ignore_ascii_case("all") => registry.all().to_vec(),
        Some(name) => {
            let category = name
                .parse::<Category>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            registry.filter(category).into_iter().cloned().collect()
        }
    };

    Ok(Json(CharityListResponse { charities }))
}

async fn get_charity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CharityDetailResponse>, AppError> {
    let charity = state
        .runtime
        .registry()
        .get(&CharityId::new(id.clone()))
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Charity not found: {id}")))?;

    Ok(Json(CharityDetailResponse {
        short_address: format_short(&charity.address),
        cronos_id: resolve_cronos_id(&charity.address),
        charity,
    }))
}

// ============================================================
// Dialogue
// ============================================================

async fn create_conversation(
    State(state): State<AppState>,
) -> Json<ConversationCreatedResponse> {
    let conversation = state.runtime.create_conversation().await;
    Json(ConversationCreatedResponse {
        id: conversation.id().to_string(),
        phase: conversation.phase().await,
    })
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message text is empty".to_string()));
    }

    let turn = state.runtime.send_message(&id, &req.text).await?;
    Ok(Json(turn.into()))
}

async fn select_charity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectCharityRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let turn = state.runtime.select_charity(&id, &req.charity_id).await?;
    Ok(Json(turn.into()))
}

// ============================================================
// Payment
// ============================================================

async fn pay_invoice(
    State(state): State<AppState>,
    Path((id, invoice_id)): Path<(String, String)>,
) -> Result<Json<DonationOutcome>, AppError> {
    let outcome = state.runtime.pay_invoice(&id, &invoice_id).await?;
    Ok(Json(outcome))
}

async fn connect_wallet(
    State(state): State<AppState>,
) -> Result<Json<WalletConnectResponse>, AppError> {
    let account = state.runtime.connect_wallet().await?;
    let short_account = format_short(account.as_str());

    Ok(Json(WalletConnectResponse {
        message: format!("Welcome! Wallet connected: {short_account}"),
        account: account.as_str().to_string(),
        short_account,
    }))
}

async fn list_transactions(State(state): State<AppState>) -> Json<TransactionListResponse> {
    Json(TransactionListResponse {
        transactions: state.runtime.transactions(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("cronos-charity-agent ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// The wallet or node failed; message is chat-ready
    Wallet(String),
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        AppError::Wallet(failure_message(&err))
    }
}

impl From<RuntimeError> for AppError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::ConversationNotFound(_)
            | RuntimeError::InvoiceNotFound(_)
            | RuntimeError::Transition(_) => AppError::NotFound(err.to_string()),
            RuntimeError::InvoiceBusy(_) | RuntimeError::InvoiceAlreadyPaid(_) => {
                AppError::Conflict(err.to_string())
            }
            RuntimeError::Wallet(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Wallet(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
