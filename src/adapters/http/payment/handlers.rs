//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the payment command handlers.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::OptionalAuth;
use crate::application::handlers::payment::{
    CreateOrderCommand, CreateOrderHandler, HandleWebhookCommand, HandleWebhookHandler,
    VerifyPaymentCommand, VerifyPaymentHandler, WebhookReply,
};
use crate::application::retry::BackoffExecutor;
use crate::domain::payment::{
    PaymentError, PaymentSignatureVerifier, WebhookError, WebhookSignatureVerifier,
};
use crate::ports::{PaymentGateway, PaymentRecordRepository, WebhookPaymentRepository};

use super::dto::{
    CreateOrderRequest, HealthResponse, RpcErrorResponse, VerifyPaymentRequest, WebhookResponse,
};

/// Header carrying the webhook HMAC.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all payment dependencies.
///
/// Cloned for each request; everything expensive sits behind an `Arc`.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub payment_records: Arc<dyn PaymentRecordRepository>,
    pub webhook_payments: Arc<dyn WebhookPaymentRepository>,
    pub payment_verifier: PaymentSignatureVerifier,
    pub webhook_verifier: WebhookSignatureVerifier,
    pub executor: BackoffExecutor,
    pub currency: String,
    /// Allow-list for webhook redirect origins. `None` accepts any http(s) origin.
    pub redirect_origins: Option<Vec<String>>,
}

impl PaymentsAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.gateway.clone(),
            self.executor.clone(),
            self.currency.clone(),
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(self.payment_verifier.clone(), self.payment_records.clone())
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        let handler =
            HandleWebhookHandler::new(self.webhook_verifier.clone(), self.webhook_payments.clone());
        match &self.redirect_origins {
            Some(origins) => handler.with_allowed_origins(origins.clone()),
            None => handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// RPC Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/orders - Create a gateway order for the signed-in caller
pub async fn create_order(
    State(state): State<PaymentsAppState>,
    OptionalAuth(caller): OptionalAuth,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let amount = match payload {
        Ok(Json(request)) => request.amount(),
        Err(rejection) => Err(PaymentError::invalid_argument(rejection.body_text())),
    };

    // Without a caller the handler rejects before looking at the amount.
    let amount = match amount {
        Ok(amount) => amount,
        Err(err) if caller.is_some() => return Err(err.into()),
        Err(_) => None,
    };

    let handler = state.create_order_handler();
    let order = handler.handle(CreateOrderCommand { caller, amount }).await?;

    Ok(Json(order))
}

/// POST /api/payments/verify - Verify the checkout signature
pub async fn verify_payment(
    State(state): State<PaymentsAppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let Json(request) =
        payload.map_err(|rejection| PaymentError::invalid_argument(rejection.body_text()))?;

    let handler = state.verify_payment_handler();
    let result = handler.handle(VerifyPaymentCommand::from(request)).await?;

    Ok(Json(result))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/razorpay - Handle gateway payment webhooks
///
/// The body is taken as raw bytes so the HMAC is computed over exactly what
/// the gateway sent.
pub async fn handle_razorpay_webhook(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let cmd = HandleWebhookCommand {
        signature: header_value(SIGNATURE_HEADER),
        origin: header_value(header::ORIGIN.as_str()),
        raw_body: body.to_vec(),
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(reply) => render_webhook_reply(reply),
        Err(err) => WebhookApiError(err).into_response(),
    }
}

fn render_webhook_reply(reply: WebhookReply) -> Response {
    match reply {
        WebhookReply::Redirect { location } => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        WebhookReply::Acknowledged { message } => {
            (StatusCode::OK, Json(WebhookResponse::ok(message))).into_response()
        }
    }
}

/// Renders a panic inside a webhook route as the generic 500 reply.
///
/// Installed with `CatchPanicLayer::custom` on the webhook router.
pub fn webhook_panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Webhook handler panicked");
    WebhookApiError(WebhookError::Internal(detail)).into_response()
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to RPC responses.
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PaymentError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            PaymentError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            PaymentError::Internal { source, .. } => {
                match source {
                    Some(source) => tracing::error!(error = %self.0, cause = %source, "Payment request failed"),
                    None => tracing::error!(error = %self.0, "Payment request failed"),
                }
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = RpcErrorResponse::new(self.0.code(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}

/// Webhook errors are rendered with a fixed public message; details stay in logs.
pub struct WebhookApiError(WebhookError);

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = WebhookResponse::failed(self.0.public_message());
        (status, Json(body)).into_response()
    }
}
