//! Axum router configuration for payment endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{
    create_order, handle_razorpay_webhook, health, verify_payment, webhook_panic_response,
    PaymentsAppState,
};

/// Create the payment RPC router.
///
/// # Routes
/// - `POST /orders` - Create a gateway order (requires authentication)
/// - `POST /verify` - Verify a checkout signature (authentication optional)
///
/// Bearer tokens are validated by `auth_middleware`; an invalid token is
/// rejected on both routes.
pub fn payment_routes(auth: AuthState) -> Router<PaymentsAppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/verify", post(verify_payment))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
}

/// Create the gateway webhook router.
///
/// Separate from the RPC routes because webhooks carry no user token; they
/// are authenticated by their HMAC header. A panic in a webhook route is
/// answered with the generic 500 body.
///
/// # Routes
/// - `POST /razorpay` - Handle payment webhooks
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/razorpay", post(handle_razorpay_webhook))
        .layer(CatchPanicLayer::custom(webhook_panic_response))
}

/// Create the complete payments router, suitable for mounting at `/api`.
pub fn payment_router(auth: AuthState) -> Router<PaymentsAppState> {
    Router::new()
        .nest("/payments", payment_routes(auth))
        .nest("/webhooks", webhook_routes())
}

/// Build the full application with state applied.
///
/// # Example
///
/// ```ignore
/// let app = payments_app(state, Arc::new(FirebaseSessionValidator::new(config)));
/// axum::serve(listener, app).await?;
/// ```
pub fn payments_app(state: PaymentsAppState, auth: AuthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", payment_router(auth))
        .with_state(state)
}
