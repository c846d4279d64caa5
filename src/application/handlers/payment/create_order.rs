//! CreateOrderHandler - Command handler for creating gateway orders.

use std::sync::Arc;

use crate::application::retry::BackoffExecutor;
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::payment::{MinorUnits, PaymentError};
use crate::ports::{CreateOrderRequest, GatewayOrder, PaymentGateway};

/// Command to create an order for a checkout.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Signed-in caller; `None` is rejected.
    pub caller: Option<AuthenticatedUser>,
    /// Amount in major units (rupees), as sent by the storefront.
    pub amount: Option<f64>,
}

/// Handler for order creation.
///
/// Converts the amount to minor units and asks the gateway for an order,
/// retrying transient gateway failures. Nothing is persisted here.
pub struct CreateOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    executor: BackoffExecutor,
    currency: String,
}

impl CreateOrderHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        executor: BackoffExecutor,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            executor,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<GatewayOrder, PaymentError> {
        let caller = cmd
            .caller
            .ok_or_else(|| PaymentError::unauthenticated("User must be authenticated"))?;

        let amount = cmd
            .amount
            .ok_or_else(|| PaymentError::invalid_argument("Amount is required"))?;
        let amount = MinorUnits::from_major(amount)?;

        let request = CreateOrderRequest::new(amount, self.currency.clone());
        let gateway = &self.gateway;

        let order = self
            .executor
            .execute(|| gateway.create_order(request.clone()))
            .await
            .map_err(|err| {
                tracing::error!(
                    user_id = %caller.id,
                    amount = amount.value(),
                    error = %err,
                    "Order creation failed"
                );
                PaymentError::internal_with_source("Failed to create order", err)
            })?;

        tracing::info!(
            user_id = %caller.id,
            order_id = %order.id,
            amount = amount.value(),
            "Order created"
        );

        Ok(order)
    }
}
