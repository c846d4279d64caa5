//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Identifier of an authenticated storefront customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gateway-issued order identifier (`order_...`).
///
/// Primary key of every persisted payment record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new OrderId, returning error if empty.
    ///
    /// Gateway ids are opaque and signed byte for byte, so they are not trimmed.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("order_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gateway-issued payment identifier (`pay_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Creates a new PaymentId, returning error if empty.
    ///
    /// Gateway ids are opaque and signed byte for byte, so they are not trimmed.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("payment_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert_eq!(UserId::new("uid-1").unwrap().as_str(), "uid-1");
    }

    #[test]
    fn order_id_rejects_only_empty() {
        assert!(OrderId::new("").is_err());
        assert_eq!(OrderId::new("   ").unwrap().as_str(), "   ");
    }

    #[test]
    fn order_id_keeps_value_verbatim() {
        let id = OrderId::new("order_N5fJz0K1a2b3c4").unwrap();
        assert_eq!(id.to_string(), "order_N5fJz0K1a2b3c4");
    }

    #[test]
    fn payment_id_rejects_empty() {
        assert!(PaymentId::new("").is_err());
        assert_eq!(PaymentId::new("pay_1").unwrap().as_str(), "pay_1");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = OrderId::new("order_1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"order_1\"");
    }
}
