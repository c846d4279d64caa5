//! Domain layer - payment rules with no I/O.

pub mod foundation;
pub mod payment;
