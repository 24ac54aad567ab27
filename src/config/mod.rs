//! Configuration models for retry policies.

pub mod retry;

pub use retry::RetryConfig;
