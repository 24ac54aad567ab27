//! Builders to construct retry policies from code or configuration.

pub mod retry_builder;

pub use retry_builder::RetryPolicyBuilder;
