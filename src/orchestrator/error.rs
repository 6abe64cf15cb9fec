//! Error types for strategy attempts.

use crate::provider::ProviderError;
use thiserror::Error;

/// Why a strategy could not produce a result.
///
/// Every variant means "strategy unavailable": the chain logs it and moves
/// on to the next strategy.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// External provider call failed (network, auth, upstream status, bad body).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The strategy cannot handle this particular input.
    #[error("Unusable input: {0}")]
    Unusable(String),

    /// Any other failure inside the strategy.
    #[error("Strategy error: {0}")]
    Internal(String),
}
