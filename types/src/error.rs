use thiserror::Error;

/// Player-facing validation failures.
///
/// Every variant is recoverable and is returned before any state changes. None of them
/// stop the round scheduler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("insufficient balance: bet {amount:.2}, balance {balance:.2}")]
    InsufficientFunds { amount: f64, balance: f64 },
    #[error("wait for the current round to finish")]
    RoundInProgress,
    #[error("a bet is already placed on the next round")]
    BetAlreadyPlaced,
    #[error("invalid bet amount: {0}")]
    InvalidAmount(String),
}

impl GameError {
    /// Stable code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            GameError::RoundInProgress => "ROUND_IN_PROGRESS",
            GameError::BetAlreadyPlaced => "BET_ALREADY_PLACED",
            GameError::InvalidAmount(_) => "INVALID_AMOUNT",
        }
    }
}
