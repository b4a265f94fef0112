use crate::{GameError, RoundId};
use serde::{Deserialize, Serialize};

/// A stake riding on a round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub amount: f64,
    pub round_id: RoundId,
}

/// Player wallet. The balance never goes negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    balance: f64,
}

impl Wallet {
    /// Restore a wallet from a persisted balance. Values that are not finite or are
    /// negative restore as an empty wallet.
    pub fn new(balance: f64) -> Self {
        let balance = if balance.is_finite() && balance > 0.0 {
            balance
        } else {
            0.0
        };
        Self { balance }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn can_cover(&self, amount: f64) -> bool {
        amount <= self.balance
    }

    /// Remove `amount` from the wallet, returning the new balance.
    pub fn debit(&mut self, amount: f64) -> Result<f64, GameError> {
        if !self.can_cover(amount) {
            return Err(GameError::InsufficientFunds {
                amount,
                balance: self.balance,
            });
        }
        self.balance = (self.balance - amount).max(0.0);
        Ok(self.balance)
    }

    /// Add `amount` to the wallet, returning the new balance.
    pub fn credit(&mut self, amount: f64) -> f64 {
        if amount.is_finite() && amount > 0.0 {
            self.balance += amount;
        }
        self.balance
    }
}

/// Parse a player-entered bet amount.
pub fn parse_amount(raw: &str) -> Result<f64, GameError> {
    let trimmed = raw.trim();
    let amount = trimmed
        .parse::<f64>()
        .map_err(|_| GameError::InvalidAmount(format!("not a number: {trimmed:?}")))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(GameError::InvalidAmount(format!(
            "must be a positive number: {trimmed}"
        )));
    }
    Ok(amount)
}
