use super::banknote::Banknote;
use super::card::{AuthenticationToken, Card};
use super::money::Money;
use crate::error::Result;
use async_trait::async_trait;

/// Outcome of presenting a card for authorization.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Authorization {
    Authorized(AuthenticationToken),
    Refused,
}

impl From<Option<AuthenticationToken>> for Authorization {
    fn from(token: Option<AuthenticationToken>) -> Self {
        token.map_or(Authorization::Refused, Authorization::Authorized)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ChargeOutcome {
    Charged,
    Declined,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReleaseOutcome {
    Released,
    Unavailable,
}

#[async_trait]
pub trait CardAuthorizer: Send + Sync {
    async fn authorize(&self, card: &Card) -> Result<Authorization>;
}

#[async_trait]
pub trait AccountCharger: Send + Sync {
    async fn start_transaction(&self, token: &AuthenticationToken) -> Result<()>;
    async fn charge(&self, token: &AuthenticationToken, money: &Money) -> Result<ChargeOutcome>;
    /// Reverses a previous successful charge of `money`.
    async fn refund(&self, token: &AuthenticationToken, money: &Money) -> Result<()>;
}

#[async_trait]
pub trait CashDispenser: Send + Sync {
    async fn release_banknotes(&self, banknotes: &[Banknote]) -> Result<ReleaseOutcome>;
}

pub type CardAuthorizerBox = Box<dyn CardAuthorizer>;
pub type AccountChargerBox = Box<dyn AccountCharger>;
pub type CashDispenserBox = Box<dyn CashDispenser>;
