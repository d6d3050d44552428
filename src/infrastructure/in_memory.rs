use crate::domain::banknote::Banknote;
use crate::domain::card::{AuthenticationToken, Card};
use crate::domain::money::{Currency, Money};
use crate::domain::ports::{
    AccountCharger, Authorization, CardAuthorizer, CashDispenser, ChargeOutcome, ReleaseOutcome,
};
use crate::error::{AtmError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CardRecord {
    pin_number: u32,
    user_id: String,
}

/// A thread-safe in-memory card registry.
///
/// Authorizes a card when its number is registered and the PIN matches,
/// issuing a fresh authorization code every time.
#[derive(Default, Clone)]
pub struct InMemoryCardAuthorizer {
    cards: Arc<RwLock<HashMap<String, CardRecord>>>,
    next_code: Arc<AtomicU64>,
}

impl InMemoryCardAuthorizer {
    /// Creates a new, empty card registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a card for `user_id`, replacing any previous registration.
    pub async fn register(&self, card_number: &str, pin_number: u32, user_id: &str) {
        let mut cards = self.cards.write().await;
        cards.insert(
            card_number.to_string(),
            CardRecord {
                pin_number,
                user_id: user_id.to_string(),
            },
        );
    }
}

#[async_trait]
impl CardAuthorizer for InMemoryCardAuthorizer {
    async fn authorize(&self, card: &Card) -> Result<Authorization> {
        let cards = self.cards.read().await;
        let token = cards
            .get(&card.card_number)
            .filter(|record| record.pin_number == card.pin_number)
            .map(|record| {
                let code = self.next_code.fetch_add(1, Ordering::Relaxed) + 1;
                AuthenticationToken::new(record.user_id.clone(), code)
            });
        Ok(token.into())
    }
}

/// A thread-safe in-memory ledger keyed by user and currency.
///
/// A charge is only accepted inside a transaction opened for the same
/// authorization code, and it closes that transaction.
#[derive(Default, Clone)]
pub struct InMemoryBank {
    balances: Arc<RwLock<HashMap<(String, Currency), i64>>>,
    open_transactions: Arc<RwLock<HashSet<u64>>>,
}

impl InMemoryBank {
    /// Creates a new ledger with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to the account of `user_id` in `currency`.
    pub async fn deposit(&self, user_id: &str, currency: Currency, amount: i64) -> Result<()> {
        let mut balances = self.balances.write().await;
        let balance = balances.entry((user_id.to_string(), currency)).or_default();
        *balance = balance.checked_add(amount).ok_or_else(|| {
            AtmError::Config(format!(
                "Balance of {} in {} overflows when adding {}",
                user_id, currency, amount
            ))
        })?;
        Ok(())
    }

    pub async fn balance(&self, user_id: &str, currency: Currency) -> i64 {
        let balances = self.balances.read().await;
        balances
            .get(&(user_id.to_string(), currency))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl AccountCharger for InMemoryBank {
    async fn start_transaction(&self, token: &AuthenticationToken) -> Result<()> {
        let mut open = self.open_transactions.write().await;
        open.insert(token.authorization_code);
        debug!(user = %token.user_id, code = token.authorization_code, "Transaction started");
        Ok(())
    }

    async fn charge(&self, token: &AuthenticationToken, money: &Money) -> Result<ChargeOutcome> {
        if !self
            .open_transactions
            .write()
            .await
            .remove(&token.authorization_code)
        {
            return Err(AtmError::Collaborator(format!(
                "No open transaction for authorization code {}",
                token.authorization_code
            )));
        }

        let mut balances = self.balances.write().await;
        match balances.get_mut(&(token.user_id.clone(), money.currency)) {
            Some(balance) if *balance >= money.amount => {
                *balance -= money.amount;
                Ok(ChargeOutcome::Charged)
            }
            _ => Ok(ChargeOutcome::Declined),
        }
    }

    async fn refund(&self, token: &AuthenticationToken, money: &Money) -> Result<()> {
        self.deposit(&token.user_id, money.currency, money.amount)
            .await
            .map_err(|e| AtmError::Collaborator(format!("Refund failed: {}", e)))
    }
}

/// A thread-safe in-memory banknote cassette set.
///
/// Releases are all-or-nothing: if any requested note is missing, nothing
/// leaves the depot.
#[derive(Default, Clone)]
pub struct InMemoryMoneyDepot {
    stock: Arc<RwLock<HashMap<Banknote, u64>>>,
}

impl InMemoryMoneyDepot {
    /// Creates a new, empty depot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` notes of `value` in `currency` to the stock.
    pub async fn load(&self, value: u32, currency: Currency, count: u64) -> Result<()> {
        let mut stock = self.stock.write().await;
        let have = stock.entry(Banknote::new(value, currency)).or_default();
        *have = have.checked_add(count).ok_or_else(|| {
            AtmError::Config(format!("Stock of {} {} notes overflows", value, currency))
        })?;
        Ok(())
    }

    pub async fn stock(&self, value: u32, currency: Currency) -> u64 {
        let stock = self.stock.read().await;
        stock
            .get(&Banknote::new(value, currency))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CashDispenser for InMemoryMoneyDepot {
    async fn release_banknotes(&self, banknotes: &[Banknote]) -> Result<ReleaseOutcome> {
        let mut requested: HashMap<Banknote, u64> = HashMap::new();
        for note in banknotes {
            *requested.entry(*note).or_default() += 1;
        }

        let mut stock = self.stock.write().await;
        let covered = requested
            .iter()
            .all(|(note, count)| stock.get(note).is_some_and(|have| have >= count));
        if !covered {
            return Ok(ReleaseOutcome::Unavailable);
        }

        for (note, count) in requested {
            if let Some(have) = stock.get_mut(&note) {
                *have -= count;
            }
        }
        Ok(ReleaseOutcome::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_card_authorizer_checks_pin() {
        let authorizer = InMemoryCardAuthorizer::new();
        authorizer.register("1111", 1234, "alice").await;

        let granted = authorizer.authorize(&Card::new("1111", 1234)).await.unwrap();
        assert!(matches!(
            granted,
            Authorization::Authorized(ref token) if token.user_id == "alice"
        ));

        let wrong_pin = authorizer.authorize(&Card::new("1111", 4321)).await.unwrap();
        assert_eq!(wrong_pin, Authorization::Refused);

        let unknown = authorizer.authorize(&Card::new("2222", 1234)).await.unwrap();
        assert_eq!(unknown, Authorization::Refused);
    }

    #[tokio::test]
    async fn test_card_authorizer_issues_fresh_codes() {
        let authorizer = InMemoryCardAuthorizer::new();
        authorizer.register("1111", 1234, "alice").await;
        let card = Card::new("1111", 1234);

        let first = authorizer.authorize(&card).await.unwrap();
        let second = authorizer.authorize(&card).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_bank_charge_and_refund() {
        let bank = InMemoryBank::new();
        bank.deposit("alice", Currency::Pl, 50).await.unwrap();
        let token = AuthenticationToken::new("alice", 1);
        let money = Money::new(30, Currency::Pl);

        bank.start_transaction(&token).await.unwrap();
        assert_eq!(
            bank.charge(&token, &money).await.unwrap(),
            ChargeOutcome::Charged
        );
        assert_eq!(bank.balance("alice", Currency::Pl).await, 20);

        bank.refund(&token, &money).await.unwrap();
        assert_eq!(bank.balance("alice", Currency::Pl).await, 50);
    }

    #[tokio::test]
    async fn test_bank_deposit_overflow_is_rejected() {
        let bank = InMemoryBank::new();
        bank.deposit("alice", Currency::Pl, i64::MAX).await.unwrap();

        let result = bank.deposit("alice", Currency::Pl, 1).await;
        assert!(matches!(result, Err(AtmError::Config(_))));
        assert_eq!(bank.balance("alice", Currency::Pl).await, i64::MAX);
    }

    #[tokio::test]
    async fn test_depot_load_overflow_is_rejected() {
        let depot = InMemoryMoneyDepot::new();
        depot.load(10, Currency::Pl, u64::MAX).await.unwrap();

        let result = depot.load(10, Currency::Pl, 1).await;
        assert!(matches!(result, Err(AtmError::Config(_))));
    }

    #[tokio::test]
    async fn test_bank_declines_overdraft() {
        let bank = InMemoryBank::new();
        bank.deposit("alice", Currency::Pl, 20).await.unwrap();
        let token = AuthenticationToken::new("alice", 1);

        bank.start_transaction(&token).await.unwrap();
        let outcome = bank
            .charge(&token, &Money::new(30, Currency::Pl))
            .await
            .unwrap();
        assert_eq!(outcome, ChargeOutcome::Declined);
        assert_eq!(bank.balance("alice", Currency::Pl).await, 20);
    }

    #[tokio::test]
    async fn test_bank_requires_open_transaction() {
        let bank = InMemoryBank::new();
        bank.deposit("alice", Currency::Pl, 20).await.unwrap();
        let token = AuthenticationToken::new("alice", 1);
        let money = Money::new(10, Currency::Pl);

        let result = bank.charge(&token, &money).await;
        assert!(matches!(result, Err(AtmError::Collaborator(_))));

        // One charge per transaction.
        bank.start_transaction(&token).await.unwrap();
        bank.charge(&token, &money).await.unwrap();
        assert!(bank.charge(&token, &money).await.is_err());
    }

    #[tokio::test]
    async fn test_depot_release_is_all_or_nothing() {
        let depot = InMemoryMoneyDepot::new();
        depot.load(20, Currency::Pl, 1).await.unwrap();
        depot.load(10, Currency::Pl, 3).await.unwrap();

        let notes = vec![Banknote::new(20, Currency::Pl), Banknote::new(20, Currency::Pl)];
        assert_eq!(
            depot.release_banknotes(&notes).await.unwrap(),
            ReleaseOutcome::Unavailable
        );
        assert_eq!(depot.stock(20, Currency::Pl).await, 1);

        let notes = vec![Banknote::new(20, Currency::Pl), Banknote::new(10, Currency::Pl)];
        assert_eq!(
            depot.release_banknotes(&notes).await.unwrap(),
            ReleaseOutcome::Released
        );
        assert_eq!(depot.stock(20, Currency::Pl).await, 0);
        assert_eq!(depot.stock(10, Currency::Pl).await, 2);
    }

    #[tokio::test]
    async fn test_depot_keeps_currencies_apart() {
        let depot = InMemoryMoneyDepot::new();
        depot.load(10, Currency::Eur, 5).await.unwrap();

        let notes = vec![Banknote::new(10, Currency::Pl)];
        assert_eq!(
            depot.release_banknotes(&notes).await.unwrap(),
            ReleaseOutcome::Unavailable
        );
    }
}
