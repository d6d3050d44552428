use super::in_memory::{InMemoryBank, InMemoryCardAuthorizer, InMemoryMoneyDepot};
use crate::domain::money::Currency;
use crate::error::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CardEntry {
    pub card_number: String,
    pub pin_number: u32,
    pub user_id: String,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AccountEntry {
    pub user_id: String,
    pub currency: Currency,
    pub balance: i64,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CassetteEntry {
    pub value: u32,
    pub currency: Currency,
    pub count: u64,
}

/// Describes the simulated bank the CLI runs withdrawals against.
///
/// ```json
/// {
///   "cards": [{ "card_number": "4840932426207833", "pin_number": 1234, "user_id": "alice" }],
///   "accounts": [{ "user_id": "alice", "currency": "PL", "balance": 500 }],
///   "depot": [{ "value": 10, "currency": "PL", "count": 100 }]
/// }
/// ```
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct BankFixture {
    pub cards: Vec<CardEntry>,
    pub accounts: Vec<AccountEntry>,
    pub depot: Vec<CassetteEntry>,
}

/// The three collaborators built from a fixture.
pub struct SimulatedBank {
    pub card_authorizer: InMemoryCardAuthorizer,
    pub bank: InMemoryBank,
    pub money_depot: InMemoryMoneyDepot,
}

impl BankFixture {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Builds the in-memory collaborators, summing repeated accounts and cassettes.
    pub async fn into_simulation(self) -> Result<SimulatedBank> {
        let card_authorizer = InMemoryCardAuthorizer::new();
        for card in self.cards {
            card_authorizer
                .register(&card.card_number, card.pin_number, &card.user_id)
                .await;
        }

        let bank = InMemoryBank::new();
        for account in self.accounts {
            bank.deposit(&account.user_id, account.currency, account.balance)
                .await?;
        }

        let money_depot = InMemoryMoneyDepot::new();
        for cassette in self.depot {
            money_depot
                .load(cassette.value, cassette.currency, cassette.count)
                .await?;
        }

        Ok(SimulatedBank {
            card_authorizer,
            bank,
            money_depot,
        })
    }
}
