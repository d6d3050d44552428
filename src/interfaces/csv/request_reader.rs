use crate::domain::card::Card;
use crate::domain::money::{Currency, Money};
use crate::error::{AtmError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of the withdrawal input file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct WithdrawalRequest {
    pub card: String,
    pub pin: u32,
    pub amount: i64,
    pub currency: Currency,
}

impl WithdrawalRequest {
    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }

    pub fn card(&self) -> Card {
        Card::new(self.card.clone(), self.pin)
    }
}

/// Reads withdrawal requests from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<WithdrawalRequest>` lazily, trimming
/// whitespace around every field.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn requests(self) -> impl Iterator<Item = Result<WithdrawalRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AtmError::from))
    }
}
