use super::request_reader::WithdrawalRequest;
use crate::domain::banknote::Payment;
use crate::domain::money::Currency;
use crate::error::{AtmError, Result};
use serde::Serialize;
use std::io::Write;

/// One row of the withdrawal report.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct WithdrawalRecord {
    pub card: String,
    pub amount: i64,
    pub currency: Currency,
    pub status: String,
    pub banknotes: String,
}

impl WithdrawalRecord {
    pub fn from_outcome(request: &WithdrawalRequest, outcome: &Result<Payment>) -> Self {
        let (status, banknotes) = match outcome {
            Ok(payment) => {
                let notes = payment
                    .value
                    .iter()
                    .map(|note| note.value.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                ("ok".to_string(), notes)
            }
            Err(e) => (e.kind().to_string(), String::new()),
        };
        Self {
            card: request.card.clone(),
            amount: request.amount,
            currency: request.currency,
            status,
            banknotes,
        }
    }
}

/// Writes withdrawal outcomes as CSV, header first.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, record: &WithdrawalRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(AtmError::from)
    }
}
