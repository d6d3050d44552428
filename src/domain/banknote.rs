use super::money::Currency;
use crate::error::{AtmError, Result};
use serde::{Deserialize, Serialize};

/// A single note of one face value.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Banknote {
    pub value: u32,
    pub currency: Currency,
}

impl Banknote {
    pub fn new(value: u32, currency: Currency) -> Self {
        Self { value, currency }
    }
}

/// The banknotes handed to the customer, in the order they were released.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Payment {
    pub value: Vec<Banknote>,
}

impl Payment {
    pub fn new(value: Vec<Banknote>) -> Self {
        Self { value }
    }

    /// Sum of all note values.
    pub fn total(&self) -> i64 {
        self.value.iter().map(|note| i64::from(note.value)).sum()
    }
}

/// The catalog of face values the machine can dispense.
///
/// Always non-empty, free of zeros and duplicates, sorted largest first.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct Denominations(Vec<u32>);

impl Denominations {
    pub fn new(values: Vec<u32>) -> Result<Self> {
        if values.is_empty() {
            return Err(AtmError::Config(
                "Denomination set must not be empty".to_string(),
            ));
        }
        if values.contains(&0) {
            return Err(AtmError::Config(
                "Denomination values must be positive".to_string(),
            ));
        }

        let mut values = values;
        values.sort_unstable_by(|a, b| b.cmp(a));
        values.dedup();
        Ok(Self(values))
    }

    pub fn values(&self) -> &[u32] {
        &self.0
    }

    /// Splits `amount` into at most `max_notes` notes of `currency`, largest
    /// values first.
    ///
    /// Returns `None` when the amount is not positive, no exact split exists,
    /// or every split needs more than `max_notes` notes.
    pub fn decompose(
        &self,
        amount: i64,
        currency: Currency,
        max_notes: u32,
    ) -> Option<Vec<Banknote>> {
        let amount = u64::try_from(amount).ok().filter(|a| *a > 0)?;
        let max_notes = u64::from(max_notes);

        // Even all-largest notes would not fit.
        if amount.div_ceil(u64::from(self.0[0])) > max_notes {
            return None;
        }
        if amount % gcd_of(&self.0) != 0 {
            return None;
        }

        let mut counts = Vec::with_capacity(self.0.len());
        if !allocate(amount, &self.0, &mut counts) {
            return None;
        }
        if counts.iter().sum::<u64>() > max_notes {
            return None;
        }

        let notes = self
            .0
            .iter()
            .zip(counts)
            .flat_map(|(&value, count)| {
                std::iter::repeat_n(Banknote::new(value, currency), count as usize)
            })
            .collect();
        Some(notes)
    }
}

impl Default for Denominations {
    fn default() -> Self {
        Self(vec![500, 200, 100, 50, 20, 10])
    }
}

impl TryFrom<Vec<u32>> for Denominations {
    type Error = AtmError;

    fn try_from(values: Vec<u32>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Denominations> for Vec<u32> {
    fn from(denominations: Denominations) -> Self {
        denominations.0
    }
}

/// Depth-first allocation that takes as many large notes as possible and
/// only gives some back when the remainder cannot be covered otherwise.
fn allocate(remaining: u64, notes: &[u32], counts: &mut Vec<u64>) -> bool {
    let Some((&note, rest)) = notes.split_first() else {
        return remaining == 0;
    };
    let note = u64::from(note);
    let most = remaining / note;

    if rest.is_empty() {
        counts.push(most);
        if remaining % note == 0 {
            return true;
        }
        counts.pop();
        return false;
    }

    let rest_gcd = gcd_of(rest);
    for count in (0..=most).rev() {
        let left = remaining - count * note;
        if left % rest_gcd != 0 {
            continue;
        }
        counts.push(count);
        if allocate(left, rest, counts) {
            return true;
        }
        counts.pop();
    }
    false
}

fn gcd_of(values: &[u32]) -> u64 {
    values
        .iter()
        .map(|&v| u64::from(v))
        .fold(0, |acc, v| gcd(acc, v))
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
