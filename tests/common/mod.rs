#![allow(dead_code)]

use async_trait::async_trait;
use atm_withdrawal::application::atm::AtmMachine;
use atm_withdrawal::config::AtmConfig;
use atm_withdrawal::domain::banknote::Banknote;
use atm_withdrawal::domain::card::{AuthenticationToken, Card};
use atm_withdrawal::domain::money::{Currency, Money};
use atm_withdrawal::domain::ports::{
    AccountCharger, Authorization, CardAuthorizer, CashDispenser, ChargeOutcome, ReleaseOutcome,
};
use atm_withdrawal::error::{AtmError, Result};
use std::sync::{Arc, Mutex};

/// A collaborator invocation as observed by the test doubles.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Authorize(Card),
    StartTransaction(AuthenticationToken),
    Charge(AuthenticationToken, Money),
    Refund(AuthenticationToken, Money),
    Release(Vec<Banknote>),
}

/// A collaborator call that can be scripted to fail with a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Authorize,
    StartTransaction,
    Charge,
    Release,
}

fn fault(step: Step) -> AtmError {
    AtmError::Collaborator(format!("{:?} unavailable", step))
}

#[derive(Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }
}

struct StubCardAuthorizer {
    log: CallLog,
    outcome: Authorization,
    faulty: bool,
}

#[async_trait]
impl CardAuthorizer for StubCardAuthorizer {
    async fn authorize(&self, card: &Card) -> Result<Authorization> {
        self.log.record(Call::Authorize(card.clone()));
        if self.faulty {
            return Err(fault(Step::Authorize));
        }
        Ok(self.outcome.clone())
    }
}

struct StubAccountCharger {
    log: CallLog,
    outcome: ChargeOutcome,
    refund_fails: bool,
    fault: Option<Step>,
}

#[async_trait]
impl AccountCharger for StubAccountCharger {
    async fn start_transaction(&self, token: &AuthenticationToken) -> Result<()> {
        self.log.record(Call::StartTransaction(token.clone()));
        if self.fault == Some(Step::StartTransaction) {
            return Err(fault(Step::StartTransaction));
        }
        Ok(())
    }

    async fn charge(&self, token: &AuthenticationToken, money: &Money) -> Result<ChargeOutcome> {
        self.log.record(Call::Charge(token.clone(), *money));
        if self.fault == Some(Step::Charge) {
            return Err(fault(Step::Charge));
        }
        Ok(self.outcome)
    }

    async fn refund(&self, token: &AuthenticationToken, money: &Money) -> Result<()> {
        self.log.record(Call::Refund(token.clone(), *money));
        if self.refund_fails {
            return Err(AtmError::Collaborator("ledger offline".to_string()));
        }
        Ok(())
    }
}

struct StubCashDispenser {
    log: CallLog,
    outcome: ReleaseOutcome,
    faulty: bool,
}

#[async_trait]
impl CashDispenser for StubCashDispenser {
    async fn release_banknotes(&self, banknotes: &[Banknote]) -> Result<ReleaseOutcome> {
        self.log.record(Call::Release(banknotes.to_vec()));
        if self.faulty {
            return Err(fault(Step::Release));
        }
        Ok(self.outcome)
    }
}

pub fn token() -> AuthenticationToken {
    AuthenticationToken::new("", 1)
}

pub fn card() -> Card {
    Card::new("4840932426207833", 1234)
}

pub fn money(amount: i64) -> Money {
    Money::new(amount, Currency::Pl)
}

/// Scripted collaborator answers. Everything succeeds unless changed.
pub struct Scenario {
    pub authorization: Authorization,
    pub charge: ChargeOutcome,
    pub release: ReleaseOutcome,
    pub refund_fails: bool,
    /// The one collaborator call that returns an error instead of an outcome.
    pub fault: Option<Step>,
    pub config: AtmConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            authorization: Authorization::Authorized(token()),
            charge: ChargeOutcome::Charged,
            release: ReleaseOutcome::Released,
            refund_fails: false,
            fault: None,
            config: AtmConfig::default(),
        }
    }
}

impl Scenario {
    pub fn build(self) -> (AtmMachine, CallLog) {
        let log = CallLog::default();
        let atm = AtmMachine::with_config(
            Box::new(StubCardAuthorizer {
                log: log.clone(),
                outcome: self.authorization,
                faulty: self.fault == Some(Step::Authorize),
            }),
            Box::new(StubAccountCharger {
                log: log.clone(),
                outcome: self.charge,
                refund_fails: self.refund_fails,
                fault: self.fault,
            }),
            Box::new(StubCashDispenser {
                log: log.clone(),
                outcome: self.release,
                faulty: self.fault == Some(Step::Release),
            }),
            self.config,
        );
        (atm, log)
    }
}
