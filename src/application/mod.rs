//! Application layer containing the withdrawal orchestration.
//!
//! This module defines the `AtmMachine` which is the single entry point for
//! cash withdrawals. It drives the card authorizer, the account charger and
//! the cash dispenser in a fixed order and owns no mutable state.

pub mod atm;
