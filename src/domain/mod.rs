//! Domain layer: value types exchanged during a withdrawal and the ports the
//! orchestrator drives.

pub mod banknote;
pub mod card;
pub mod money;
pub mod ports;
