use serde::{Deserialize, Serialize};

/// The physical card presented at the machine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Card {
    pub card_number: String,
    pub pin_number: u32,
}

impl Card {
    pub fn new(card_number: impl Into<String>, pin_number: u32) -> Self {
        Self {
            card_number: card_number.into(),
            pin_number,
        }
    }
}

/// Proof of a successful card authorization.
///
/// Issued per withdrawal and handed back unchanged to the account charger.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct AuthenticationToken {
    pub user_id: String,
    pub authorization_code: u64,
}

impl AuthenticationToken {
    pub fn new(user_id: impl Into<String>, authorization_code: u64) -> Self {
        Self {
            user_id: user_id.into(),
            authorization_code,
        }
    }
}
