use crate::config::{AtmConfig, RefundPolicy};
use crate::domain::banknote::Payment;
use crate::domain::card::{AuthenticationToken, Card};
use crate::domain::money::Money;
use crate::domain::ports::{
    AccountChargerBox, Authorization, CardAuthorizerBox, CashDispenserBox, ChargeOutcome,
    ReleaseOutcome,
};
use crate::error::{AtmError, Reconciliation, Result};
use tracing::{debug, error, info, warn};

/// The cash machine.
///
/// `AtmMachine` validates a withdrawal request, then authorizes the card,
/// charges the account and releases banknotes, stopping at the first step
/// that is refused. Each collaborator is called at most once per withdrawal.
pub struct AtmMachine {
    card_authorizer: CardAuthorizerBox,
    account_charger: AccountChargerBox,
    cash_dispenser: CashDispenserBox,
    config: AtmConfig,
}

impl AtmMachine {
    /// Creates a machine with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `card_authorizer` - Verifies the card and PIN.
    /// * `account_charger` - Debits the account linked to the card.
    /// * `cash_dispenser` - Releases physical banknotes.
    pub fn new(
        card_authorizer: CardAuthorizerBox,
        account_charger: AccountChargerBox,
        cash_dispenser: CashDispenserBox,
    ) -> Self {
        Self::with_config(
            card_authorizer,
            account_charger,
            cash_dispenser,
            AtmConfig::default(),
        )
    }

    /// Creates a machine with an explicit configuration.
    ///
    /// # Arguments
    ///
    /// * `card_authorizer` - Verifies the card and PIN.
    /// * `account_charger` - Debits the account linked to the card.
    /// * `cash_dispenser` - Releases physical banknotes.
    /// * `config` - Denominations, note limit and refund policy.
    pub fn with_config(
        card_authorizer: CardAuthorizerBox,
        account_charger: AccountChargerBox,
        cash_dispenser: CashDispenserBox,
        config: AtmConfig,
    ) -> Self {
        Self {
            card_authorizer,
            account_charger,
            cash_dispenser,
            config,
        }
    }

    /// Returns the configuration the machine was built with.
    pub fn config(&self) -> &AtmConfig {
        &self.config
    }

    /// Withdraws `money` from the account behind `card`.
    ///
    /// The amount is validated before any collaborator is contacted. On
    /// success the returned payment holds exactly the banknotes that were
    /// released, which add up to the requested amount in the requested currency.
    pub async fn withdraw(&self, money: &Money, card: &Card) -> Result<Payment> {
        if money.amount <= 0 {
            return Err(AtmError::InvalidAmount(format!(
                "{} is not a positive amount",
                money
            )));
        }
        let banknotes = self
            .config
            .denominations
            .decompose(money.amount, money.currency, self.config.max_notes)
            .ok_or_else(|| {
                AtmError::InvalidAmount(format!(
                    "{} cannot be paid out in at most {} notes of {:?}",
                    money,
                    self.config.max_notes,
                    self.config.denominations.values()
                ))
            })?;

        let token = match self.card_authorizer.authorize(card).await? {
            Authorization::Authorized(token) => token,
            Authorization::Refused => {
                warn!(card = %card.card_number, "Card authorization refused");
                return Err(AtmError::AuthorizationRefused);
            }
        };
        debug!(user = %token.user_id, "Card authorized");

        self.account_charger.start_transaction(&token).await?;

        if self.account_charger.charge(&token, money).await? == ChargeOutcome::Declined {
            warn!(user = %token.user_id, %money, "Charge declined");
            return Err(AtmError::InsufficientFunds);
        }
        debug!(user = %token.user_id, %money, "Account charged");

        // The account is charged from here on, so every failure must settle it.
        match self.cash_dispenser.release_banknotes(&banknotes).await {
            Ok(ReleaseOutcome::Released) => {
                info!(
                    user = %token.user_id,
                    %money,
                    notes = banknotes.len(),
                    "Withdrawal completed"
                );
                Ok(Payment::new(banknotes))
            }
            Ok(ReleaseOutcome::Unavailable) => {
                warn!(user = %token.user_id, %money, "Money depot could not release banknotes");
                let reconciliation = self.reconcile(&token, money).await;
                Err(AtmError::DispenseFailed { reconciliation })
            }
            Err(e) => {
                warn!(user = %token.user_id, %money, error = %e, "Money depot failed");
                let reconciliation = self.reconcile(&token, money).await;
                Err(AtmError::DispenseFailed { reconciliation })
            }
        }
    }

    /// Settles a charge whose cash never left the machine.
    async fn reconcile(&self, token: &AuthenticationToken, money: &Money) -> Reconciliation {
        match self.config.refund_policy {
            RefundPolicy::ManualReconciliation => {
                error!(user = %token.user_id, %money, "Account charged without cash released");
                Reconciliation::ManualReconciliationRequired
            }
            RefundPolicy::Compensate => match self.account_charger.refund(token, money).await {
                Ok(()) => {
                    info!(user = %token.user_id, %money, "Charge refunded");
                    Reconciliation::Refunded
                }
                Err(e) => {
                    error!(user = %token.user_id, %money, error = %e, "Refund failed");
                    Reconciliation::ManualReconciliationRequired
                }
            },
        }
    }
}
