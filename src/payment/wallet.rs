/*!
 * Wallet service: per-profile balances debited per generation.
 *
 * The debit is a single conditional UPDATE inside the storage layer, so
 * a balance can never go negative and two concurrent generations cannot
 * both spend the same pesewas.
 */

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};

use crate::errors::PaymentError;
use crate::payment::gateway::{ChargeOutcome, ChargeState, MomoGateway, MomoProvider};
use crate::storage::models::{PaymentStatus, PaymentTransactionRecord};
use crate::storage::Repository;

/// Wallet operations over the repository
#[derive(Clone)]
pub struct WalletService {
    repo: Repository,
}

impl WalletService {
    /// Create a wallet service over the given repository
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Current balance for a profile, in pesewas
    pub async fn balance(&self, profile_id: &str) -> Result<i64> {
        self.repo.wallet_balance(profile_id).await
    }

    /// Wallet cost of a generation run
    pub fn cost_of(lesson_count: u32, cost_per_lesson_pesewas: i64) -> i64 {
        i64::from(lesson_count.max(1)) * cost_per_lesson_pesewas
    }

    /// Debit the wallet for a generation run.
    ///
    /// Fails with `PaymentError::InsufficientBalance` without touching the
    /// balance when it does not cover the cost.
    pub async fn debit_for_generation(
        &self,
        profile_id: &str,
        lesson_count: u32,
        cost_per_lesson_pesewas: i64,
    ) -> Result<i64> {
        let cost = Self::cost_of(lesson_count, cost_per_lesson_pesewas);
        if cost == 0 {
            return Ok(0);
        }

        let debited = self.repo.try_debit_wallet(profile_id, cost).await?;
        if !debited {
            let balance = self.repo.wallet_balance(profile_id).await?;
            return Err(PaymentError::InsufficientBalance {
                balance,
                required: cost,
            }
            .into());
        }

        debug!("Debited {} pesewas from profile {}", cost, profile_id);
        Ok(cost)
    }

    /// Refund a debit after a failed generation.
    pub async fn refund(&self, profile_id: &str, amount_pesewas: i64) -> Result<()> {
        if amount_pesewas > 0 {
            self.repo.credit_wallet(profile_id, amount_pesewas).await?;
            info!("Refunded {} pesewas to profile {}", amount_pesewas, profile_id);
        }
        Ok(())
    }

    /// Initiate a mobile-money top-up and record the pending transaction.
    pub async fn begin_topup(
        &self,
        gateway: &MomoGateway,
        profile_id: &str,
        phone: &str,
        provider: MomoProvider,
        amount_pesewas: i64,
        currency: &str,
        reference: &str,
    ) -> Result<ChargeOutcome> {
        let outcome = gateway
            .initiate_charge(amount_pesewas, currency, phone, provider, reference)
            .await?;

        let now = Utc::now().to_rfc3339();
        let record = PaymentTransactionRecord {
            reference: outcome.reference.clone(),
            profile_id: profile_id.to_string(),
            amount_pesewas,
            currency: currency.to_string(),
            phone: phone.to_string(),
            momo_provider: provider.code().to_string(),
            status: PaymentStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };
        self.repo.insert_transaction(&record).await?;

        info!(
            "Initiated momo charge of {} pesewas for profile {} (ref {})",
            amount_pesewas, profile_id, outcome.reference
        );
        Ok(outcome)
    }

    /// Verify a pending top-up and credit the wallet on success.
    ///
    /// Idempotent: a transaction already settled does not credit twice.
    pub async fn settle_topup(
        &self,
        gateway: &MomoGateway,
        reference: &str,
    ) -> Result<ChargeState> {
        let record = self
            .repo
            .get_transaction(reference)
            .await?
            .ok_or_else(|| PaymentError::UnknownReference(reference.to_string()))?;

        if record.status.is_terminal() {
            debug!("Transaction {} already settled as {}", reference, record.status);
            return Ok(match record.status {
                PaymentStatus::Success => ChargeState::Success,
                PaymentStatus::Failed => ChargeState::Failed,
                PaymentStatus::Abandoned => ChargeState::Abandoned,
                PaymentStatus::Pending => ChargeState::Pending,
            });
        }

        let state = gateway.verify(reference).await?;

        match state {
            ChargeState::Success => {
                self.repo
                    .credit_wallet(&record.profile_id, record.amount_pesewas)
                    .await?;
                self.repo
                    .update_transaction_status(reference, PaymentStatus::Success)
                    .await?;
                info!(
                    "Credited {} pesewas to profile {} (ref {})",
                    record.amount_pesewas, record.profile_id, reference
                );
            }
            ChargeState::Failed => {
                self.repo
                    .update_transaction_status(reference, PaymentStatus::Failed)
                    .await?;
            }
            ChargeState::Abandoned => {
                self.repo
                    .update_transaction_status(reference, PaymentStatus::Abandoned)
                    .await?;
            }
            ChargeState::Pending => {
                debug!("Transaction {} still pending", reference);
            }
        }

        Ok(state)
    }
}
