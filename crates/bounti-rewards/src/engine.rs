//! Reward distribution engine
//!
//! One entry point per trigger: `activate`, `renew`, `upgrade`. Each loads
//! what it needs, computes the complete effect as a trigger batch, commits
//! it atomically, and only then emits notifications. A trigger either
//! commits whole or leaves no trace.

use std::sync::Arc;

use bounti_ledger::{EntryCategory, LedgerEntry};
use bounti_notify::{Notifier, NotifyEvent};
use bounti_store::{MembershipStore, StateOp, TriggerBatch};
use bounti_types::{
    Account, AccountId, AdminClaim, Amount, PackageId, PalliativeTier, PalliativeType,
    PaymentReceipt, RenewalRecord, Result, RewardError, RewardVector, ShelterReward, Wallet,
    ACTIVATION_TERM_DAYS, REFERRAL_DEPTH, RENEWAL_WINDOW_DAYS, SHELTER_DEPTH,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::referral_chain;
use crate::router::route_palliative;
use crate::split::push_token_ops;
use crate::tables::{self, RewardTrigger};

/// Running totals of everything one trigger distributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionTotals {
    pub cash: Amount,
    pub palliative: Amount,
    pub cashback: Amount,
    pub token_recipients: Amount,
    pub token_pool: Amount,
    pub shelter: Amount,
}

impl DistributionTotals {
    /// Everything that left the reward tables, both user and pool side
    pub fn grand_total(&self) -> Result<Amount> {
        self.cash
            .checked_add(self.palliative)?
            .checked_add(self.cashback)?
            .checked_add(self.token_recipients)?
            .checked_add(self.token_pool)?
            .checked_add(self.shelter)
    }
}

/// Result of a successful first activation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationOutcome {
    pub account: AccountId,
    pub package: PackageId,
    pub expires_at: DateTime<Utc>,
    pub ancestors_rewarded: usize,
    pub totals: DistributionTotals,
}

/// Result of a successful renewal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalOutcome {
    pub account: AccountId,
    pub package: PackageId,
    pub renewal_index: u32,
    pub expires_at: DateTime<Utc>,
    pub totals: DistributionTotals,
}

/// Result of a successful differential upgrade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeOutcome {
    pub account: AccountId,
    pub from_package: PackageId,
    pub to_package: PackageId,
    pub price_difference: Amount,
    pub totals: DistributionTotals,
}

/// The reward distribution engine
pub struct RewardEngine {
    store: Arc<dyn MembershipStore>,
    notifier: Arc<dyn Notifier>,
}

impl RewardEngine {
    pub fn new(store: Arc<dyn MembershipStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// First activation of a membership package.
    pub async fn activate(
        &self,
        account_id: &AccountId,
        package_id: &PackageId,
        palliative: Option<PalliativeType>,
        payment: &PaymentReceipt,
    ) -> Result<ActivationOutcome> {
        if !payment.confirmed {
            return Err(RewardError::not_eligible("payment not confirmed"));
        }
        let now = Utc::now();
        let account = self.store.account(account_id).await?;
        if account.has_active_package(now) {
            return Err(RewardError::not_eligible(
                "account already holds an active package",
            ));
        }
        let package = self.store.package(package_id).await?;

        let mut batch = TriggerBatch::new("activation");
        let mut totals = DistributionTotals::default();
        let mut notifications = Vec::new();

        let chain = referral_chain(self.store.as_ref(), account_id, REFERRAL_DEPTH).await?;
        for (index, ancestor_id) in chain.iter().enumerate() {
            let level = (index + 1) as u8;
            let rewards = tables::resolve(&package, level as usize, RewardTrigger::Activation);
            if rewards.is_zero() {
                continue;
            }
            let ancestor = self.store.account(ancestor_id).await?;
            self.push_level_rewards(&mut batch, &mut totals, &ancestor, level, &rewards, account_id)?;
            notifications.push(NotifyEvent::ReferralReward {
                recipient: ancestor_id.clone(),
                source: account_id.clone(),
                level,
            });
        }

        if package.is_shelter_eligible() {
            self.push_shelter_rewards(&mut batch, &mut totals, account_id, &package, now)
                .await?;
        }

        let expires_at = now + Duration::days(ACTIVATION_TERM_DAYS);
        batch.push(StateOp::Activate {
            account: account_id.clone(),
            package: package_id.clone(),
            activated_at: now,
            expires_at,
        });
        let higher = package.tier == PalliativeTier::Higher;
        batch.push(StateOp::SetPalliative {
            account: account_id.clone(),
            tier: Some(package.tier),
            active: higher && palliative.is_some(),
            selected: if higher { palliative } else { None },
        });

        batch.ledger(LedgerEntry::new(
            account_id.clone(),
            EntryCategory::MembershipActivation,
            package.price.negate(),
            format!("activation of {} (payment {})", package.name, payment.reference),
            Some(account_id.clone()),
        ));
        if package.vat.is_positive() {
            batch.ledger(LedgerEntry::new(
                account_id.clone(),
                EntryCategory::Vat,
                package.vat.negate(),
                format!("vat on activation of {}", package.name),
                Some(account_id.clone()),
            ));
        }
        batch.unique_event(format!(
            "activation:{}:{}:{}",
            account_id,
            package_id,
            now.format("%Y-%m-%d")
        ));

        let grand_total = totals.grand_total()?;
        self.store.commit(batch).await?;
        info!(
            account = %account_id,
            package = %package_id,
            ancestors = chain.len(),
            total = %grand_total,
            "membership activated"
        );

        for event in notifications {
            self.notifier.notify(event).await;
        }
        self.notifier
            .notify(NotifyEvent::MembershipActivated {
                account: account_id.clone(),
                package: package_id.clone(),
            })
            .await;

        Ok(ActivationOutcome {
            account: account_id.clone(),
            package: package_id.clone(),
            expires_at,
            ancestors_rewarded: chain.len(),
            totals,
        })
    }

    /// Renewal of the currently held package.
    pub async fn renew(
        &self,
        account_id: &AccountId,
        payment: &PaymentReceipt,
    ) -> Result<RenewalOutcome> {
        if !payment.confirmed {
            return Err(RewardError::not_eligible("payment not confirmed"));
        }
        let now = Utc::now();
        let account = self.store.account(account_id).await?;
        let (package_id, expires_at) = match (&account.active_package, account.expires_at) {
            (Some(package), Some(expires_at)) => (package.clone(), expires_at),
            _ => {
                return Err(RewardError::not_eligible("no active package to renew"));
            }
        };
        if now < expires_at - Duration::days(RENEWAL_WINDOW_DAYS) {
            return Err(RewardError::not_eligible(format!(
                "renewal window opens {} days before expiry ({})",
                RENEWAL_WINDOW_DAYS, expires_at
            )));
        }
        let package = self.store.package(&package_id).await?;
        if package.renewal_cycle_days <= 0 {
            return Err(RewardError::not_eligible(
                "package does not support renewal",
            ));
        }

        let mut batch = TriggerBatch::new("renewal");
        let mut totals = DistributionTotals::default();
        let mut notifications = Vec::new();

        let chain = referral_chain(self.store.as_ref(), account_id, REFERRAL_DEPTH).await?;
        for (index, ancestor_id) in chain.iter().enumerate() {
            let level = (index + 1) as u8;
            let rewards = tables::resolve(&package, level as usize, RewardTrigger::Renewal);
            if rewards.is_zero() {
                continue;
            }
            let ancestor = self.store.account(ancestor_id).await?;
            self.push_level_rewards(&mut batch, &mut totals, &ancestor, level, &rewards, account_id)?;
            notifications.push(NotifyEvent::ReferralReward {
                recipient: ancestor_id.clone(),
                source: account_id.clone(),
                level,
            });
        }

        if package.is_shelter_eligible() {
            self.push_shelter_rewards(&mut batch, &mut totals, account_id, &package, now)
                .await?;
        }

        // Upkeep credits to the renewing member, where configured.
        for (wallet, amount) in [
            (Wallet::Health, package.upkeep.health),
            (Wallet::Meal, package.upkeep.meal),
            (Wallet::Security, package.upkeep.security),
        ] {
            if amount.is_positive() {
                batch.credit(account_id, wallet, amount);
                batch.ledger(LedgerEntry::new(
                    account_id.clone(),
                    EntryCategory::RenewalUpkeep { wallet },
                    amount,
                    format!("renewal upkeep for {} wallet", wallet),
                    Some(account_id.clone()),
                ));
            }
        }

        let new_expiry = expires_at.max(now) + Duration::days(package.renewal_cycle_days);
        let renewal_index = account.renewal_count + 1;
        batch.push(StateOp::RecordRenewal {
            account: account_id.clone(),
            expires_at: new_expiry,
        });
        batch.push(StateOp::RenewalHistory(RenewalRecord {
            account: account_id.clone(),
            package: package_id.clone(),
            renewal_index,
            total_distributed: totals.grand_total()?,
            expires_at: new_expiry,
            created_at: now,
        }));
        batch.ledger(LedgerEntry::new(
            account_id.clone(),
            EntryCategory::MembershipRenewal,
            package.price.negate(),
            format!("renewal of {} (payment {})", package.name, payment.reference),
            Some(account_id.clone()),
        ));
        if package.vat.is_positive() {
            batch.ledger(LedgerEntry::new(
                account_id.clone(),
                EntryCategory::Vat,
                package.vat.negate(),
                format!("vat on renewal of {}", package.name),
                Some(account_id.clone()),
            ));
        }
        batch.unique_event(format!(
            "renewal:{}:{}:{}",
            account_id,
            package_id,
            now.format("%Y-%m-%d")
        ));

        self.store.commit(batch).await?;
        info!(
            account = %account_id,
            package = %package_id,
            renewal_index,
            expires_at = %new_expiry,
            "membership renewed"
        );

        for event in notifications {
            self.notifier.notify(event).await;
        }
        self.notifier
            .notify(NotifyEvent::MembershipRenewed {
                account: account_id.clone(),
                package: package_id.clone(),
                expires_at: new_expiry,
            })
            .await;

        Ok(RenewalOutcome {
            account: account_id.clone(),
            package: package_id,
            renewal_index,
            expires_at: new_expiry,
            totals,
        })
    }

    /// Differential upgrade to a higher-priced package.
    ///
    /// Only positive per-level, per-component deltas are distributed; a
    /// component that shrank contributes nothing and nothing is clawed
    /// back from earlier rewards.
    pub async fn upgrade(
        &self,
        account_id: &AccountId,
        new_package_id: &PackageId,
        palliative: Option<PalliativeType>,
    ) -> Result<UpgradeOutcome> {
        let now = Utc::now();
        let account = self.store.account(account_id).await?;
        let old_package_id = account
            .active_package
            .clone()
            .ok_or_else(|| RewardError::not_eligible("no active package to upgrade"))?;
        if !account.has_active_package(now) {
            return Err(RewardError::not_eligible(
                "membership expired; renew before upgrading",
            ));
        }
        let old_package = self.store.package(&old_package_id).await?;
        let new_package = self.store.package(new_package_id).await?;
        if new_package.price <= old_package.price {
            return Err(RewardError::not_eligible(
                "upgrade requires a higher-priced package",
            ));
        }

        let price_difference = new_package.price.checked_sub(old_package.price)?;
        let available = account.balance(Wallet::Main);
        if price_difference > available {
            return Err(RewardError::InsufficientBalance {
                wallet: Wallet::Main.as_str().to_string(),
                requested: price_difference.to_string(),
                available: available.to_string(),
            });
        }

        let mut batch = TriggerBatch::new("upgrade");
        let mut totals = DistributionTotals::default();
        let mut notifications = Vec::new();

        batch.debit(account_id, Wallet::Main, price_difference);
        batch.ledger(LedgerEntry::new(
            account_id.clone(),
            EntryCategory::MembershipUpgrade,
            price_difference.negate(),
            format!(
                "upgrade from {} to {}",
                old_package.name, new_package.name
            ),
            Some(account_id.clone()),
        ));

        let chain = referral_chain(self.store.as_ref(), account_id, REFERRAL_DEPTH).await?;
        for (index, ancestor_id) in chain.iter().enumerate() {
            let level = (index + 1) as u8;
            let old_rewards =
                tables::resolve(&old_package, level as usize, RewardTrigger::Activation);
            let new_rewards =
                tables::resolve(&new_package, level as usize, RewardTrigger::Activation);
            let delta = new_rewards.delta_over(&old_rewards);
            if delta.is_zero() {
                continue;
            }
            let ancestor = self.store.account(ancestor_id).await?;
            self.push_level_rewards(&mut batch, &mut totals, &ancestor, level, &delta, account_id)?;
            notifications.push(NotifyEvent::ReferralReward {
                recipient: ancestor_id.clone(),
                source: account_id.clone(),
                level,
            });
        }

        batch.push(StateOp::SetActivePackage {
            account: account_id.clone(),
            package: new_package_id.clone(),
        });

        // First crossing into the higher tier re-derives palliative fields
        // and moves any pooled balance into the newly selected wallet.
        if old_package.tier == PalliativeTier::Lower && new_package.tier == PalliativeTier::Higher {
            batch.push(StateOp::SetPalliative {
                account: account_id.clone(),
                tier: Some(PalliativeTier::Higher),
                active: palliative.is_some(),
                selected: palliative,
            });
            if !account.palliative_active {
                let pooled = account.balance(Wallet::PalliativePool);
                if pooled.is_positive() {
                    if let Some(selected) = palliative {
                        batch.debit(account_id, Wallet::PalliativePool, pooled);
                        batch.credit(account_id, selected.wallet(), pooled);
                        batch.ledger(LedgerEntry::new(
                            account_id.clone(),
                            EntryCategory::PalliativePoolTransfer,
                            pooled,
                            format!("pooled palliative balance moved to {} wallet", selected),
                            Some(account_id.clone()),
                        ));
                    }
                }
            }
        }

        batch.unique_event(format!(
            "upgrade:{}:{}:{}",
            account_id,
            new_package_id,
            now.format("%Y-%m-%d")
        ));

        self.store.commit(batch).await?;
        info!(
            account = %account_id,
            from = %old_package_id,
            to = %new_package_id,
            price_difference = %price_difference,
            "membership upgraded"
        );

        for event in notifications {
            self.notifier.notify(event).await;
        }
        self.notifier
            .notify(NotifyEvent::MembershipUpgraded {
                account: account_id.clone(),
                package: new_package_id.clone(),
            })
            .await;

        Ok(UpgradeOutcome {
            account: account_id.clone(),
            from_package: old_package_id,
            to_package: new_package_id.clone(),
            price_difference,
            totals,
        })
    }

    /// Admin: burn from the buy-back pool.
    pub async fn burn_pool(&self, claim: &AdminClaim, amount: Amount) -> Result<()> {
        claim.require_admin("burn buy-back pool")?;
        let mut batch = TriggerBatch::new("pool_burn");
        batch.push(StateOp::BurnPool { amount });
        self.store.commit(batch).await?;
        warn!(amount = %amount, actor = %claim.actor, "buy-back pool burn");
        Ok(())
    }

    /// Admin: delete a ledger category en masse for backfill tooling.
    pub async fn purge_category(
        &self,
        claim: &AdminClaim,
        category: &EntryCategory,
    ) -> Result<usize> {
        claim.require_admin("purge ledger category")?;
        let removed = self.store.purge_category(category).await;
        warn!(
            category = %category.code(),
            removed,
            actor = %claim.actor,
            "ledger category purged"
        );
        Ok(removed)
    }

    /// Ops for one rewarded ancestor at one level: cash to main,
    /// palliative through the router, cashback to the cashback wallet,
    /// token through the split service. One ledger entry per non-zero
    /// component, each carrying the triggering account.
    fn push_level_rewards(
        &self,
        batch: &mut TriggerBatch,
        totals: &mut DistributionTotals,
        recipient: &Account,
        level: u8,
        rewards: &RewardVector,
        source: &AccountId,
    ) -> Result<()> {
        if rewards.cash.is_positive() {
            batch.credit(&recipient.id, Wallet::Main, rewards.cash);
            batch.ledger(LedgerEntry::new(
                recipient.id.clone(),
                EntryCategory::ReferralCash { level },
                rewards.cash,
                format!("level {level} referral cash from {source}"),
                Some(source.clone()),
            ));
            totals.cash = totals.cash.checked_add(rewards.cash)?;
        }
        if rewards.palliative.is_positive() {
            let wallet = route_palliative(recipient);
            batch.credit(&recipient.id, wallet, rewards.palliative);
            batch.ledger(LedgerEntry::new(
                recipient.id.clone(),
                EntryCategory::ReferralPalliative { level },
                rewards.palliative,
                format!("level {level} palliative reward from {source} into {wallet} wallet"),
                Some(source.clone()),
            ));
            totals.palliative = totals.palliative.checked_add(rewards.palliative)?;
        }
        if rewards.cashback.is_positive() {
            batch.credit(&recipient.id, Wallet::Cashback, rewards.cashback);
            batch.ledger(LedgerEntry::new(
                recipient.id.clone(),
                EntryCategory::ReferralCashback { level },
                rewards.cashback,
                format!("level {level} cashback from {source}"),
                Some(source.clone()),
            ));
            totals.cashback = totals.cashback.checked_add(rewards.cashback)?;
        }
        if rewards.token.is_positive() {
            let split = push_token_ops(
                batch,
                &recipient.id,
                rewards.token,
                EntryCategory::ReferralToken { level },
                format!("level {level} token reward from {source}"),
                source,
            );
            totals.token_recipients = totals.token_recipients.checked_add(split.recipient_share)?;
            totals.token_pool = totals.token_pool.checked_add(split.pool_share)?;
        }
        Ok(())
    }

    /// Shelter-tier payouts over the extended chain.
    async fn push_shelter_rewards(
        &self,
        batch: &mut TriggerBatch,
        totals: &mut DistributionTotals,
        source: &AccountId,
        package: &bounti_types::RewardPackage,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let chain = referral_chain(self.store.as_ref(), source, SHELTER_DEPTH).await?;
        for (index, ancestor_id) in chain.iter().enumerate() {
            let level = (index + 1) as u8;
            let amount = tables::resolve_shelter(package, level as usize);
            if !amount.is_positive() {
                continue;
            }
            batch.credit(ancestor_id, Wallet::Shelter, amount);
            batch.push(StateOp::Shelter(ShelterReward {
                account: ancestor_id.clone(),
                level,
                amount,
                source_account: source.clone(),
                created_at: now,
            }));
            batch.ledger(LedgerEntry::new(
                ancestor_id.clone(),
                EntryCategory::ShelterReward { level },
                amount,
                format!("level {level} shelter reward from {source}"),
                Some(source.clone()),
            ));
            totals.shelter = totals.shelter.checked_add(amount)?;
        }
        Ok(())
    }
}
