//! Bounti Empowerment - Lifecycle state machine for empowerment packages
//!
//! A sponsor funds a long-horizon reward instrument for a beneficiary. The
//! package counts down 24 months to maturity, then moves through
//! admin-gated approval and release; a fallback branch protects the
//! sponsor, and the sponsor can convert the package into a standard
//! membership any time before release.
//!
//! ```text
//! CountdownRunning -> PendingMaturity -> Approved -> Released
//!        |                  |               |
//!        |                  +---------------+--> FallbackActivated
//!        +---- Convert (sponsor, pre-release) --> ConvertedToRegularPlus
//! ```
//!
//! Every transition appends an audit row and commits through the store as
//! one atomic batch. Tax is computed at the rate captured when the package
//! was activated, so the net figures shown to the sponsor never drift.

use std::sync::Arc;

use bounti_ledger::{EntryCategory, LedgerEntry};
use bounti_notify::{Notifier, NotifyEvent};
use bounti_store::{MembershipStore, StateOp, TriggerBatch};
use bounti_types::{
    AccountId, AdminClaim, Amount, AuditEntryId, EmpowermentId, EmpowermentPackage,
    EmpowermentState, EmpowermentTransaction, EmpowermentTransition, PackageId, PaymentReceipt,
    Result, RewardError, Wallet, ACTIVATION_TERM_DAYS, EMPOWERMENT_TAX_BPS, MATURITY_MONTHS,
};
use chrono::{Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Gross terms of a new empowerment package, set by the surrounding
/// application from its configured empowerment plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpowermentTerms {
    pub fee: Amount,
    pub vat: Amount,
    pub gross_value: Amount,
    pub gross_sponsor_reward: Amount,
    pub fallback_gross: Amount,
}

/// The empowerment lifecycle engine
pub struct EmpowermentEngine {
    store: Arc<dyn MembershipStore>,
    notifier: Arc<dyn Notifier>,
}

impl EmpowermentEngine {
    pub fn new(store: Arc<dyn MembershipStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Activate a new empowerment package.
    ///
    /// The sponsor's fee is a pre-validated external payment; net values
    /// are precomputed for display at the captured tax rate, but no funds
    /// move until release.
    pub async fn activate(
        &self,
        sponsor: &AccountId,
        beneficiary: &AccountId,
        terms: EmpowermentTerms,
        payment: &PaymentReceipt,
    ) -> Result<EmpowermentPackage> {
        if !payment.confirmed {
            return Err(RewardError::not_eligible("payment not confirmed"));
        }
        // Both parties must exist before a package can bind them.
        self.store.account(sponsor).await?;
        self.store.account(beneficiary).await?;

        let now = Utc::now();
        let matures_at = now
            .checked_add_months(Months::new(MATURITY_MONTHS))
            .ok_or_else(|| RewardError::data_integrity("maturity date out of range"))?;

        let tax_rate_bps = EMPOWERMENT_TAX_BPS;
        let net_value = terms
            .gross_value
            .checked_sub(terms.gross_value.basis_points(tax_rate_bps)?)?;
        let net_sponsor_reward = terms
            .gross_sponsor_reward
            .checked_sub(terms.gross_sponsor_reward.basis_points(tax_rate_bps)?)?;
        let fallback_net = terms
            .fallback_gross
            .checked_sub(terms.fallback_gross.basis_points(tax_rate_bps)?)?;

        let package = EmpowermentPackage {
            id: EmpowermentId::new(),
            sponsor: sponsor.clone(),
            beneficiary: beneficiary.clone(),
            fee: terms.fee,
            vat: terms.vat,
            gross_value: terms.gross_value,
            net_value,
            gross_sponsor_reward: terms.gross_sponsor_reward,
            net_sponsor_reward,
            tax_rate_bps,
            total_tax: None,
            fallback_gross: terms.fallback_gross,
            fallback_net,
            converted: false,
            conversion_amount: None,
            state: EmpowermentState::CountdownRunning,
            activated_at: now,
            matures_at,
            matured_at: None,
            approved_at: None,
            released_at: None,
            fallback_at: None,
            converted_at: None,
        };

        let combined_gross = terms.gross_value.checked_add(terms.gross_sponsor_reward)?;
        let combined_net = net_value.checked_add(net_sponsor_reward)?;

        let mut batch = TriggerBatch::new("empowerment_activate");
        batch.push(StateOp::PutEmpowerment(package.clone()));
        batch.push(StateOp::EmpowermentAudit(audit_row(
            &package,
            EmpowermentTransition::Activate,
            combined_gross,
            Amount::zero(),
            combined_net,
            sponsor,
        )));
        batch.ledger(LedgerEntry::new(
            sponsor.clone(),
            EntryCategory::EmpowermentFee,
            terms.fee.negate(),
            format!("empowerment fee (payment {})", payment.reference),
            Some(sponsor.clone()),
        ));
        if terms.vat.is_positive() {
            batch.ledger(LedgerEntry::new(
                sponsor.clone(),
                EntryCategory::Vat,
                terms.vat.negate(),
                "vat on empowerment fee".to_string(),
                Some(sponsor.clone()),
            ));
        }
        // One package per sponsor/beneficiary pairing.
        batch.unique_event(format!("empowerment:{sponsor}:{beneficiary}"));

        self.store.commit(batch).await?;
        info!(
            package = %package.id,
            sponsor = %sponsor,
            beneficiary = %beneficiary,
            matures_at = %matures_at,
            "empowerment package activated"
        );
        Ok(package)
    }

    /// Mark maturity reached. Caller-triggered (admin tooling or an
    /// external scheduler); guarded by the maturity date.
    pub async fn check_maturity(
        &self,
        id: &EmpowermentId,
        actor: &AccountId,
    ) -> Result<EmpowermentPackage> {
        let mut package = self.store.empowerment(id).await?;
        ensure_state(
            &package,
            "check maturity",
            "countdown_running",
            &[EmpowermentState::CountdownRunning],
        )?;
        let now = Utc::now();
        if !package.is_mature(now) {
            return Err(RewardError::NotMature {
                matures_at: package.matures_at.to_rfc3339(),
            });
        }

        package.state = EmpowermentState::PendingMaturity;
        package.matured_at = Some(now);

        let combined_gross = package
            .gross_value
            .checked_add(package.gross_sponsor_reward)?;
        let combined_net = package.net_value.checked_add(package.net_sponsor_reward)?;

        let mut batch = TriggerBatch::new("empowerment_maturity");
        batch.push(StateOp::PutEmpowerment(package.clone()));
        batch.push(StateOp::EmpowermentAudit(audit_row(
            &package,
            EmpowermentTransition::CheckMaturity,
            combined_gross,
            Amount::zero(),
            combined_net,
            actor,
        )));
        self.store.commit(batch).await?;

        info!(package = %package.id, "empowerment package matured");
        self.notifier
            .notify(NotifyEvent::EmpowermentMatured {
                package: package.id.clone(),
                sponsor: package.sponsor.clone(),
                beneficiary: package.beneficiary.clone(),
            })
            .await;
        Ok(package)
    }

    /// Admin approval after maturity. Computes and stores the total tax on
    /// the combined gross values at the rate captured at activation.
    pub async fn approve(
        &self,
        id: &EmpowermentId,
        claim: &AdminClaim,
    ) -> Result<EmpowermentPackage> {
        claim.require_admin("approve empowerment package")?;
        let mut package = self.store.empowerment(id).await?;
        ensure_state(
            &package,
            "approve",
            "pending_maturity",
            &[EmpowermentState::PendingMaturity],
        )?;

        let combined_gross = package
            .gross_value
            .checked_add(package.gross_sponsor_reward)?;
        let total_tax = combined_gross.basis_points(package.tax_rate_bps)?;

        package.total_tax = Some(total_tax);
        package.approved_at = Some(Utc::now());
        package.state = EmpowermentState::Approved;

        let mut batch = TriggerBatch::new("empowerment_approve");
        batch.push(StateOp::PutEmpowerment(package.clone()));
        batch.push(StateOp::EmpowermentAudit(audit_row(
            &package,
            EmpowermentTransition::Approve,
            combined_gross,
            total_tax,
            combined_gross.checked_sub(total_tax)?,
            &claim.actor,
        )));
        self.store.commit(batch).await?;

        info!(package = %package.id, total_tax = %total_tax, "empowerment package approved");
        self.notifier
            .notify(NotifyEvent::EmpowermentApproved {
                package: package.id.clone(),
                sponsor: package.sponsor.clone(),
            })
            .await;
        Ok(package)
    }

    /// Admin release after approval. Credits the beneficiary's education
    /// wallet (view-only to the beneficiary, not withdrawable) and the
    /// sponsor's main wallet with the net amounts. Terminal.
    pub async fn release(
        &self,
        id: &EmpowermentId,
        claim: &AdminClaim,
    ) -> Result<EmpowermentPackage> {
        claim.require_admin("release empowerment package")?;
        let mut package = self.store.empowerment(id).await?;
        ensure_state(&package, "release", "approved", &[EmpowermentState::Approved])?;

        let now = Utc::now();
        package.released_at = Some(now);
        package.state = EmpowermentState::Released;

        let combined_gross = package
            .gross_value
            .checked_add(package.gross_sponsor_reward)?;
        let combined_net = package.net_value.checked_add(package.net_sponsor_reward)?;
        let tax = package
            .total_tax
            .unwrap_or(combined_gross.checked_sub(combined_net)?);

        let mut batch = TriggerBatch::new("empowerment_release");
        batch.credit(&package.beneficiary, Wallet::Education, package.net_value);
        batch.ledger(LedgerEntry::new(
            package.beneficiary.clone(),
            EntryCategory::EmpowermentRelease,
            package.net_value,
            format!("empowerment value released by {}", package.sponsor),
            Some(package.sponsor.clone()),
        ));
        batch.credit(&package.sponsor, Wallet::Main, package.net_sponsor_reward);
        batch.ledger(LedgerEntry::new(
            package.sponsor.clone(),
            EntryCategory::EmpowermentRelease,
            package.net_sponsor_reward,
            "empowerment sponsor reward released".to_string(),
            Some(package.sponsor.clone()),
        ));
        batch.push(StateOp::PutEmpowerment(package.clone()));
        batch.push(StateOp::EmpowermentAudit(audit_row(
            &package,
            EmpowermentTransition::Release,
            combined_gross,
            tax,
            combined_net,
            &claim.actor,
        )));
        self.store.commit(batch).await?;

        info!(
            package = %package.id,
            beneficiary = %package.beneficiary,
            net_value = %package.net_value,
            "empowerment package released"
        );
        self.notifier
            .notify(NotifyEvent::EmpowermentReleased {
                package: package.id.clone(),
                sponsor: package.sponsor.clone(),
                beneficiary: package.beneficiary.clone(),
            })
            .await;
        Ok(package)
    }

    /// Admin fallback after maturity. Pays the precomputed fallback net
    /// amount to the sponsor. Terminal; unavailable once released.
    pub async fn trigger_fallback(
        &self,
        id: &EmpowermentId,
        claim: &AdminClaim,
    ) -> Result<EmpowermentPackage> {
        claim.require_admin("trigger fallback protection")?;
        let mut package = self.store.empowerment(id).await?;
        ensure_state(
            &package,
            "trigger fallback",
            "pending_maturity or approved",
            &[
                EmpowermentState::PendingMaturity,
                EmpowermentState::Approved,
            ],
        )?;

        let now = Utc::now();
        package.fallback_at = Some(now);
        package.state = EmpowermentState::FallbackActivated;

        let tax = package
            .fallback_gross
            .checked_sub(package.fallback_net)?;

        let mut batch = TriggerBatch::new("empowerment_fallback");
        batch.credit(&package.sponsor, Wallet::Main, package.fallback_net);
        batch.ledger(LedgerEntry::new(
            package.sponsor.clone(),
            EntryCategory::EmpowermentFallback,
            package.fallback_net,
            "empowerment fallback protection".to_string(),
            Some(package.sponsor.clone()),
        ));
        batch.push(StateOp::PutEmpowerment(package.clone()));
        batch.push(StateOp::EmpowermentAudit(audit_row(
            &package,
            EmpowermentTransition::Fallback,
            package.fallback_gross,
            tax,
            package.fallback_net,
            &claim.actor,
        )));
        self.store.commit(batch).await?;

        info!(package = %package.id, fallback_net = %package.fallback_net, "fallback protection activated");
        self.notifier
            .notify(NotifyEvent::EmpowermentFallback {
                package: package.id.clone(),
                sponsor: package.sponsor.clone(),
            })
            .await;
        Ok(package)
    }

    /// Sponsor-initiated conversion into a standard membership, valid any
    /// time before release. The conversion cost (the target package's
    /// price) is drawn from the sponsor's main wallet. Terminal.
    pub async fn convert(
        &self,
        id: &EmpowermentId,
        acting: &AccountId,
        target_package: &PackageId,
    ) -> Result<EmpowermentPackage> {
        let mut package = self.store.empowerment(id).await?;
        if acting != &package.sponsor {
            return Err(RewardError::Unauthorized {
                action: "convert empowerment package",
            });
        }
        if package.converted {
            return Err(RewardError::not_eligible("package already converted"));
        }
        ensure_state(
            &package,
            "convert",
            "countdown_running, pending_maturity or approved",
            &[
                EmpowermentState::CountdownRunning,
                EmpowermentState::PendingMaturity,
                EmpowermentState::Approved,
            ],
        )?;

        let target = self.store.package(target_package).await?;
        let sponsor = self.store.account(&package.sponsor).await?;
        let available = sponsor.balance(Wallet::Main);
        if target.price > available {
            return Err(RewardError::InsufficientBalance {
                wallet: Wallet::Main.as_str().to_string(),
                requested: target.price.to_string(),
                available: available.to_string(),
            });
        }

        let now = Utc::now();
        package.converted = true;
        package.conversion_amount = Some(target.price);
        package.converted_at = Some(now);
        package.state = EmpowermentState::ConvertedToRegularPlus;

        let mut batch = TriggerBatch::new("empowerment_convert");
        batch.debit(&package.sponsor, Wallet::Main, target.price);
        batch.ledger(LedgerEntry::new(
            package.sponsor.clone(),
            EntryCategory::EmpowermentConversion,
            target.price.negate(),
            format!("empowerment converted to {}", target.name),
            Some(package.sponsor.clone()),
        ));
        batch.push(StateOp::Activate {
            account: package.sponsor.clone(),
            package: target.id.clone(),
            activated_at: now,
            expires_at: now + Duration::days(ACTIVATION_TERM_DAYS),
        });
        batch.push(StateOp::SetPalliative {
            account: package.sponsor.clone(),
            tier: Some(target.tier),
            active: false,
            selected: None,
        });
        batch.push(StateOp::PutEmpowerment(package.clone()));
        batch.push(StateOp::EmpowermentAudit(audit_row(
            &package,
            EmpowermentTransition::Convert,
            target.price,
            Amount::zero(),
            target.price,
            acting,
        )));
        self.store.commit(batch).await?;

        info!(
            package = %package.id,
            sponsor = %package.sponsor,
            target = %target.id,
            "empowerment package converted"
        );
        self.notifier
            .notify(NotifyEvent::EmpowermentConverted {
                package: package.id.clone(),
                sponsor: package.sponsor.clone(),
            })
            .await;
        Ok(package)
    }
}

/// Guard a transition against the set of states it is valid from
fn ensure_state(
    package: &EmpowermentPackage,
    action: &'static str,
    expected: &'static str,
    allowed: &[EmpowermentState],
) -> Result<()> {
    if allowed.contains(&package.state) {
        Ok(())
    } else {
        Err(RewardError::InvalidState {
            action,
            expected,
            actual: package.state.as_str().to_string(),
        })
    }
}

fn audit_row(
    package: &EmpowermentPackage,
    transition: EmpowermentTransition,
    gross: Amount,
    tax: Amount,
    net: Amount,
    actor: &AccountId,
) -> EmpowermentTransaction {
    EmpowermentTransaction {
        id: AuditEntryId::new(),
        package: package.id.clone(),
        transition,
        gross,
        tax,
        net,
        actor: actor.clone(),
        created_at: Utc::now(),
    }
}
