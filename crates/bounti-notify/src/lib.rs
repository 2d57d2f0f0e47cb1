//! Bounti Notify - Fire-and-forget notification capability
//!
//! The rewards core emits typed events after a trigger commits. Delivery
//! is a consumed capability: a failed or slow dispatch must never fail or
//! delay the financial transaction, so the trait returns nothing and
//! implementations swallow (and log) their own failures.

use bounti_types::{AccountId, EmpowermentId, PackageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Events emitted by the rewards core after a successful commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyEvent {
    /// An ancestor earned a referral reward
    ReferralReward {
        recipient: AccountId,
        source: AccountId,
        level: u8,
    },
    MembershipActivated {
        account: AccountId,
        package: PackageId,
    },
    MembershipRenewed {
        account: AccountId,
        package: PackageId,
        expires_at: DateTime<Utc>,
    },
    MembershipUpgraded {
        account: AccountId,
        package: PackageId,
    },
    /// Sent to sponsor, beneficiary, and admins when maturity is reached
    EmpowermentMatured {
        package: EmpowermentId,
        sponsor: AccountId,
        beneficiary: AccountId,
    },
    EmpowermentApproved {
        package: EmpowermentId,
        sponsor: AccountId,
    },
    EmpowermentReleased {
        package: EmpowermentId,
        sponsor: AccountId,
        beneficiary: AccountId,
    },
    EmpowermentFallback {
        package: EmpowermentId,
        sponsor: AccountId,
    },
    EmpowermentConverted {
        package: EmpowermentId,
        sponsor: AccountId,
    },
}

/// Notification capability consumed by the engines.
///
/// Implementations must not block the caller on transport failures.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotifyEvent);
}

/// Notifier that logs every event through `tracing`
pub struct TracingNotifier;

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, event: NotifyEvent) {
        info!(?event, "notification dispatched");
    }
}

/// Notifier that drops every event
pub struct NullNotifier;

#[async_trait::async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _event: NotifyEvent) {}
}

/// Notifier that records events in memory, for tests and local inspection
#[derive(Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<NotifyEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotifyEvent) {
        self.events.lock().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        let account = AccountId::new();
        let package = PackageId::new();

        notifier
            .notify(NotifyEvent::MembershipActivated {
                account: account.clone(),
                package: package.clone(),
            })
            .await;
        notifier
            .notify(NotifyEvent::MembershipUpgraded {
                account: account.clone(),
                package,
            })
            .await;

        let events = notifier.events().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], NotifyEvent::MembershipActivated { .. }));
    }
}
