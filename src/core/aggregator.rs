//! Alert aggregation across every unit kind.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::alert::{derive_alert, Alert, AlertPolicy, AlertPriority, AlertStatus};
use crate::core::store::EquipmentStore;
use crate::core::unit::UnitKind;

/// Optional restrictions applied to the full alert list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    /// Keep only this kind.
    #[serde(default)]
    pub unit_kind: Option<UnitKind>,
    /// Keep only this priority.
    #[serde(default)]
    pub priority: Option<AlertPriority>,
    /// Keep only this status.
    #[serde(default)]
    pub status: Option<AlertStatus>,
}

impl AlertFilter {
    /// Filter on one kind.
    #[must_use]
    pub const fn kind(mut self, kind: UnitKind) -> Self {
        self.unit_kind = Some(kind);
        self
    }

    /// Filter on one priority.
    #[must_use]
    pub const fn priority(mut self, priority: AlertPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Filter on one status.
    #[must_use]
    pub const fn status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn matches(&self, alert: &Alert) -> bool {
        self.unit_kind.is_none_or(|k| k == alert.unit_kind)
            && self.priority.is_none_or(|p| p == alert.priority)
            && self.status.is_none_or(|s| s == alert.status)
    }
}

/// Alert counts for one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    /// Overdue alerts.
    pub overdue: usize,
    /// Due-soon alerts.
    pub due_soon: usize,
    /// Alerts in the urgent feed.
    pub urgent: usize,
}

/// Alert counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Vehicle counts.
    pub vehicle: KindSummary,
    /// Compressor counts.
    pub compressor: KindSummary,
    /// Part instance counts.
    #[serde(rename = "item")]
    pub part: KindSummary,
}

impl AlertSummary {
    fn entry(&mut self, kind: UnitKind) -> &mut KindSummary {
        match kind {
            UnitKind::Vehicle => &mut self.vehicle,
            UnitKind::Compressor => &mut self.compressor,
            UnitKind::Part => &mut self.part,
        }
    }

    /// Total alerts of every kind.
    pub const fn total(&self) -> usize {
        self.vehicle.overdue
            + self.vehicle.due_soon
            + self.compressor.overdue
            + self.compressor.due_soon
            + self.part.overdue
            + self.part.due_soon
    }
}

/// Overdue first, most overdue first; then due soon, soonest first.
/// Ties fall back to kind then id so the order is stable across polls.
pub fn alert_order(a: &Alert, b: &Alert) -> Ordering {
    let rank = |s: AlertStatus| match s {
        AlertStatus::Overdue => 0u8,
        AlertStatus::DueSoon => 1u8,
    };
    rank(a.status)
        .cmp(&rank(b.status))
        .then_with(|| match a.status {
            AlertStatus::Overdue => b
                .overdue_by
                .unwrap_or_default()
                .total_cmp(&a.overdue_by.unwrap_or_default()),
            AlertStatus::DueSoon => a.remaining.total_cmp(&b.remaining),
        })
        .then_with(|| a.unit_kind.cmp(&b.unit_kind))
        .then_with(|| a.unit_id.cmp(&b.unit_id))
}

/// Sort alerts in place with [`alert_order`].
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(alert_order);
}

/// Every alert in the fleet matching `filter`, sorted.
pub fn list_alerts<S: EquipmentStore>(
    store: &S,
    policy: &AlertPolicy,
    filter: &AlertFilter,
) -> Vec<Alert> {
    let units = store.list(filter.unit_kind);
    let mut alerts: Vec<Alert> = units
        .iter()
        .filter_map(|unit| derive_alert(unit, policy))
        .filter(|alert| filter.matches(alert))
        .collect();
    sort_alerts(&mut alerts);
    alerts
}

/// Overdue alerts plus due-soon alerts strictly inside the urgency threshold, sorted.
pub fn list_urgent<S: EquipmentStore>(store: &S, policy: &AlertPolicy) -> Vec<Alert> {
    list_alerts(store, policy, &AlertFilter::default())
        .into_iter()
        .filter(|alert| alert.is_urgent(policy.urgent_within.for_kind(alert.unit_kind)))
        .collect()
}

/// Count alerts per kind and status.
pub fn summarize<S: EquipmentStore>(store: &S, policy: &AlertPolicy) -> AlertSummary {
    let mut summary = AlertSummary::default();
    for alert in list_alerts(store, policy, &AlertFilter::default()) {
        let urgent = alert.is_urgent(policy.urgent_within.for_kind(alert.unit_kind));
        let entry = summary.entry(alert.unit_kind);
        match alert.status {
            AlertStatus::Overdue => entry.overdue += 1,
            AlertStatus::DueSoon => entry.due_soon += 1,
        }
        if urgent {
            entry.urgent += 1;
        }
    }
    summary
}
