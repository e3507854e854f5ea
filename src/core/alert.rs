//! Alert derivation: classify one unit against its service threshold.
//!
//! Pure functions over a unit snapshot. A unit without a resolvable threshold
//! is in the `NO_SCHEDULE` state and never produces an alert.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::unit::{Unit, UnitId, UnitKey, UnitKind};

/// A per-kind numeric setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindBands {
    /// Value for vehicles.
    pub vehicle: f64,
    /// Value for compressors.
    pub compressor: f64,
    /// Value for part instances.
    #[serde(rename = "item", alias = "part")]
    pub part: f64,
}

/// Per-kind values where any kind may be omitted.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialBands {
    vehicle: Option<f64>,
    compressor: Option<f64>,
    #[serde(rename = "item", alias = "part")]
    part: Option<f64>,
}

impl PartialBands {
    fn over(self, base: KindBands) -> KindBands {
        KindBands {
            vehicle: self.vehicle.unwrap_or(base.vehicle),
            compressor: self.compressor.unwrap_or(base.compressor),
            part: self.part.unwrap_or(base.part),
        }
    }
}

/// Deserialize near-threshold bands; omitted kinds keep their defaults.
pub(crate) fn near_bands_or_defaults<'de, D>(deserializer: D) -> Result<KindBands, D::Error>
where
    D: Deserializer<'de>,
{
    PartialBands::deserialize(deserializer).map(|p| p.over(KindBands::near_threshold_defaults()))
}

/// Deserialize urgency thresholds; omitted kinds keep their defaults.
pub(crate) fn urgency_or_defaults<'de, D>(deserializer: D) -> Result<KindBands, D::Error>
where
    D: Deserializer<'de>,
{
    PartialBands::deserialize(deserializer).map(|p| p.over(KindBands::urgency_defaults()))
}

impl KindBands {
    /// Default near-threshold bands `B`.
    pub const fn near_threshold_defaults() -> Self {
        Self {
            vehicle: UnitKind::Vehicle.default_band(),
            compressor: UnitKind::Compressor.default_band(),
            part: UnitKind::Part.default_band(),
        }
    }

    /// Default urgency thresholds `U`.
    pub const fn urgency_defaults() -> Self {
        Self {
            vehicle: UnitKind::Vehicle.default_urgency(),
            compressor: UnitKind::Compressor.default_urgency(),
            part: UnitKind::Part.default_urgency(),
        }
    }

    /// Value for `kind`.
    pub const fn for_kind(&self, kind: UnitKind) -> f64 {
        match kind {
            UnitKind::Vehicle => self.vehicle,
            UnitKind::Compressor => self.compressor,
            UnitKind::Part => self.part,
        }
    }
}

/// Bands used to classify alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicy {
    /// Near-threshold band `B`: `0 < remaining <= B` is due soon.
    #[serde(deserialize_with = "near_bands_or_defaults")]
    pub near_band: KindBands,
    /// Urgency threshold `U`: due-soon alerts with `remaining < U` are urgent.
    #[serde(deserialize_with = "urgency_or_defaults")]
    pub urgent_within: KindBands,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            near_band: KindBands::near_threshold_defaults(),
            urgent_within: KindBands::urgency_defaults(),
        }
    }
}

impl AlertPolicy {
    /// Require `0 < U < B` for every kind.
    pub fn validate(&self) -> Result<(), String> {
        for kind in UnitKind::ALL {
            let band = self.near_band.for_kind(kind);
            let urgent = self.urgent_within.for_kind(kind);
            if !band.is_finite() || band <= 0.0 {
                return Err(format!("{kind} band must be a positive number"));
            }
            if !urgent.is_finite() || urgent <= 0.0 {
                return Err(format!("{kind} urgency threshold must be a positive number"));
            }
            if urgent >= band {
                return Err(format!(
                    "{kind} urgency threshold ({urgent}) must be smaller than its band ({band})"
                ));
            }
        }
        Ok(())
    }
}

/// Service state of a unit, including the alert-free ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    /// No threshold and no milestones.
    NoSchedule,
    /// Threshold is further away than the band.
    Good,
    /// Threshold is within the band.
    DueSoon,
    /// Threshold reached or passed.
    Overdue,
}

/// Status carried by an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// Threshold reached or passed.
    Overdue,
    /// Threshold is within the band.
    DueSoon,
}

/// Alert priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    /// Due soon.
    Medium,
    /// Overdue.
    High,
}

/// Service assessment for management views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAssessment {
    /// Unit kind.
    pub unit_kind: UnitKind,
    /// Unit identifier.
    pub unit_id: UnitId,
    /// Display name.
    pub name: String,
    /// Current meter.
    pub current_meter: f64,
    /// Resolved threshold, if any.
    pub effective_threshold: Option<f64>,
    /// `effective_threshold - current_meter`, if a threshold resolved.
    pub remaining: Option<f64>,
    /// Classification.
    pub status: ServiceStatus,
}

/// A due-soon or overdue unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unit kind.
    pub unit_kind: UnitKind,
    /// Unit identifier.
    pub unit_id: UnitId,
    /// Display name.
    pub name: String,
    /// Current meter.
    pub current_meter: f64,
    /// Resolved threshold.
    pub effective_threshold: f64,
    /// `effective_threshold - current_meter`; zero or negative when overdue.
    pub remaining: f64,
    /// Alert status.
    pub status: AlertStatus,
    /// Alert priority.
    pub priority: AlertPriority,
    /// `-remaining`, set only when overdue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overdue_by: Option<f64>,
}

impl Alert {
    /// Key of the alerting unit.
    pub fn key(&self) -> UnitKey {
        UnitKey::new(self.unit_kind, self.unit_id.clone())
    }

    /// Overdue, or due soon with `remaining` strictly below `urgent_within`.
    pub fn is_urgent(&self, urgent_within: f64) -> bool {
        match self.status {
            AlertStatus::Overdue => true,
            AlertStatus::DueSoon => self.remaining < urgent_within,
        }
    }
}

/// Classify `unit` under `policy`.
pub fn assess(unit: &Unit, policy: &AlertPolicy) -> ServiceAssessment {
    let kind = unit.kind();
    let current_meter = unit.meter().current_meter;
    let effective_threshold = unit.effective_threshold();
    let remaining = effective_threshold.map(|t| t - current_meter);
    let band = policy.near_band.for_kind(kind);

    let status = match remaining {
        None => ServiceStatus::NoSchedule,
        Some(r) if r <= 0.0 => ServiceStatus::Overdue,
        Some(r) if r <= band => ServiceStatus::DueSoon,
        Some(_) => ServiceStatus::Good,
    };

    ServiceAssessment {
        unit_kind: kind,
        unit_id: unit.id().to_string(),
        name: unit.name().to_string(),
        current_meter,
        effective_threshold,
        remaining,
        status,
    }
}

/// Alert for `unit`, or `None` when it has no schedule or is not near its threshold.
pub fn derive_alert(unit: &Unit, policy: &AlertPolicy) -> Option<Alert> {
    let assessment = assess(unit, policy);
    let (status, priority) = match assessment.status {
        ServiceStatus::Overdue => (AlertStatus::Overdue, AlertPriority::High),
        ServiceStatus::DueSoon => (AlertStatus::DueSoon, AlertPriority::Medium),
        ServiceStatus::Good | ServiceStatus::NoSchedule => return None,
    };
    let effective_threshold = assessment.effective_threshold?;
    let remaining = assessment.remaining?;

    Some(Alert {
        unit_kind: assessment.unit_kind,
        unit_id: assessment.unit_id,
        name: assessment.name,
        current_meter: assessment.current_meter,
        effective_threshold,
        remaining,
        status,
        priority,
        overdue_by: (status == AlertStatus::Overdue).then_some(-remaining),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AlertPolicy {
        AlertPolicy::default()
    }

    #[test]
    fn test_no_schedule_yields_no_alert() {
        let v = Unit::new_vehicle("V1", "Truck", 5000.0);
        assert!(derive_alert(&v, &policy()).is_none());
        assert_eq!(assess(&v, &policy()).status, ServiceStatus::NoSchedule);
    }

    #[test]
    fn test_vehicle_due_soon_within_band() {
        let v = Unit::new_vehicle("V1", "Truck", 950.0).with_threshold(1000.0);
        let alert = derive_alert(&v, &policy()).unwrap();
        assert_eq!(alert.status, AlertStatus::DueSoon);
        assert_eq!(alert.priority, AlertPriority::Medium);
        assert_eq!(alert.remaining, 50.0);
        assert_eq!(alert.overdue_by, None);
    }

    #[test]
    fn test_band_edges() {
        // remaining == B is still due soon; remaining just above B is good.
        let v = Unit::new_vehicle("V1", "Truck", 900.0).with_threshold(1000.0);
        assert_eq!(derive_alert(&v, &policy()).unwrap().status, AlertStatus::DueSoon);
        let v = Unit::new_vehicle("V1", "Truck", 899.0).with_threshold(1000.0);
        assert!(derive_alert(&v, &policy()).is_none());
        assert_eq!(assess(&v, &policy()).status, ServiceStatus::Good);
    }

    #[test]
    fn test_part_uses_narrower_band() {
        let p = Unit::new_part("I1", "Bit #1", 440.0).with_threshold(500.0);
        assert!(derive_alert(&p, &policy()).is_none());
        let c = Unit::new_compressor("C1", "Air", 440.0).with_threshold(500.0);
        assert_eq!(derive_alert(&c, &policy()).unwrap().status, AlertStatus::DueSoon);
        let p = Unit::new_part("I1", "Bit #1", 450.0).with_threshold(500.0);
        assert_eq!(derive_alert(&p, &policy()).unwrap().status, AlertStatus::DueSoon);
    }

    #[test]
    fn test_overdue_at_and_past_threshold() {
        let v = Unit::new_vehicle("V1", "Truck", 1000.0).with_threshold(1000.0);
        let alert = derive_alert(&v, &policy()).unwrap();
        assert_eq!(alert.status, AlertStatus::Overdue);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.overdue_by, Some(0.0));

        let v = Unit::new_vehicle("V1", "Truck", 1050.0).with_threshold(1000.0);
        let alert = derive_alert(&v, &policy()).unwrap();
        assert_eq!(alert.remaining, -50.0);
        assert_eq!(alert.overdue_by, Some(50.0));
    }

    #[test]
    fn test_milestone_fallback_drives_alert() {
        let v = Unit::new_vehicle("V1", "Truck", 460.0).with_milestones(vec![250.0, 500.0]);
        let alert = derive_alert(&v, &policy()).unwrap();
        assert_eq!(alert.effective_threshold, 500.0);
        assert_eq!(alert.status, AlertStatus::DueSoon);

        // Every milestone passed: the largest one applies and the unit is overdue.
        let v = Unit::new_vehicle("V1", "Truck", 800.0).with_milestones(vec![250.0, 500.0]);
        let alert = derive_alert(&v, &policy()).unwrap();
        assert_eq!(alert.effective_threshold, 500.0);
        assert_eq!(alert.overdue_by, Some(300.0));
    }

    #[test]
    fn test_is_urgent_is_strict() {
        let v = Unit::new_vehicle("V1", "Truck", 950.0).with_threshold(1000.0);
        let alert = derive_alert(&v, &policy()).unwrap();
        assert!(!alert.is_urgent(50.0));
        assert!(alert.is_urgent(60.0));
    }

    #[test]
    fn test_policy_validation() {
        assert!(AlertPolicy::default().validate().is_ok());
        let mut p = AlertPolicy::default();
        p.urgent_within.part = p.near_band.part;
        assert!(p.validate().is_err());
        let mut p = AlertPolicy::default();
        p.near_band.vehicle = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_alert_json_omits_overdue_by_when_due_soon() {
        let v = Unit::new_vehicle("V1", "Truck", 950.0).with_threshold(1000.0);
        let json = serde_json::to_value(derive_alert(&v, &policy()).unwrap()).unwrap();
        assert_eq!(json["status"], "DUE_SOON");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["unit_kind"], "vehicle");
        assert!(json.get("overdue_by").is_none());
    }
}
