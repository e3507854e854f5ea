//! Unit data model: vehicles, compressors and fittable part instances.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::EngineError;
use crate::util::validate::{check_meter, check_optional_meter, normalize_milestones};

/// Opaque unit identifier assigned by the equipment registry.
pub type UnitId = String;

/// The three kinds of metered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// A vehicle; may host fitted part instances.
    Vehicle,
    /// A compressor.
    Compressor,
    /// An individually numbered fittable part.
    #[serde(rename = "item")]
    Part,
}

impl UnitKind {
    /// All kinds, in alert tie-break order.
    pub const ALL: [Self; 3] = [Self::Vehicle, Self::Compressor, Self::Part];

    /// Default near-threshold band `B`.
    pub const fn default_band(self) -> f64 {
        match self {
            Self::Vehicle | Self::Compressor => 100.0,
            Self::Part => 50.0,
        }
    }

    /// Default urgency threshold `U`, strictly inside the band.
    pub const fn default_urgency(self) -> f64 {
        match self {
            Self::Vehicle | Self::Compressor => 50.0,
            Self::Part => 20.0,
        }
    }

    /// Whether units of this kind carry schedule milestones.
    pub const fn has_milestones(self) -> bool {
        matches!(self, Self::Vehicle | Self::Compressor)
    }

    /// Wire name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Compressor => "compressor",
            Self::Part => "item",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store key of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    /// Unit kind.
    pub kind: UnitKind,
    /// Unit identifier, unique within its kind.
    pub id: UnitId,
}

impl UnitKey {
    /// Build a key.
    pub fn new(kind: UnitKind, id: impl Into<UnitId>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Key of a vehicle.
    pub fn vehicle(id: impl Into<UnitId>) -> Self {
        Self::new(UnitKind::Vehicle, id)
    }

    /// Key of a compressor.
    pub fn compressor(id: impl Into<UnitId>) -> Self {
        Self::new(UnitKind::Compressor, id)
    }

    /// Key of a part instance.
    pub fn part(id: impl Into<UnitId>) -> Self {
        Self::new(UnitKind::Part, id)
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Meter reading and service threshold shared by every kind.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Meter {
    /// Cumulative usage counter.
    pub current_meter: f64,
    /// Meter value at which the next service is due.
    pub next_service_threshold: Option<f64>,
}

impl Meter {
    /// Meter at `current_meter` with an optional threshold.
    pub const fn new(current_meter: f64, next_service_threshold: Option<f64>) -> Self {
        Self {
            current_meter,
            next_service_threshold,
        }
    }
}

/// Fit state of a part instance.
///
/// The fitted vehicle exists exactly when the instance is fitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitStatus {
    /// Available for fitting.
    #[default]
    InStock,
    /// Attached to one vehicle.
    Fitted {
        /// Vehicle hosting the instance.
        fitted_to_vehicle_id: UnitId,
    },
}

impl FitStatus {
    /// Vehicle the instance is fitted to, if any.
    pub fn fitted_to(&self) -> Option<&str> {
        match self {
            Self::InStock => None,
            Self::Fitted {
                fitted_to_vehicle_id,
            } => Some(fitted_to_vehicle_id),
        }
    }

    /// True when the instance is in stock.
    pub const fn is_in_stock(&self) -> bool {
        matches!(self, Self::InStock)
    }
}

/// A vehicle record as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Identifier.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Meter state.
    #[serde(flatten)]
    pub meter: Meter,
    /// Historical thresholds, ascending.
    #[serde(default)]
    pub schedule_milestones: Vec<f64>,
}

/// A compressor record as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compressor {
    /// Identifier.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Meter state.
    #[serde(flatten)]
    pub meter: Meter,
    /// Historical thresholds, ascending.
    #[serde(default)]
    pub schedule_milestones: Vec<f64>,
}

/// A numbered fittable part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInstance {
    /// Identifier.
    pub id: UnitId,
    /// Display name (item name and serial).
    pub name: String,
    /// Meter state.
    #[serde(flatten)]
    pub meter: Meter,
    /// Fit state.
    #[serde(flatten)]
    pub fit: FitStatus,
}

/// Any metered unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unit {
    /// A vehicle.
    Vehicle(Vehicle),
    /// A compressor.
    Compressor(Compressor),
    /// A part instance.
    #[serde(rename = "item")]
    Part(PartInstance),
}

/// Snapshot of the meter-related fields of one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterState {
    /// Cumulative usage counter.
    pub current_meter: f64,
    /// Explicit next threshold.
    pub next_service_threshold: Option<f64>,
    /// Milestones, for kinds that carry them.
    pub schedule_milestones: Option<Vec<f64>>,
}

impl Unit {
    /// Vehicle with no threshold and no milestones.
    pub fn new_vehicle(id: impl Into<UnitId>, name: impl Into<String>, current_meter: f64) -> Self {
        Self::Vehicle(Vehicle {
            id: id.into(),
            name: name.into(),
            meter: Meter::new(current_meter, None),
            schedule_milestones: Vec::new(),
        })
    }

    /// Compressor with no threshold and no milestones.
    pub fn new_compressor(
        id: impl Into<UnitId>,
        name: impl Into<String>,
        current_meter: f64,
    ) -> Self {
        Self::Compressor(Compressor {
            id: id.into(),
            name: name.into(),
            meter: Meter::new(current_meter, None),
            schedule_milestones: Vec::new(),
        })
    }

    /// In-stock part instance with no threshold.
    pub fn new_part(id: impl Into<UnitId>, name: impl Into<String>, current_meter: f64) -> Self {
        Self::Part(PartInstance {
            id: id.into(),
            name: name.into(),
            meter: Meter::new(current_meter, None),
            fit: FitStatus::InStock,
        })
    }

    /// Builder-style threshold setter.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.meter_mut().next_service_threshold = Some(threshold);
        self
    }

    /// Builder-style milestone setter. Ignored for part instances.
    #[must_use]
    pub fn with_milestones(mut self, milestones: Vec<f64>) -> Self {
        match &mut self {
            Self::Vehicle(v) => v.schedule_milestones = milestones,
            Self::Compressor(c) => c.schedule_milestones = milestones,
            Self::Part(_) => {}
        }
        self
    }

    /// Unit kind.
    pub const fn kind(&self) -> UnitKind {
        match self {
            Self::Vehicle(_) => UnitKind::Vehicle,
            Self::Compressor(_) => UnitKind::Compressor,
            Self::Part(_) => UnitKind::Part,
        }
    }

    /// Unit identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Vehicle(v) => &v.id,
            Self::Compressor(c) => &c.id,
            Self::Part(p) => &p.id,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Vehicle(v) => &v.name,
            Self::Compressor(c) => &c.name,
            Self::Part(p) => &p.name,
        }
    }

    /// Store key.
    pub fn key(&self) -> UnitKey {
        UnitKey::new(self.kind(), self.id())
    }

    /// Meter state.
    pub const fn meter(&self) -> &Meter {
        match self {
            Self::Vehicle(v) => &v.meter,
            Self::Compressor(c) => &c.meter,
            Self::Part(p) => &p.meter,
        }
    }

    /// Mutable meter state.
    pub fn meter_mut(&mut self) -> &mut Meter {
        match self {
            Self::Vehicle(v) => &mut v.meter,
            Self::Compressor(c) => &mut c.meter,
            Self::Part(p) => &mut p.meter,
        }
    }

    /// Schedule milestones; `None` for kinds without them.
    pub fn milestones(&self) -> Option<&[f64]> {
        match self {
            Self::Vehicle(v) => Some(&v.schedule_milestones),
            Self::Compressor(c) => Some(&c.schedule_milestones),
            Self::Part(_) => None,
        }
    }

    /// Replace the schedule milestones.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for part instances or invalid milestone values.
    pub fn set_milestones(&mut self, milestones: &[f64]) -> Result<(), EngineError> {
        let normalized = normalize_milestones(milestones)?;
        match self {
            Self::Vehicle(v) => v.schedule_milestones = normalized,
            Self::Compressor(c) => c.schedule_milestones = normalized,
            Self::Part(p) => {
                return Err(EngineError::InvalidArgument(format!(
                    "part instance `{}` has no schedule milestones",
                    p.id
                )))
            }
        }
        Ok(())
    }

    /// The part instance, if this unit is one.
    pub const fn as_part(&self) -> Option<&PartInstance> {
        match self {
            Self::Part(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable part instance, if this unit is one.
    pub fn as_part_mut(&mut self) -> Option<&mut PartInstance> {
        match self {
            Self::Part(p) => Some(p),
            _ => None,
        }
    }

    /// Meter snapshot.
    pub fn meter_state(&self) -> MeterState {
        let meter = self.meter();
        MeterState {
            current_meter: meter.current_meter,
            next_service_threshold: meter.next_service_threshold,
            schedule_milestones: self.milestones().map(<[f64]>::to_vec),
        }
    }

    /// Threshold used for alerting: the explicit threshold, else the milestone fallback.
    pub fn effective_threshold(&self) -> Option<f64> {
        let meter = self.meter();
        meter.next_service_threshold.or_else(|| {
            self.milestones()
                .and_then(|m| milestone_threshold(m, meter.current_meter))
        })
    }

    /// Check the stored-record invariants before the unit enters a store.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the meter, threshold or milestones are malformed
    /// or the identifier is empty.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id().trim().is_empty() {
            return Err(EngineError::InvalidArgument("unit id must not be empty".into()));
        }
        let meter = self.meter();
        check_meter("current meter", meter.current_meter)?;
        check_optional_meter("next service threshold", meter.next_service_threshold)?;
        if let Some(milestones) = self.milestones() {
            normalize_milestones(milestones)?;
        }
        if let Some(vehicle) = self.as_part().and_then(|p| p.fit.fitted_to()) {
            if vehicle.trim().is_empty() {
                return Err(EngineError::InvalidArgument(
                    "fitted vehicle id must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Smallest milestone strictly greater than `current`, or the largest milestone
/// if none exceed it. `None` for an empty set.
pub fn milestone_threshold(milestones: &[f64], current: f64) -> Option<f64> {
    milestones
        .iter()
        .copied()
        .filter(|m| *m > current)
        .min_by(f64::total_cmp)
        .or_else(|| milestones.iter().copied().max_by(f64::total_cmp))
}

/// A value paired with the store version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// Version counter; bumped on every committed update.
    pub version: u64,
    /// The value.
    pub value: T,
}
