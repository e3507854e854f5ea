//! Fit/unfit lifecycle of part instances.
//!
//! `in_stock` ⇄ `fitted`. Fitting checks the instance, then commits under the
//! unit's lock only if it is still in stock. A caller that observed `in_stock`
//! but lost the commit to a concurrent fit gets `Conflict`; a caller that
//! arrives after the winner committed sees a fitted instance and gets
//! `InvalidState`. Unrelated writes in between, such as a meter advance, do
//! not fail the fit.

use crate::core::store::EquipmentStore;
use crate::core::unit::{FitStatus, PartInstance, Unit, UnitKey, UnitKind};
use crate::core::EngineError;

fn not_a_part(key: &UnitKey) -> EngineError {
    EngineError::NotFound(format!("part instance `{}` not found", key.id))
}

/// Attach an in-stock instance to a vehicle.
///
/// # Errors
///
/// `NotFound` for an unknown instance or vehicle, `InvalidState` if the
/// instance is already fitted, `Conflict` if a concurrent fit committed first.
pub fn fit<S: EquipmentStore>(
    store: &S,
    instance_id: &str,
    vehicle_id: &str,
) -> Result<PartInstance, EngineError> {
    let part_key = UnitKey::part(instance_id);
    let vehicle_key = UnitKey::vehicle(vehicle_id);

    // Vehicles are never removed by this engine, so existence checked here holds.
    store.read(&vehicle_key, |_| ()).map_err(|_| {
        EngineError::NotFound(format!("vehicle `{vehicle_id}` not found"))
    })?;

    let observed = store.read(&part_key, |unit| unit.as_part().map(|p| p.fit.clone()))?;
    match observed.value {
        None => return Err(not_a_part(&part_key)),
        Some(FitStatus::Fitted {
            fitted_to_vehicle_id,
        }) => {
            return Err(EngineError::InvalidState(format!(
                "part instance `{instance_id}` is already fitted to `{fitted_to_vehicle_id}`"
            )))
        }
        Some(FitStatus::InStock) => {}
    }

    let committed = store.update(&part_key, None, |unit| {
        let part = unit.as_part_mut().ok_or_else(|| not_a_part(&part_key))?;
        if let FitStatus::Fitted {
            fitted_to_vehicle_id,
        } = &part.fit
        {
            return Err(EngineError::Conflict(format!(
                "part instance `{instance_id}` was fitted to `{fitted_to_vehicle_id}` concurrently"
            )));
        }
        part.fit = FitStatus::Fitted {
            fitted_to_vehicle_id: vehicle_id.to_string(),
        };
        Ok(part.clone())
    })?;
    Ok(committed.value)
}

/// Detach a fitted instance and return it to stock.
///
/// # Errors
///
/// `NotFound` for an unknown instance, `InvalidState` if it is not fitted.
pub fn unfit<S: EquipmentStore>(store: &S, instance_id: &str) -> Result<PartInstance, EngineError> {
    let part_key = UnitKey::part(instance_id);
    let committed = store.update(&part_key, None, |unit| {
        let part = unit.as_part_mut().ok_or_else(|| not_a_part(&part_key))?;
        if part.fit.is_in_stock() {
            return Err(EngineError::InvalidState(format!(
                "part instance `{instance_id}` is not fitted"
            )));
        }
        part.fit = FitStatus::InStock;
        Ok(part.clone())
    })?;
    Ok(committed.value)
}

fn parts<S: EquipmentStore>(store: &S) -> impl Iterator<Item = PartInstance> {
    store
        .list(Some(UnitKind::Part))
        .into_iter()
        .filter_map(|unit| match unit {
            Unit::Part(p) => Some(p),
            _ => None,
        })
}

/// Every in-stock instance.
pub fn list_available<S: EquipmentStore>(store: &S) -> Vec<PartInstance> {
    parts(store).filter(|p| p.fit.is_in_stock()).collect()
}

/// Every instance fitted to `vehicle_id`.
pub fn list_fitted_to<S: EquipmentStore>(store: &S, vehicle_id: &str) -> Vec<PartInstance> {
    parts(store)
        .filter(|p| p.fit.fitted_to() == Some(vehicle_id))
        .collect()
}
