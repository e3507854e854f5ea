//! Concurrency tests for fitting part instances.
//!
//! Many callers race to fit the same in-stock instance; exactly one wins and
//! every loser sees `Conflict` or `InvalidState`, never a silent overwrite.

use std::sync::{Arc, Barrier};
use std::thread;

use meter_service_engine::builders::EngineBuilder;
use meter_service_engine::config::EngineConfig;
use meter_service_engine::core::{EngineError, EquipmentStore, FitStatus, Unit, UnitKey};

#[test]
fn test_concurrent_fit_has_single_winner() {
    const CALLERS: usize = 8;

    for round in 0..20 {
        let engine = Arc::new(
            EngineBuilder::new(EngineConfig::default())
                .build_in_memory()
                .unwrap(),
        );
        for v in 0..CALLERS {
            engine
                .register(Unit::new_vehicle(format!("V{v}"), "Rig", 0.0))
                .unwrap();
        }
        engine.register(Unit::new_part("I", "Hammer", 0.0)).unwrap();

        let barrier = Arc::new(Barrier::new(CALLERS));
        let handles: Vec<_> = (0..CALLERS)
            .map(|v| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (v, engine.fit_item("I", &format!("V{v}")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
        assert_eq!(winners.len(), 1, "round {round}");

        for (_, result) in &results {
            if let Err(e) = result {
                assert!(
                    matches!(e, EngineError::Conflict(_) | EngineError::InvalidState(_)),
                    "unexpected error {e}"
                );
            }
        }

        let winner_vehicle = format!("V{}", winners[0].0);
        let stored = engine.store().load(&UnitKey::part("I")).unwrap().value;
        assert_eq!(
            stored.as_part().unwrap().fit,
            FitStatus::Fitted {
                fitted_to_vehicle_id: winner_vehicle.clone()
            }
        );
        let hosts: usize = (0..CALLERS)
            .map(|v| engine.list_fitted_to(&format!("V{v}")).len())
            .sum();
        assert_eq!(hosts, 1);
        assert_eq!(engine.list_fitted_to(&winner_vehicle).len(), 1);
    }
}

#[test]
fn test_fits_of_different_instances_do_not_interfere() {
    let engine = Arc::new(
        EngineBuilder::new(EngineConfig::default())
            .build_in_memory()
            .unwrap(),
    );
    engine.register(Unit::new_vehicle("V1", "Rig", 0.0)).unwrap();
    for i in 0..16 {
        engine
            .register(Unit::new_part(format!("I{i}"), "Bit", 0.0))
            .unwrap();
    }

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.fit_item(&format!("I{i}"), "V1"))
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }

    assert_eq!(engine.list_fitted_to("V1").len(), 16);
    assert!(engine.list_available().is_empty());
}
