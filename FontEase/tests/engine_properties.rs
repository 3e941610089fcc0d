//! End-to-end properties of the state-change engine
//!
//! Exercises the apply/restore laws against the in-memory platform:
//! round-trips, idempotence, single-level undo and the failure paths that
//! keep the snapshot honest.

use fontease::platform::memory::MemoryFontPlatform;
use fontease::{ApplyOutcome, FontEngine, FontError, RefreshStatus, DEFAULT_SYSTEM_FONT};
use std::sync::Arc;

fn engine_with_fonts(fonts: &[(&str, &str)]) -> (Arc<MemoryFontPlatform>, FontEngine) {
    let platform = Arc::new(MemoryFontPlatform::new());
    for (family, file) in fonts {
        platform.add_font(family, file);
    }
    let engine = FontEngine::new(platform.clone());
    (platform, engine)
}

fn standard_engine() -> (Arc<MemoryFontPlatform>, FontEngine) {
    engine_with_fonts(&[("Segoe UI", "segoeui.ttf"), ("Consolas", "consola.ttf")])
}

#[test]
fn apply_then_restore_round_trips() {
    let (_, engine) = standard_engine();

    let before = engine.current_font().unwrap();
    engine.apply("Consolas").unwrap();
    let outcome = engine.restore().unwrap();

    assert_eq!(outcome.state, before);
    assert_eq!(engine.current_font().unwrap(), before);
}

#[test]
fn scenario_segoe_to_consolas_and_back() {
    let (_, engine) = standard_engine();

    let outcome = engine.apply("Consolas").unwrap();
    assert_eq!(outcome.state().active_font_name, "Consolas");

    let snapshot = engine.store().load_snapshot().unwrap().unwrap();
    assert_eq!(snapshot.previous_font_name, "Segoe UI");

    let restored = engine.restore().unwrap();
    assert_eq!(restored.state.active_font_name, "Segoe UI");
}

#[test]
fn apply_current_font_is_a_noop() {
    let (_, engine) = standard_engine();

    let outcome = engine.apply("Segoe UI").unwrap();
    assert!(matches!(outcome, ApplyOutcome::AlreadyActive { .. }));

    // No snapshot was created by the no-op
    assert!(engine.store().load_snapshot().unwrap().is_none());
    assert_eq!(
        engine.current_font().unwrap().active_font_name,
        DEFAULT_SYSTEM_FONT
    );
}

#[test]
fn restore_without_any_apply_fails_with_no_snapshot() {
    let (_, engine) = standard_engine();
    let result = engine.restore();
    assert!(matches!(result, Err(FontError::NoSnapshot)));
}

#[test]
fn two_applies_then_restore_reverts_only_the_last() {
    let (_, engine) = engine_with_fonts(&[
        ("Segoe UI", "segoeui.ttf"),
        ("Font A", "fonta.ttf"),
        ("Font B", "fontb.ttf"),
    ]);

    engine.apply("Font A").unwrap();
    engine.apply("Font B").unwrap();

    let outcome = engine.restore().unwrap();
    assert_eq!(outcome.state.active_font_name, "Font A");

    // The state before apply(A) is not recoverable with a single restore
    let second = engine.restore();
    assert!(matches!(second, Err(FontError::NoSnapshot)));
    assert_eq!(engine.current_font().unwrap().active_font_name, "Font A");
}

#[test]
fn failed_configuration_write_discards_the_snapshot() {
    let (platform, engine) = standard_engine();
    platform.set_fail_config_write(true);

    let result = engine.apply("Consolas");
    assert!(result.is_err());

    assert!(engine.store().load_snapshot().unwrap().is_none());
    assert_eq!(
        engine.current_font().unwrap().active_font_name,
        DEFAULT_SYSTEM_FONT
    );
}

#[test]
fn failed_snapshot_persistence_refuses_the_apply() {
    let (platform, engine) = standard_engine();
    platform.set_fail_snapshot_save(true);

    let result = engine.apply("Consolas");
    assert!(matches!(result, Err(FontError::Persistence(_))));

    // The configuration write never ran
    assert_eq!(
        engine.current_font().unwrap().active_font_name,
        DEFAULT_SYSTEM_FONT
    );
}

#[test]
fn refused_refresh_defers_but_applies() {
    let (platform, engine) = standard_engine();
    platform.set_refuse_refresh(true);

    let outcome = engine.apply("Consolas").unwrap();
    assert!(matches!(
        outcome,
        ApplyOutcome::Applied {
            refresh: RefreshStatus::Deferred,
            ..
        }
    ));
    assert_eq!(engine.current_font().unwrap().active_font_name, "Consolas");

    // Restore also lands while refresh stays deferred
    let restored = engine.restore().unwrap();
    assert_eq!(restored.refresh, RefreshStatus::Deferred);
    assert_eq!(
        engine.current_font().unwrap().active_font_name,
        DEFAULT_SYSTEM_FONT
    );
}

#[test]
fn unknown_font_is_rejected_before_any_mutation() {
    let (_, engine) = standard_engine();

    let result = engine.apply("No Such Font");
    assert!(matches!(result, Err(FontError::UnknownFont(_))));
    assert!(engine.store().load_snapshot().unwrap().is_none());
}

#[test]
fn unreadable_font_registry_is_an_error_not_an_empty_list() {
    let (platform, engine) = standard_engine();
    platform.set_fail_enumeration(true);

    let result = engine.list_fonts();
    assert!(matches!(result, Err(FontError::Enumeration(_))));
}
