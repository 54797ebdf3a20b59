//! Integration tests: gate driven by a real broadcast source.

use std::time::Duration;

use sessionward_activity::{
    ActivityGate, ActivitySignal, ActivitySource, GateState, Modifiers, SignalOutcome,
};

// =========================================================================
// Helpers
// =========================================================================

/// Pulls the next signal off the gate and feeds it back in, counting
/// renewals. Mirrors what the session actor does in its select loop.
async fn pump_one(gate: &mut ActivityGate, renewals: &mut u32) -> SignalOutcome {
    let signal = gate.next_signal().await;
    gate.handle_signal(&signal, || *renewals += 1)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_next_signal_pends_while_idle() {
    let source = ActivitySource::default();
    let mut gate = ActivityGate::new(source.clone());

    source.emit(ActivitySignal::Click);
    let result = tokio::time::timeout(Duration::from_secs(5), gate.next_signal()).await;

    assert!(result.is_err(), "an idle gate must not observe signals");
}

#[tokio::test(start_paused = true)]
async fn test_armed_gate_fires_on_emitted_click() {
    let source = ActivitySource::default();
    let mut gate = ActivityGate::new(source.clone());
    let mut renewals = 0;
    gate.arm();

    source.emit(ActivitySignal::Click);
    let outcome = pump_one(&mut gate, &mut renewals).await;

    assert_eq!(outcome, SignalOutcome::Fired);
    assert_eq!(renewals, 1);
    assert_eq!(gate.state(), GateState::Renewing);
}

#[tokio::test(start_paused = true)]
async fn test_modifier_chord_then_plain_key() {
    let source = ActivitySource::default();
    let mut gate = ActivityGate::new(source.clone());
    let mut renewals = 0;
    gate.arm();

    source.emit(ActivitySignal::key_with(Modifiers::ALT));
    source.emit(ActivitySignal::key());

    assert_eq!(pump_one(&mut gate, &mut renewals).await, SignalOutcome::Filtered);
    assert_eq!(gate.state(), GateState::Armed);
    assert_eq!(pump_one(&mut gate, &mut renewals).await, SignalOutcome::Fired);
    assert_eq!(renewals, 1);
}

#[tokio::test(start_paused = true)]
async fn test_burst_after_firing_is_not_observed() {
    let source = ActivitySource::default();
    let mut gate = ActivityGate::new(source.clone());
    let mut renewals = 0;
    gate.arm();

    for _ in 0..10 {
        source.emit(ActivitySignal::PointerMove);
    }
    pump_one(&mut gate, &mut renewals).await;

    // The listener was dropped with the remaining nine signals in it.
    assert_eq!(source.listener_count(), 0);
    assert_eq!(source.emit(ActivitySignal::Click), 0);
    let result = tokio::time::timeout(Duration::from_secs(1), gate.next_signal()).await;
    assert!(result.is_err());
    assert_eq!(renewals, 1);
}

#[tokio::test(start_paused = true)]
async fn test_next_signal_pends_after_source_dropped() {
    let source = ActivitySource::default();
    let mut gate = ActivityGate::new(source.clone());
    gate.arm();
    drop(source);

    // The gate keeps its own clone of the sender, so the channel stays
    // open; nothing arrives and the future pends.
    let result = tokio::time::timeout(Duration::from_secs(1), gate.next_signal()).await;
    assert!(result.is_err());
}
