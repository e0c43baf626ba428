use core::time::Duration;

use heapless::Vec;

use watcher_core::config::{UvloThresholds, WatcherConfig};
use watcher_core::press::PressLine;
use watcher_core::supervisor::Supervisor;
use watcher_core::uvlo::GateTransition;

/// Output-line transitions observed during a scenario.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum LineEvent {
    DrivenLow,
    Released,
}

#[derive(Default)]
struct RecordingLine {
    events: Vec<LineEvent, 64>,
}

impl PressLine for RecordingLine {
    fn drive_low(&mut self) {
        self.events.push(LineEvent::DrivenLow).expect("line capacity");
    }

    fn release(&mut self) {
        self.events.push(LineEvent::Released).expect("line capacity");
    }
}

/// Compact profile: board thresholds, but a cadence short enough to watch.
fn compact_config() -> WatcherConfig {
    WatcherConfig {
        pulse_width: Duration::from_millis(120),
        auto_press_ticks: 5,
        supply_check_ticks: 2,
        debounce_ticks: 1,
        startup_inhibit_ticks: 4,
        uvlo: Some(UvloThresholds::new(3_000, 2_900, 3)),
    }
}

fn running_supervisor() -> Supervisor {
    let mut supervisor = Supervisor::new(compact_config()).expect("profile validates");
    for _ in 0..3 {
        supervisor.on_supply_sample(Some(3_200));
    }
    while supervisor.inhibit_remaining() > 0 {
        supervisor.on_tick();
    }
    supervisor
}

/// One firmware loop iteration after a tick: execute any due press, then
/// apply the forced release that runs while the gate is blocked. Supply
/// samples are fed explicitly by each scenario.
fn run_loop_tick(supervisor: &mut Supervisor, line: &mut RecordingLine) {
    let actions = supervisor.on_tick();
    if actions.press.is_some() {
        line.drive_low();
        line.release();
    }
    if supervisor.output_forced_released() {
        line.release();
    }
}

#[test]
fn single_low_sample_blocks_instantly() {
    let mut supervisor = running_supervisor();

    assert_eq!(
        supervisor.on_supply_sample(Some(2_800)),
        Some(GateTransition::Dropped)
    );
    assert!(supervisor.output_forced_released());
}

#[test]
fn drop_on_the_press_tick_suppresses_the_due_press() {
    let mut supervisor = running_supervisor();
    let mut line = RecordingLine::default();

    // Walk to a tick where the supply check and the automatic press come
    // due together; a five-tick cadence against a two-tick check interval
    // lines them up within two press cycles.
    let mut ticks = 0;
    let actions = loop {
        ticks += 1;
        assert!(ticks <= 20, "check and press never landed on one tick");
        let actions = supervisor.on_tick();
        if actions.sample_supply && actions.press.is_some() {
            break actions;
        }
    };

    // The loop feeds the sample to the gate before executing the press;
    // a drop observed here must swallow the press authorized on the same
    // tick.
    assert_eq!(
        supervisor.on_supply_sample(Some(2_800)),
        Some(GateTransition::Dropped)
    );
    if actions.press.is_some() && supervisor.pressing_allowed() {
        line.drive_low();
        line.release();
    }
    if supervisor.output_forced_released() {
        line.release();
    }

    assert!(!line.events.contains(&LineEvent::DrivenLow));
    assert_eq!(line.events.last(), Some(&LineEvent::Released));
}

#[test]
fn next_loop_iteration_forces_the_output_released() {
    let mut supervisor = running_supervisor();
    let mut line = RecordingLine::default();

    supervisor.on_supply_sample(Some(2_800));
    run_loop_tick(&mut supervisor, &mut line);

    assert_eq!(line.events.last(), Some(&LineEvent::Released));
    assert!(!line.events.contains(&LineEvent::DrivenLow));
}

#[test]
fn no_press_fires_while_blocked() {
    let mut supervisor = running_supervisor();
    let mut line = RecordingLine::default();

    supervisor.on_supply_sample(Some(2_800));
    for _ in 0..30 {
        run_loop_tick(&mut supervisor, &mut line);
    }

    assert!(!line.events.contains(&LineEvent::DrivenLow));
}

#[test]
fn hysteresis_band_rides_through_ripple() {
    let mut supervisor = running_supervisor();

    // Dips between fall (2900) and rise (3000) never trip the gate.
    for _ in 0..20 {
        assert_eq!(supervisor.on_supply_sample(Some(2_950)), None);
        assert!(supervisor.gate_allowed());
    }
}

#[test]
fn recovery_needs_a_fresh_confirmation_run() {
    let mut supervisor = running_supervisor();
    supervisor.on_supply_sample(Some(2_800));

    supervisor.on_supply_sample(Some(3_100));
    supervisor.on_supply_sample(Some(3_100));
    // One dip wipes the accumulated credit.
    supervisor.on_supply_sample(Some(2_990));
    assert!(!supervisor.gate_allowed());

    supervisor.on_supply_sample(Some(3_100));
    supervisor.on_supply_sample(Some(3_100));
    assert_eq!(
        supervisor.on_supply_sample(Some(3_100)),
        Some(GateTransition::Recovered)
    );
    assert_eq!(supervisor.inhibit_remaining(), 4);
}

#[test]
fn press_cadence_restarts_after_recovery_and_grace_period() {
    let mut supervisor = running_supervisor();
    let mut line = RecordingLine::default();

    supervisor.on_supply_sample(Some(2_800));
    for _ in 0..3 {
        supervisor.on_supply_sample(Some(3_100));
    }

    // Cadence progress from before the drop is retained (one tick here),
    // so the press lands after the four-tick grace period plus the four
    // remaining cadence ticks.
    for _ in 0..6 {
        run_loop_tick(&mut supervisor, &mut line);
        assert!(!line.events.contains(&LineEvent::DrivenLow));
    }
    run_loop_tick(&mut supervisor, &mut line);
    assert!(line.events.contains(&LineEvent::DrivenLow));
}
