//! Out-of-band samples: the seat faults, one diagnostics entry is
//! produced, and the rest of the pipeline keeps running.

use futures_lite::future::block_on;

use seatheat::app::state::{HeatingLevel, Intensity, SeatLifecycle, Seat};
use seatheat::control::ControlTask;
use seatheat::diagnostics::{DiagnosticsEntry, DiagnosticsTask};
use seatheat::display::PresentationTask;
use seatheat::drivers::buttons::ButtonTask;
use seatheat::drivers::heater::ActuationTask;
use seatheat::sensors::{SampleOutcome, SeatSampler};

use crate::mock_hw::{MockSensor, RecordingActuator, console_text, controller};

#[test]
fn high_sample_faults_seat_and_queues_entry() {
    let ctl = controller();
    let sensor = MockSensor::new(40);
    ctl.press(Seat::Driver);
    block_on(ButtonTask::new(&ctl).cycle());

    let outcome = block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());
    let SampleOutcome::Faulted(entry) = outcome else {
        panic!("expected a fault, got {outcome:?}");
    };
    assert_eq!(entry.seat, Seat::Driver);
    assert_eq!(entry.level, HeatingLevel::Low);

    assert_eq!(ctl.state.seat(Seat::Driver).lifecycle(), SeatLifecycle::Faulted);
    assert_eq!(ctl.readings.try_take(), None);
    assert_eq!(ctl.state.seat(Seat::Driver).temperature(), 0);
    assert_eq!(ctl.faults.try_receive().ok(), Some(entry));
}

#[test]
fn low_sample_faults_but_band_floor_is_accepted() {
    let ctl = controller();
    let sensor = MockSensor::new(5);
    let sampler = SeatSampler::new(Seat::Passenger, &ctl, &sensor);

    assert!(matches!(block_on(sampler.cycle()), SampleOutcome::Published(_)));
    block_on(PresentationTask::new(&ctl).cycle());

    assert_eq!(ctl.readings.try_take().map(|r| r.temperature), Some(5));

    sensor.set(4);
    assert!(matches!(block_on(sampler.cycle()), SampleOutcome::Faulted(_)));
    // The rejected sample never reaches the record or the control task.
    assert_eq!(ctl.state.seat(Seat::Passenger).temperature(), 5);
    assert_eq!(ctl.readings.try_take(), None);
    assert!(ctl.state.seat(Seat::Passenger).is_faulted());
    assert!(!ctl.state.seat(Seat::Driver).is_faulted());
}

#[test]
fn diagnostics_prints_queued_fault() {
    let ctl = controller();
    let sensor = MockSensor::new(55);
    block_on(SeatSampler::new(Seat::Passenger, &ctl, &sensor).cycle());

    let mut diagnostics: DiagnosticsTask<'_, String> = DiagnosticsTask::new(&ctl);
    let printed = block_on(diagnostics.cycle());
    assert_eq!(printed.map(|e| e.seat), Some(Seat::Passenger));
    assert_eq!(diagnostics.log().len(), 1);
    assert_eq!(diagnostics.log().write_index(), 1);

    let text = console_text(&ctl);
    assert!(text.contains("Temperature Sensor Disabled:"), "{text}");
    assert!(text.contains("Passenger\t\t0"), "{text}");
}

#[test]
fn faulted_seat_is_forced_to_disabled() {
    let ctl = controller();
    let sensor = MockSensor::new(10);
    ctl.press(Seat::Driver);
    ctl.press(Seat::Driver);
    ctl.press(Seat::Driver);
    let buttons = ButtonTask::new(&ctl);
    // A single wake consumes all three presses as one edge.
    block_on(buttons.cycle());
    assert_eq!(ctl.state.seat(Seat::Driver).level(), HeatingLevel::Low);

    let sampler = SeatSampler::new(Seat::Driver, &ctl, &sensor);
    block_on(sampler.cycle());
    let mut control = ControlTask::new(&ctl);
    assert_eq!(control.cycle(), Some(Intensity::High));

    block_on(PresentationTask::new(&ctl).cycle());
    sensor.set(99);
    block_on(sampler.cycle());
    assert_eq!(control.cycle(), Some(Intensity::Disabled));
}

#[test]
fn faulted_seat_still_rendered_with_fault_marker() {
    let ctl = controller();
    let sensor = MockSensor::new(-3);
    ctl.press(Seat::Driver);
    block_on(ButtonTask::new(&ctl).cycle());
    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());

    assert!(block_on(PresentationTask::new(&ctl).cycle()));
    assert!(console_text(&ctl).contains("FAULT"));
    assert!(ctl.rotation.is_available());
}

#[test]
fn diagnostics_task_drops_entry_on_last_slot() {
    let ctl = controller();
    let mut diagnostics: DiagnosticsTask<'_, String, 2> = DiagnosticsTask::new(&ctl);
    for (ts, seat) in [(10, Seat::Driver), (20, Seat::Passenger)] {
        let entry = DiagnosticsEntry {
            timestamp_ms: ts,
            seat,
            level: HeatingLevel::Medium,
        };
        assert!(ctl.faults.try_send(entry).is_ok());
    }

    assert_eq!(block_on(diagnostics.cycle()).map(|e| e.timestamp_ms), Some(10));
    assert_eq!(block_on(diagnostics.cycle()), None);
    assert_eq!(diagnostics.log().write_index(), 0);
    assert_eq!(diagnostics.log().dropped(), 1);

    let text = console_text(&ctl);
    assert_eq!(text.matches("Temperature Sensor Disabled:").count(), 1, "{text}");
    assert!(!text.contains("Passenger"), "{text}");
}

#[test]
fn decision_for_healthy_seat_never_lands_on_faulted_focus() {
    let ctl = controller();
    let sensor = MockSensor::new(20);
    let actuator = RecordingActuator::new();
    let buttons = ButtonTask::new(&ctl);
    for _ in 0..3 {
        ctl.press(Seat::Driver);
        block_on(buttons.cycle());
    }
    assert_eq!(ctl.state.seat(Seat::Driver).level(), HeatingLevel::High);

    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());
    block_on(PresentationTask::new(&ctl).cycle());
    sensor.set(99);
    block_on(SeatSampler::new(Seat::Passenger, &ctl, &sensor).cycle());
    assert!(ctl.state.seat(Seat::Passenger).is_faulted());
    assert_eq!(ctl.state.active_seat(), Seat::Passenger);

    // Control still holds the driver's reading: desired 35, measured 20.
    let mut control = ControlTask::new(&ctl);
    assert_eq!(control.cycle(), Some(Intensity::High));

    let mut heater = ActuationTask::new(&ctl, actuator.clone());
    assert_eq!(block_on(heater.cycle()), Some((Seat::Driver, Intensity::High)));
    assert_eq!(ctl.state.seat(Seat::Driver).intensity(), Intensity::High);
    assert_eq!(ctl.state.seat(Seat::Passenger).intensity(), Intensity::Disabled);
}
