//! Single-cycle tests of the healthy pipeline: button → sampler → control
//! → actuation → display.

use std::pin::pin;
use std::task::{Context, Poll, Waker};

use futures_lite::future::{block_on, poll_once};

use seatheat::app::ports::HeaterOutputs;
use seatheat::app::state::{HeatingLevel, Intensity, Seat};
use seatheat::control::ControlTask;
use seatheat::display::PresentationTask;
use seatheat::drivers::buttons::ButtonTask;
use seatheat::drivers::heater::ActuationTask;
use seatheat::sensors::{Reading, SampleOutcome, SeatSampler};
use seatheat::telemetry::{TaskId, TelemetryTask};

use crate::mock_hw::{MockSensor, RecordingActuator, console_text, controller};

// ── Buttons ───────────────────────────────────────────────────

#[test]
fn button_press_cycles_level_and_wraps() {
    let ctl = controller();
    let task = ButtonTask::new(&ctl);

    let expected = [
        HeatingLevel::Low,
        HeatingLevel::Medium,
        HeatingLevel::High,
        HeatingLevel::Off,
    ];
    for level in expected {
        ctl.press(Seat::Driver);
        let changed = block_on(task.cycle());
        assert_eq!(changed.as_slice(), &[(Seat::Driver, level)]);
    }
    assert_eq!(ctl.state.seat(Seat::Passenger).level(), HeatingLevel::Off);
}

#[test]
fn simultaneous_presses_advance_both_seats() {
    let ctl = controller();
    ctl.press(Seat::Driver);
    ctl.press(Seat::Passenger);

    let changed = block_on(ButtonTask::new(&ctl).cycle());
    assert_eq!(changed.len(), 2);
    assert_eq!(ctl.state.seat(Seat::Driver).level(), HeatingLevel::Low);
    assert_eq!(ctl.state.seat(Seat::Passenger).level(), HeatingLevel::Low);
}

// ── Samplers and the rotation token ───────────────────────────

#[test]
fn sampler_publishes_reading_and_keeps_token() {
    let ctl = controller();
    let sensor = MockSensor::new(22);
    let sampler = SeatSampler::new(Seat::Passenger, &ctl, &sensor);

    let outcome = block_on(sampler.cycle());
    let reading = Reading {
        seat: Seat::Passenger,
        temperature: 22,
    };
    assert_eq!(outcome, SampleOutcome::Published(reading));
    assert_eq!(ctl.state.active_seat(), Seat::Passenger);
    assert_eq!(ctl.state.seat(Seat::Passenger).temperature(), 22);
    assert_eq!(ctl.readings.try_take(), Some(reading));
    assert_eq!(ctl.rotation.outstanding(), 1);
    assert!(!ctl.rotation.is_available());
}

#[test]
fn second_sampler_waits_until_display_releases() {
    let ctl = controller();
    let sensor = MockSensor::new(20);
    let driver = SeatSampler::new(Seat::Driver, &ctl, &sensor);
    let passenger = SeatSampler::new(Seat::Passenger, &ctl, &sensor);
    let display = PresentationTask::new(&ctl);

    block_on(driver.cycle());
    assert!(block_on(poll_once(passenger.cycle())).is_none());
    assert_eq!(sensor.samples(), 1);

    block_on(display.cycle());
    assert!(block_on(poll_once(passenger.cycle())).is_some());
    assert_eq!(sensor.samples(), 2);
    assert_eq!(ctl.state.active_seat(), Seat::Passenger);
}

#[test]
fn token_balances_over_many_rotations() {
    let ctl = controller();
    let sensor = MockSensor::new(30);
    let display = PresentationTask::new(&ctl);
    let samplers = Seat::ALL.map(|seat| SeatSampler::new(seat, &ctl, &sensor));

    for _ in 0..25 {
        for sampler in &samplers {
            block_on(sampler.cycle());
            assert_eq!(ctl.rotation.outstanding(), 1);
            block_on(display.cycle());
            assert_eq!(ctl.rotation.outstanding(), 0);
        }
    }
    assert_eq!(ctl.rotation.acquired(), 50);
    assert_eq!(ctl.rotation.released(), 50);
    assert!(ctl.rotation.is_available());
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn display_skips_idle_seat_but_still_releases() {
    let ctl = controller();
    let sensor = MockSensor::new(20);
    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());

    let rendered = block_on(PresentationTask::new(&ctl).cycle());
    assert!(!rendered);
    assert!(console_text(&ctl).is_empty());
    assert!(ctl.rotation.is_available());
}

#[test]
fn display_renders_heating_seat() {
    let ctl = controller();
    let sensor = MockSensor::new(18);
    ctl.press(Seat::Driver);
    block_on(ButtonTask::new(&ctl).cycle());
    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());

    assert!(block_on(PresentationTask::new(&ctl).cycle()));
    let text = console_text(&ctl);
    assert!(text.contains("Seat:"), "{text}");
    assert!(text.contains("Driver\t\t18\t\t1\t\tDISABLED"), "{text}");
}

#[test]
fn release_without_holder_is_refused() {
    let ctl = controller();
    block_on(PresentationTask::new(&ctl).cycle());
    block_on(PresentationTask::new(&ctl).cycle());
    assert_eq!(ctl.rotation.released(), 0);
    assert!(ctl.rotation.try_acquire());
    assert!(!ctl.rotation.try_acquire());
}

// ── Control and actuation ─────────────────────────────────────

#[test]
fn control_without_reading_raises_nothing() {
    let ctl = controller();
    let mut control = ControlTask::new(&ctl);
    assert_eq!(control.cycle(), None);
    assert_eq!(ctl.heating.pending(), 0);
}

#[test]
fn reading_flows_through_control_to_heater() {
    let ctl = controller();
    let sensor = MockSensor::new(20);
    let actuator = RecordingActuator::new();

    // Level Low: desired 25, measured 20, difference 5.
    ctl.press(Seat::Driver);
    block_on(ButtonTask::new(&ctl).cycle());
    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());

    let mut control = ControlTask::new(&ctl);
    assert_eq!(control.cycle(), Some(Intensity::Medium));

    let mut heater = ActuationTask::new(&ctl, actuator.clone());
    assert_eq!(
        block_on(heater.cycle()),
        Some((Seat::Driver, Intensity::Medium))
    );
    assert_eq!(ctl.state.seat(Seat::Driver).intensity(), Intensity::Medium);
    assert_eq!(
        actuator.last(),
        Some(HeaterOutputs {
            green: true,
            blue: true,
            red: false,
        })
    );
}

#[test]
fn control_reuses_cached_reading() {
    let ctl = controller();
    let sensor = MockSensor::new(10);
    let buttons = ButtonTask::new(&ctl);
    for _ in 0..2 {
        ctl.press(Seat::Passenger);
        block_on(buttons.cycle());
    }
    block_on(SeatSampler::new(Seat::Passenger, &ctl, &sensor).cycle());

    // Level Medium: desired 30, measured 10.
    let mut control = ControlTask::new(&ctl);
    assert_eq!(control.cycle(), Some(Intensity::High));
    assert_eq!(control.cycle(), Some(Intensity::High));
    assert_eq!(
        control.latest().map(|r| r.seat),
        Some(Seat::Passenger)
    );
}

#[test]
fn pending_decisions_collapse_to_highest_priority() {
    let ctl = controller();
    let actuator = RecordingActuator::new();
    ctl.heating.set(seatheat::events::HIGH_INTENSITY);
    ctl.heating.set(seatheat::events::DISABLED_INTENSITY);

    let mut heater = ActuationTask::new(&ctl, actuator.clone());
    assert_eq!(
        block_on(heater.cycle()).map(|(_, i)| i),
        Some(Intensity::Disabled)
    );
    assert_eq!(ctl.heating.pending(), 0);
    assert_eq!(actuator.calls(), vec![HeaterOutputs::OFF]);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_prints_load_report() {
    let ctl = controller();
    let sensor = MockSensor::new(20);
    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());
    block_on(PresentationTask::new(&ctl).cycle());

    let report = block_on(TelemetryTask::new(&ctl).cycle());
    assert_eq!(report.rows.len(), seatheat::telemetry::TASK_COUNT);
    assert!(report.load_percent <= 100);

    let text = console_text(&ctl);
    assert!(text.contains("DriverSampler"), "{text}");
    assert!(text.contains("CPU load is"), "{text}");
}

#[test]
fn console_wait_is_not_counted_as_execution() {
    let ctl = controller();
    let sensor = MockSensor::new(20);
    ctl.press(Seat::Driver);
    block_on(ButtonTask::new(&ctl).cycle());
    block_on(SeatSampler::new(Seat::Driver, &ctl, &sensor).cycle());

    let display = PresentationTask::new(&ctl);
    let mut cx = Context::from_waker(Waker::noop());
    let guard = ctl.console.try_lock().ok();
    assert!(guard.is_some());

    let mut refresh = pin!(display.cycle());
    assert!(refresh.as_mut().poll(&mut cx).is_pending());
    std::thread::sleep(std::time::Duration::from_millis(30));
    drop(guard);
    assert_eq!(refresh.as_mut().poll(&mut cx), Poll::Ready(true));

    let figures = ctl.timings.figures(TaskId::Presentation);
    assert!(figures.last_exec_us < 30_000, "{figures:?}");
    assert!(figures.lock_held_us.is_some_and(|held| held >= 30_000), "{figures:?}");
}
