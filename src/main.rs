// Board Input — Firmware Entry Point
//
// Boot sequence:
//   1. Initialise logging and take the peripherals.
//   2. Build the sensor hub (a missing sensor stops boot here).
//   3. Register the default gesture and button handlers. Buttons hand their
//      shared state to `Input` before they move into the button task.
//   4. Spawn the sensor and button tasks.
//   5. Run the event dispatch loop on the main thread.
//
// Nothing on the device raises gesture events yet: the LIS3DH INT1 line is
// claimed but its interrupt is not configured, so the gesture handlers only
// fire once a recogniser raises (GESTURE_ID, code). Subscribing still widens
// the accelerometer range.
//
// Host builds run the same wiring against the simulated board instead.

use std::sync::Arc;

use board_input::drivers::Platform;
use board_input::events::EventRegistry;
use board_input::{Dimension, Gesture, Input, RotationAxis};

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::thread;

    use board_input::config::*;
    use board_input::drivers::esp::{self, EspPlatform, EspTimer};
    use board_input::drivers::SystemTimer;
    use board_input::events::{BUTTON_A_ID, BUTTON_B_ID};
    use board_input::tasks;
    use board_input::Button;
    use esp_idf_hal::prelude::*;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Board input firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let events = Arc::new(EventRegistry::new());
    let timer: Arc<dyn SystemTimer> = Arc::new(EspTimer);
    let input = Arc::new(Input::new(
        EspPlatform::new(peripherals.i2c0),
        events.clone(),
        timer.clone(),
    ));
    input.hub()?;

    let now = timer.current_time_ms();
    let buttons = vec![
        Button::new(BUTTON_A_ID, esp::button_pin(PIN_BUTTON_A)?, now),
        Button::new(BUTTON_B_ID, esp::button_pin(PIN_BUTTON_B)?, now),
    ];

    // ---- Default handlers -------------------------------------------------
    for button in &buttons {
        input.attach_button(button);
    }
    register_handlers(&input, |gesture| log::info!("Gesture: {:?}", gesture))?;
    let report = Arc::clone(&input);
    input.on_button_pressed(BUTTON_A_ID, Box::new(move || log_readings(&report)));

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------
    let sensor_input = Arc::clone(&input);
    thread::Builder::new()
        .name("sensor".into())
        .stack_size(STACK_SENSOR)
        .spawn(move || tasks::sensor::sensor_task(sensor_input))?;

    let button_events = Arc::clone(&events);
    thread::Builder::new()
        .name("buttons".into())
        .stack_size(STACK_BUTTONS)
        .spawn(move || tasks::buttons::button_task(buttons, button_events, timer))?;

    // Callbacks run here, one at a time.
    events.run();
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use board_input::config::{PIN_LIGHT, PIN_TEMPERATURE};
    use board_input::events::{Event, EventSink, GESTURE_ID};
    use board_input::sim::{SimClock, SimPlatform};

    let platform = SimPlatform::new();
    let board = platform.board();
    let events = Arc::new(EventRegistry::new());
    let clock = Arc::new(SimClock::new());
    let input = Arc::new(Input::new(platform, events.clone(), clock.clone()));

    register_handlers(&input, |gesture| println!("gesture: {:?}", gesture))?;
    println!("accelerometer range: {}", input.hub()?.accelerometer_range());

    board.accelerometer().set_sample(120, -80, -1010);
    board.accelerometer().set_angles(-5, 7);
    board.set_analog(PIN_TEMPERATURE, 1900);
    board.set_analog(PIN_LIGHT, 640);
    clock.advance(2_500);
    print_readings(&input)?;

    for gesture in [Gesture::Shake, Gesture::ThreeG, Gesture::SixG] {
        events.raise(Event::new(GESTURE_ID, gesture.code()));
    }
    println!("dispatched {} handler(s)", events.dispatch_pending());
    Ok(())
}

/// Gestures every build reports through `notify`. Subscribing to the shock
/// gestures widens the accelerometer range as a side effect; the handlers
/// themselves wait on whatever raises gesture events.
fn register_handlers<P: Platform>(input: &Input<P>, notify: fn(Gesture)) -> anyhow::Result<()> {
    for gesture in [Gesture::Shake, Gesture::FreeFall, Gesture::ThreeG, Gesture::SixG] {
        input.on_gesture(gesture, Box::new(move || notify(gesture)))?;
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
fn log_readings<P: Platform>(input: &Input<P>) {
    use board_input::events::BUTTON_B_ID;

    match (
        input.acceleration(Dimension::Strength),
        input.rotation(RotationAxis::Pitch),
        input.rotation(RotationAxis::Roll),
        input.temperature(),
        input.light_level(),
    ) {
        (Ok(strength), Ok(pitch), Ok(roll), Ok(temperature), Ok(light)) => log::info!(
            "t={} ms |a|={} mg pitch={}° roll={}° {}°C light={} B={}",
            input.running_time(),
            strength,
            pitch,
            roll,
            temperature,
            light,
            if input.is_button_pressed(BUTTON_B_ID) { "down" } else { "up" }
        ),
        _ => log::error!("Sensor hub unavailable"),
    }
}

#[cfg(not(target_os = "espidf"))]
fn print_readings<P: Platform>(input: &Input<P>) -> anyhow::Result<()> {
    println!("running time: {} ms", input.running_time());
    println!(
        "acceleration: x={} y={} z={} strength={} mg",
        input.acceleration(Dimension::X)?,
        input.acceleration(Dimension::Y)?,
        input.acceleration(Dimension::Z)?,
        input.acceleration(Dimension::Strength)?
    );
    println!(
        "rotation: pitch={}° roll={}°",
        input.rotation(RotationAxis::Pitch)?,
        input.rotation(RotationAxis::Roll)?
    );
    println!("temperature: {}°C", input.temperature()?);
    println!("light level: {}", input.light_level()?);
    println!("accelerometer range: {}", input.hub()?.accelerometer_range());
    Ok(())
}
