// Board Input — Sensor Task
//
// Keeps the accelerometer's cached sample fresh at ~62.5 Hz so metric reads
// and gesture recognition see current data.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::*;
use crate::drivers::Platform;
use crate::hub::SensorHub;
use crate::input::Input;

/// One sampling step. Returns `false` if the read failed.
pub fn sample<P: Platform>(hub: &SensorHub<P>) -> bool {
    match hub.refresh() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Accelerometer read error: {}", e);
            false
        }
    }
}

pub fn sensor_task<P: Platform>(input: Arc<Input<P>>) {
    log::info!("Sensor task started");

    let hub = match input.hub() {
        Ok(hub) => hub,
        Err(e) => {
            log::error!("Sensor hub unavailable in sensor task: {:#}", e);
            return;
        }
    };

    let interval = Duration::from_millis(SENSOR_SAMPLE_INTERVAL_MS);

    loop {
        let tick_start = Instant::now();

        sample(hub);

        // Sleep for the remainder of the sampling interval to maintain ~62.5 Hz.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
