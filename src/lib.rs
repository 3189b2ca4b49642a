// Board Input — Library Root
//
// On-board sensing for a small microcontroller board: a 3-axis accelerometer,
// a thermistor and a light sensor, plus its buttons. `Input` is the entry
// point; it builds the `SensorHub` on first use and forwards gesture and
// button subscriptions to an `EventBus`.

pub mod config;
pub mod drivers;
pub mod events;
pub mod gesture;
pub mod hub;
pub mod input;
pub mod metrics;
pub mod sim;
pub mod tasks;

pub use drivers::button::{Button, ButtonState};
pub use events::{EventBus, EventRegistry, Handler};
pub use gesture::Gesture;
pub use hub::SensorHub;
pub use input::Input;
pub use metrics::{Dimension, RotationAxis, SensingRange};
