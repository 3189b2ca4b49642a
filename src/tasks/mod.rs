pub mod buttons;
pub mod sensor;
