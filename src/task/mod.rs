//! Tasks that make up the firmware as well as the resources they use.
pub mod buttons;
pub mod display;
pub mod orchestrate;
pub mod peripherals;
pub mod resources;
pub mod storage;
pub mod voltage;
