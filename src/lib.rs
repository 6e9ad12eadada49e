pub mod camera;
pub mod components;
pub mod config;
pub mod controller;
pub mod engine;
pub mod fsm;
pub mod math;
pub mod scene;
pub mod solar;
pub mod systems;

pub use controller::{LightPlacementController, PoseUpdate, Session};
pub use solar::{sun_position, SolarParameters, SunPosition};
