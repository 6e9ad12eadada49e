pub mod prefabs;
pub mod studio;

pub use studio::{load_studio_scene, Studio};
