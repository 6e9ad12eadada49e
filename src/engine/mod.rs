pub mod clock;
pub mod input;

pub use input::{InputEvent, InputState, Modifiers, PointerButton};
