use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
}

/// Host-agnostic input event delivered to the placement controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { position: DVec2, modifiers: Modifiers },
    ButtonPressed(PointerButton),
    ButtonReleased(PointerButton),
    /// Escape key or an equivalent host cancel.
    Cancel,
}

/// Accumulated pointer state across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub pointer: DVec2,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, event: &InputEvent) {
        if let InputEvent::PointerMoved {
            position,
            modifiers,
        } = *event
        {
            self.pointer = position;
            self.modifiers = modifiers;
        }
    }
}
