use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::Extent;
use crate::interaction::InteractionState;

bitflags! {
    /// Pressed mouse buttons, as in the DOM `MouseEvent.buttons` mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 1;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

impl MouseButtons {
    /// Buttons that start drag-zoom or pan.
    pub const PRIMARY: Self = Self::LEFT.union(Self::MIDDLE);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
        ctrl: false,
        meta: false,
    };

    #[must_use]
    pub const fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    #[must_use]
    pub const fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    #[must_use]
    pub const fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Shift or alt turns a drag into a pan.
    #[must_use]
    pub fn is_pan_modifier(self) -> bool {
        self.shift || self.alt
    }
}

/// Pointer event in overlay-local CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseEvent {
    pub offset_x: f64,
    pub offset_y: f64,
    pub movement_x: f64,
    pub movement_y: f64,
    pub buttons: MouseButtons,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    #[must_use]
    pub fn at(offset_x: f64, offset_y: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_buttons(mut self, buttons: MouseButtons) -> Self {
        self.buttons = buttons;
        self
    }

    #[must_use]
    pub fn with_movement(mut self, movement_x: f64, movement_y: f64) -> Self {
        self.movement_x = movement_x;
        self.movement_y = movement_y;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Unit of `WheelEvent::delta_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Approximate pixels per unit.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Pixel => 1.0,
            Self::Line => 8.0,
            Self::Page => 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelEvent {
    pub offset_x: f64,
    pub offset_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_mode: DeltaMode,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    #[must_use]
    pub fn at(offset_x: f64, offset_y: f64, delta_y: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            delta_y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delta_mode(mut self, delta_mode: DeltaMode) -> Self {
        self.delta_mode = delta_mode;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Output of the interaction overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// The user asked for a new view box, in data coordinates.
    ViewExtentChanged { data_extent: Extent },
    /// The user asked to return to the automatic view box.
    ViewExtentReset,
    StateChanged(InteractionState),
}
