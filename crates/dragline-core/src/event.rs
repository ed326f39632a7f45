#![forbid(unsafe_code)]

//! Pointer input samples.
//!
//! A [`PointerSample`] is the uniform payload every gesture callback carries.
//! Whatever captures raw input (a windowing backend, a browser bridge, a test
//! driver) normalizes it into this shape before handing it to the router.
//!
//! # Design Notes
//!
//! - Coordinates are client-space `f64` pixels; page coordinates are kept
//!   alongside for hosts that scroll their content.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::Point;

/// The most recent pointer position reported during a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Horizontal position relative to the viewport.
    pub client_x: f64,
    /// Vertical position relative to the viewport.
    pub client_y: f64,
    /// Horizontal position relative to the scrolled document.
    pub page_x: f64,
    /// Vertical position relative to the scrolled document.
    pub page_y: f64,
    /// Button held for this sample, if any.
    pub button: Option<PointerButton>,
    /// Modifier keys held for this sample.
    pub modifiers: Modifiers,
}

impl PointerSample {
    /// Create a sample at a client position, with page coordinates equal to
    /// client coordinates and the primary button held.
    #[must_use]
    pub const fn new(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            page_x: client_x,
            page_y: client_y,
            button: Some(PointerButton::Primary),
            modifiers: Modifiers::NONE,
        }
    }

    /// Set page coordinates.
    #[must_use]
    pub const fn with_page(mut self, page_x: f64, page_y: f64) -> Self {
        self.page_x = page_x;
        self.page_y = page_y;
        self
    }

    /// Set the held button.
    #[must_use]
    pub const fn with_button(mut self, button: Option<PointerButton>) -> Self {
        self.button = button;
        self
    }

    /// Set modifier keys.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Client position as a point.
    #[inline]
    #[must_use]
    pub const fn client(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }
}

impl From<Point> for PointerSample {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

bitflags! {
    /// Modifier keys held while a sample was taken.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, pen tip or touch contact.
    Primary,
    /// Right mouse button or pen barrel button.
    Secondary,
    /// Middle mouse button.
    Auxiliary,
}

/// Raw pointer input fed to a gesture router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed.
    Down(PointerSample),
    /// Pointer moved, pressed or not.
    Move(PointerSample),
    /// Button released.
    Up(PointerSample),
    /// The platform abandoned the interaction (focus loss, capture lost).
    Cancel,
}

impl PointerEvent {
    /// The sample carried by this event, if any.
    #[must_use]
    pub const fn sample(&self) -> Option<&PointerSample> {
        match self {
            Self::Down(s) | Self::Move(s) | Self::Up(s) => Some(s),
            Self::Cancel => None,
        }
    }
}
