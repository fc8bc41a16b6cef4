//! Event handling for the application.
//!
//! This module handles keyboard input, terminal resizes, and the focus
//! signal used to dismiss the picker when the terminal loses focus.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// An event delivered to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Terminal was resized to (width, height).
    Resize(u16, u16),
    /// The terminal lost focus. The picker treats this as its
    /// "dismiss now" boundary signal.
    FocusLost,
    /// No event occurred within the tick rate.
    Tick,
}
