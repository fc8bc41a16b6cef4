//! Terminal UI components.

pub mod components;
