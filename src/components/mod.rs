//! UI components.

pub mod diagram;
