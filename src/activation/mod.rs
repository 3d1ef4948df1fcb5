//! Lazy activation of diagrams as they approach the viewport.
//!
//! The host-independent pieces ([`registry`], [`viewport`], [`resize`] and
//! [`lifecycle`]) hold all decisions and are tested natively. [`engine`] and
//! [`scheduler`] bind them to the browser.

mod engine;
pub mod lifecycle;
pub mod registry;
pub mod resize;
pub mod scheduler;
pub mod viewport;

pub use engine::DiagramEngine;
pub use lifecycle::DiagramLifecycle;
pub use registry::{Activation, ActivationRegistry};
