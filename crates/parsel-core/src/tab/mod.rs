//! Tab domain module.
//!
//! # Module Structure
//!
//! - `model`: tab entity and its mode (`Tab`, `TabId`, `TabMode`)
//! - `registry`: ordered tab collection with the active pointer
//! - `mode`: `Editing ⇄ Parsing` transitions and file-context truncation

pub mod mode;
mod model;
mod registry;

pub use model::{Tab, TabId, TabMode};
pub use registry::TabRegistry;
