//! Domain layer for Parsel: tabs, modes, conversation histories and the
//! shared configuration and error types. No I/O lives here; the
//! interaction and application crates build on these types.

pub mod config;
pub mod error;
pub mod page;
pub mod session;
pub mod tab;

// Re-export common types
pub use config::ParselConfig;
pub use error::{ParselError, Result};
pub use page::PageKind;
