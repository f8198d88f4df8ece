//! Orchestration layer: the workbench that binds tabs, frames and the
//! request pipeline together, plus the frame bus and request coordinator
//! it is built from.

pub mod bus;
pub mod coordinator;
pub mod workbench;

pub use bus::{ChildMessage, FrameBus, ParentMessage, ResultPayload};
pub use coordinator::{Rejection, RequestCoordinator, SubmissionTicket};
pub use workbench::{Completion, RoutedOutcome, Workbench};
