//! Session core: identity, lifecycle state, observers and the controller.
//!
//! The public API from this module is [`TaskController`] (with its builder),
//! the [`TaskState`] machine, the [`StateListener`] observer trait and the
//! [`OutputSink`] console.
//!
//! Internal modules:
//! - [`controller`]: the session and its engine link;
//! - [`state`]: lifecycle enum and its lock-free cell;
//! - [`listeners`]: identity-unique listener sets and panic-isolated fan-out;
//! - [`output`]: shared console sink;
//! - [`builder`]: collaborator wiring.

mod builder;
mod controller;
mod listeners;
mod output;
mod state;
mod task_id;

pub use builder::TaskControllerBuilder;
pub use controller::TaskController;
pub use listeners::StateListener;
pub use output::OutputSink;
pub use state::TaskState;
pub use task_id::TaskId;
