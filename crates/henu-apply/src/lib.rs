//! Team application intake for HENU OS.
//!
//! Validates "join the team" forms, stores them, and notifies the team
//! through an outbound email service. A notification failure never loses
//! a stored application.

mod application;
mod error;
mod intake;
mod notify;
mod sql;
mod store;

pub use application::{StoredApplication, TeamApplication, ValidationErrors};
pub use error::{ApplyError, NotifyError};
pub use intake::{ApplicationIntake, SubmitOutcome};
pub use notify::{EmailJsNotifier, LogNotifier, Notifier, TemplateVars};
pub use sql::SqlApplications;
pub use store::{ApplicationStore, MemoryApplications};
