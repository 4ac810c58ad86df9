//! HENU OS download server library.
//!
//! Exposes the HTTP API over the entitlement engine and the team
//! application intake, for the binaries and integration tests.

mod auth;
pub mod cli;
mod error;
mod routes;
mod server;
mod sessions;
mod state;

pub use auth::Session;
pub use cli::ServerArgs;
pub use error::{ApiError, ServerError};
pub use routes::router;
pub use sessions::{IssuedToken, SessionTokens};
pub use server::{DEFAULT_SHUTDOWN_TIMEOUT, run, run_with_shutdown, serve};
pub use state::{
    AccountSync, AppState, Engine, Intake, SharedAccounts, SharedClock, SharedLedger, Stores,
    open_stores,
};
pub use tokio_util::sync::CancellationToken;
