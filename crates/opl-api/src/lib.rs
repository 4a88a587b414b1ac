//! OPL API Library
//!
//! HTTP surface of the report service: the `/submit` and `/health` handlers,
//! error-to-response mapping, application setup and telemetry.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;
