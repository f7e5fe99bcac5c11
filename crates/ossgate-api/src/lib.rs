//! ossgate API Library
//!
//! HTTP handlers, the upload service and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::ErrorResponse;
pub use services::upload::{UploadService, UploadedFile};
