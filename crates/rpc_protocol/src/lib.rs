//! Request and response definitions for the Rollcall HTTP API
//!
//! Every endpoint takes a JSON request body and returns a JSON response body.
//! Failures use the envelope in [`ErrorResponse`] with a code from
//! [`error_codes`].

mod error;
pub mod requests;
pub mod responses;
mod types;

pub use error::*;
pub use types::*;
