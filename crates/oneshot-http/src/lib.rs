//! Fluent single-use HTTP request builder.
//!
//! Each [`RequestBuilder`] issues exactly one blocking HTTP request:
//! configure it with chained setters, fire one verb method, and read the
//! normalized [`Outcome`]. HTTP-level errors (4xx/5xx) are ordinary outcomes
//! carrying their status code; only transport-level failures (DNS, connect,
//! TLS, timeout) set the outcome's error fields.
//!
//! The verb methods consume the builder, so every request gets a fresh
//! instance and the underlying transport handle is released when the call
//! returns.
//!
//! # Example
//!
//! ```no_run
//! use oneshot_http::RequestBuilder;
//!
//! let outcome = RequestBuilder::new()
//!     .base_url("https://api.example.com")
//!     .route("/v1/things")
//!     .user_agent("example/1.0")
//!     .get();
//!
//! if outcome.has_err() {
//!     eprintln!("transfer failed ({}): {}", outcome.err_no(), outcome.err_msg());
//! } else if let Some(data) = &outcome.data {
//!     println!("{}: {}", outcome.status.unwrap_or_default(), data);
//! }
//! ```

mod builder;
mod error;
mod outcome;

pub use builder::RequestBuilder;
pub use error::TransportError;
pub use outcome::{Outcome, TransferInfo};
