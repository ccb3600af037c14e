//! Resilience helpers for calls that leave the process.
//!
//! Only deadline enforcement lives here: every external call made by the
//! relay is wrapped in [`with_timeout_result`] so that a slow dependency can
//! stall at most the caller that is waiting on it.
//!
//! ```rust,no_run
//! use resilience::with_timeout_result;
//! use std::time::Duration;
//!
//! # async fn call() -> Result<u8, std::io::Error> { Ok(1) }
//! #[tokio::main]
//! async fn main() {
//!     let outcome = with_timeout_result(Duration::from_millis(250), call()).await;
//!     assert!(outcome.is_ok());
//! }
//! ```

pub mod timeout;

pub use timeout::{with_timeout_result, TimeoutError};
