pub mod error_handling;
pub mod logging;

pub use logging::Logging;
