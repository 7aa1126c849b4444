//! Network collaborators.
//!
//! The core never talks to the network itself. [`RateFeed`] supplies the
//! exchange-rate document and [`PollTransport`] carries signed poll
//! requests. [`HttpTransport`] implements both over HTTPS when the
//! `http-client` feature is enabled (the default):
//!
//! ```toml
//! [dependencies]
//! etn-vendor = { version = "1.0", default-features = false }  # core only
//! ```

#[cfg(feature = "http-client")]
mod http;
mod traits;

#[cfg(feature = "http-client")]
pub use http::HttpTransport;
pub use traits::{PollTransport, RateFeed};
