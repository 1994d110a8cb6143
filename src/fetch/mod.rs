//! Transport layer: the [`HttpClient`] seam, its `reqwest` implementation and
//! the interceptor wrapper every service request goes through.

mod basic;
mod client;
mod interceptor;
#[cfg(test)]
pub(crate) mod testing;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use interceptor::{Intercepted, Interceptor, LoggingInterceptor};
