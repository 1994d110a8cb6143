//! The storefront API client and the request pieces it is built from.

pub mod base_service;
pub mod form;
pub mod params;

pub use base_service::{BaseService, RequestBody, RequestOptions};
pub use form::{Attachment, FormData, FormField};
pub use params::{ParamValue, Params};
