//! Request encoding: percent-encoding, query strings and request bodies.
//!
//! - [`percent`] - component encode/decode bound to a text encoding
//! - [`query`] - URL construction from parameters, non-ASCII query guard
//! - [`form`] - `application/x-www-form-urlencoded` bodies
//! - [`multipart`] - `multipart/form-data` bodies with file attachments

mod error;
pub mod form;
pub mod multipart;
mod params;
pub mod percent;
pub mod query;

pub use error::EncodeError;
pub use form::encode_form;
pub use multipart::{MultipartBody, MultipartReader, boundary_from_millis};
pub use params::{FormData, ParamValue};
pub use percent::PercentCodec;
pub use query::{build_url, build_url_sorted, encode_non_ascii_query};
