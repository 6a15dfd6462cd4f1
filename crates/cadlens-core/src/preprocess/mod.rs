//! Image preparation ahead of any remote call.
//!
//! - **source**: where the drawing comes from (path or bytes)
//! - **validate**: cheap pre-decode checks (existence, size, magic bytes)
//! - **canonicalize**: decode, contrast boost, size bound, PNG re-encode

pub mod canonicalize;
pub mod source;
pub mod validate;

pub use canonicalize::{CanonicalImage, ImageCanonicalizer};
pub use source::ImageSource;
pub use validate::Validator;
