//! # Quill Shared
//!
//! Types crossing the server/renderer boundary: the form payloads the
//! browser submits and the page payloads handlers hand to the
//! rendering frontend.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
