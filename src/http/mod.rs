//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the handlers: response builders, MIME
//! detection for served files, urlencoded decoding, and cookie parsing.

pub mod cookie;
pub mod form;
pub mod mime;
pub mod response;

pub use response::{
    build_404_response, build_405_response, build_413_response, build_500_response,
    build_file_response, build_json_response, build_options_response, build_text_response,
};
