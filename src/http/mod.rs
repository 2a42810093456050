//! HTTP protocol layer module
//!
//! MIME lookup and response builders, independent of routing decisions.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_413_response, build_500_response, build_502_response,
    build_504_response, build_file_response,
};
