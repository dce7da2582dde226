//! Cache module for saved web service responses
//!
//! Responses are stored verbatim, one plain-text file per (route, stop) pair,
//! so a later offline run can replay them instead of calling the service.

mod replay;

pub use replay::{CacheError, ResponseCache};
