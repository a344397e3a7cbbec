//! Interface definitions for executing composed requests.
//!
//! Issuing the request is left to integrators: implement `SearchExecutor`
//! against whatever transport is in use and pass it to
//! `SearchRequest::execute`.

mod search_executor;

pub use search_executor::SearchExecutor;
