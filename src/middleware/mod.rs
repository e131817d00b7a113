pub mod error_handler;
pub mod request_id;

pub use request_id::{RequestId, RequestIdMiddleware};
