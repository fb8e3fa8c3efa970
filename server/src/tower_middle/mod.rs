/// Tower middleware wrapped around every connection's service.
pub mod tower_request_log;
pub mod tower_timeout_handler;

pub use tower_request_log::{RequestLogLayer, RequestLogService};
pub use tower_timeout_handler::{TimeoutLayer, TimeoutService};
