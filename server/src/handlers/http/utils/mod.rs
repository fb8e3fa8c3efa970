pub mod form;
pub mod http;
pub mod json_response;

// Re-export commonly used utilities
pub use self::form::*;
pub use self::http::*;
pub use self::json_response::*;
