pub mod login;
pub mod logout;
pub mod session;
pub mod signup;

// Re-export main handlers
pub use login::handle_login;
pub use logout::handle_logout;
pub use session::handle_session;
pub use signup::handle_signup;
