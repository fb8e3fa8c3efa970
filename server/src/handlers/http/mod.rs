pub mod auth;
pub mod feed;
pub mod posts;
pub mod profile;
pub mod routes;
pub mod utils;

pub use routes::{Router, build_router};
