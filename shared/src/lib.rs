//! Wire types and configuration shared by the music history server and its
//! tests.

pub mod config;
pub mod types;
