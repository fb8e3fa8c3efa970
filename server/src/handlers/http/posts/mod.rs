pub mod actions;
pub mod list;

pub use actions::{handle_add_post, handle_delete_post, handle_update_post};
pub use list::{handle_get_post, handle_list_posts};

use hyper::StatusCode;

use crate::backend::BackendError;

/// Status for a failed backend call: the backend's own 4xx passes through,
/// everything else is a bad gateway.
pub(crate) fn status_for(e: &BackendError) -> StatusCode {
    e.status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .filter(StatusCode::is_client_error)
        .unwrap_or(StatusCode::BAD_GATEWAY)
}
