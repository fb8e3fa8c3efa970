pub mod action;
pub mod jwt;
pub mod list;
pub mod login;
pub mod post;
pub mod server_config;
pub mod session;
pub mod signup;
pub mod timestamp;
pub mod user;

pub use self::action::ActionResponse;
pub use self::jwt::TokenClaims;
pub use self::list::ListResult;
pub use self::login::{LoginData, LoginError};
pub use self::post::{MusicPost, Platform, PostDraft};
pub use self::session::{AuthPayload, AuthResponse};
pub use self::signup::{SignupData, SignupError};
pub use self::user::UserRecord;
