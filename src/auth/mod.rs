mod password;
mod session;
mod user;
pub mod action;
pub mod cookie;
pub mod middleware;

pub use action::{AuthMode, AuthOutcome, AuthService, Credentials, FieldErrors};
pub use cookie::SESSION_COOKIE;
pub use middleware::require_session;
pub use password::{hash_password, verify_password};
pub use session::{Session, SessionStore};
pub use user::{User, UserStore};
