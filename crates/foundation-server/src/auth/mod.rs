mod jwt;
mod lockout;
mod middleware;
mod password;

pub use jwt::{create_session_token, verify_session_token, Claims};
pub use lockout::LockoutPolicy;
pub use middleware::{auth_middleware, session_cookie, token_from_headers, AuthUser, SESSION_COOKIE};
pub use password::{hash_password, verify_password, verify_unknown_account};
