// Accounts and sessions: password hashing, credential validation, the
// session-cookie extractor and the /api/auth handlers.

pub mod handlers;
pub mod password;
pub mod session;
pub mod validation;

pub use session::AuthContext;
