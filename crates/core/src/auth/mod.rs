//! Authentication: credential verification, session tokens and the login
//! and logout flows.

pub mod password;
pub mod service;
pub mod token;

pub use password::verify_password;
pub use service::AuthService;
pub use token::TokenIssuer;
