pub mod search;
pub mod session;
pub mod stats;
pub mod user;
