// Profile, stored provider credential, and dashboard statistics.

pub mod activity;
pub mod handlers;
