pub mod authorization;
pub mod catalog;
pub mod session;
pub mod token;
