pub mod session;
pub mod sweeper;
