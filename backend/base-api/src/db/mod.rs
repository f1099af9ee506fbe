pub mod revocation;
pub mod users;

pub use revocation::PgRevocationStore;
