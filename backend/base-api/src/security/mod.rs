pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::AuthedUser;
pub use jwt::JwtCodec;
