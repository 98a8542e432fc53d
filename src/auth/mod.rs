mod claims;
mod jwt;

pub use claims::{Claims, DEFAULT_ORGANIZATION_ID};
pub use jwt::JwtValidator;
