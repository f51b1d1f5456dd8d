pub mod jwt;
pub mod validation;
