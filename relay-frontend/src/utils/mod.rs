pub mod credentials;
pub mod payload;
