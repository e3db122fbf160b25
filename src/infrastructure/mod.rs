pub mod credentials;
pub mod record_store;
pub mod seed;
