pub mod credentials;
pub mod payload;
pub mod ports;
pub mod purchase;
