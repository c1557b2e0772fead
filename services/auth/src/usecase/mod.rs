pub mod account;
pub mod code;
pub mod password;
pub mod sweep;
pub mod token;
