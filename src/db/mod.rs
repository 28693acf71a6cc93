pub mod connection;
pub mod storage;
pub mod store;
