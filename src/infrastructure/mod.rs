pub mod cache;
pub mod events;
pub mod remote;
pub mod storage;
