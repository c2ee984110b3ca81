pub mod dispatch;
pub mod dom;
pub mod extractors;
pub mod gateway;
pub mod models;
pub mod overlay;
pub mod registry;
pub mod reinject;
pub mod storage;
