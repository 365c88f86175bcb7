pub mod checker;
pub mod insight;
pub mod metrics;
pub mod registry;
pub mod storage;
