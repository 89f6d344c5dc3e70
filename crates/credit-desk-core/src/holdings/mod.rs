pub mod evaluate;
pub mod filter;
pub mod metrics;
pub mod normalize;
pub mod record;
pub mod report;
pub mod summary;
