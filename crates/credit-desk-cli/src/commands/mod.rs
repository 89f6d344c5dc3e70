pub mod holdings;
pub mod recovery;
