pub mod harvest;
pub mod scroll;
pub mod triggers;

pub use harvest::Harvester;
