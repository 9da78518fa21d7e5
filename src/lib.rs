pub mod core;
pub mod features;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::ScoutConfig;

// --- Short module paths ---
pub use features::{export, session, session_store};
pub use scraping::{assemble, browser_manager, extract};
pub use tools::{harvest, scroll, triggers, Harvester};
