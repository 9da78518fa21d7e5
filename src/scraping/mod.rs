pub mod assemble;
pub mod browser_manager;
pub mod dom;
pub mod extract;
pub mod rules;
pub mod surface;
pub mod wait;
