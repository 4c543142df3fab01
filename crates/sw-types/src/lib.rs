pub mod inventory;
pub mod window;
pub mod config;
pub mod errors;

pub use inventory::*;
pub use window::*;
pub use config::*;
pub use errors::*;
