pub mod events;
pub use events::*;

pub mod config;
pub use config::*;

pub mod epoch_root;
pub use epoch_root::*;

pub mod receipt;
pub use receipt::*;
