pub mod config;
pub mod draft;
pub mod error;
pub mod gate;
pub mod navigation;
pub mod options;
pub mod order;
pub mod range;
pub mod requirements;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod utils;
pub mod validation;
