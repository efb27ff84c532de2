pub mod components;
pub use components::*;

pub mod config;
pub use config::*;

pub mod opcodes;

pub mod script;
pub use script::*;

pub mod classify;
pub use classify::*;

pub mod split;
pub use split::*;

pub mod bpu;
pub use bpu::*;

pub mod protocols;
pub use protocols::*;
