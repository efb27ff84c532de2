pub mod bob;
pub use bob::*;
