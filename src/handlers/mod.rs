pub mod capacity;
pub mod diagnostics;
pub mod health;

pub use capacity::*;
pub use diagnostics::*;
pub use health::*;
