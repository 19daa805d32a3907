pub mod capacity;
pub mod diagnostics;
pub mod error;
pub mod health;

pub use capacity::*;
pub use diagnostics::*;
pub use error::*;
pub use health::*;
