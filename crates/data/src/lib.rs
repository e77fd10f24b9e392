//! Card corpus loading, engine config loading and bulk parser coverage.

pub mod classify;
pub mod load;
pub mod report;

pub use classify::*;
pub use load::*;
pub use report::*;
