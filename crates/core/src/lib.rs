//! Battle-effect resolution. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod effects;
pub mod energy;
pub mod engine;
pub mod entity;
pub mod exec;
pub mod parse;
pub mod priority;
pub mod result;
pub mod rng;
pub mod status;

pub use cards::*;
pub use config::*;
pub use effects::*;
pub use energy::*;
pub use engine::*;
pub use entity::*;
pub use exec::*;
pub use parse::*;
pub use priority::*;
pub use result::*;
pub use rng::*;
pub use status::*;
