//! # Grapevine Engine
//!
//! Drives the gameplay core frame by frame:
//! - Configuration file (rules, templates, heroes, spawn groups)
//! - Tracing setup
//! - Frame pacing
//! - Sprite naming and a bounded sprite cache
//! - The session loop tying input, roster and presentation together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod logging;
pub mod session;
pub mod sprites;
pub mod timing;

mod e2e_tests;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::logging::*;
    pub use crate::session::*;
    pub use crate::sprites::*;
    pub use crate::timing::*;
}

pub use prelude::*;
