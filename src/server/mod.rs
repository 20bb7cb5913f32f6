//! Server module exposing the board over HTTP
//!
//! A thin JSON surface: every list endpoint accepts [`ViewQuery`] parameters
//! and answers with a [`ViewResult`] computed by the list-view engine.
//!
//! [`ViewQuery`]: crate::core::ViewQuery
//! [`ViewResult`]: crate::core::ViewResult

pub mod builder;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::{AppState, ViewSlot, Views};
