//! Domain models for the clinic patient list.

mod form;
mod patient;
mod state;

pub use form::*;
pub use patient::*;
pub use state::*;
