//! Model ↔ entity mappers
//!
//! Rows store enums as text and money as raw centavos, so the conversions
//! that touch those fields are fallible (`TryFrom`); a failure means a
//! corrupt row, surfaced as a database error.

mod appointment;
mod conversation;
mod message;
mod payment_session;
mod quote;

pub use quote::corrupt_row;
