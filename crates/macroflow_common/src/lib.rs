//! Shared foundational types used across the macroflow workspace.
//!
//! Content hashing for emitted sources and build artifacts, interned HDL
//! identifiers, clock periods for timing constraints, and the internal error
//! type used for bugs rather than user mistakes.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod period;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use period::{ClockPeriod, ParsePeriodError};
pub use result::{InternalError, MacroflowResult};
