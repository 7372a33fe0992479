//! # Triple Model
//!
//! Clean DTOs for the data the ordering engine reads and writes.
//! These types cross every boundary: store ↔ accessor ↔ mutator ↔ caller.
//!
//! Design rule: this module is pure data. It does no I/O and holds no state or locks.

pub mod term;
pub mod statement;
pub mod order;
pub mod vocab;

pub use term::{Term, Literal};
pub use statement::{Statement, Pattern};
pub use order::Order;
pub use vocab::Vocabulary;
