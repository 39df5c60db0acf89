pub mod cell;
pub mod grid;

pub use cell::Cell;
pub use grid::{NormalizedTable, RawTable};
