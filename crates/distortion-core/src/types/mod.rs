mod field;
mod grid;
mod model;

pub use field::*;
pub use grid::*;
pub use model::*;
