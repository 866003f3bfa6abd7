pub mod cell;
pub mod value;

pub use cell::*;
pub use value::*;
