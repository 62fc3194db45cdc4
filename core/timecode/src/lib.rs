pub mod position;

pub use position::{InvalidTime, Position};
