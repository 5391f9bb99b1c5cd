pub mod error;
pub mod header;
pub mod marker;

pub use error::*;
pub use header::*;
pub use marker::*;
