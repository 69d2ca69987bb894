pub mod enums;
pub mod intake;
pub mod prescription;
pub mod schedule;

pub use enums::*;
pub use intake::*;
pub use prescription::*;
pub use schedule::*;
