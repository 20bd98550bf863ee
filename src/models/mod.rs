pub mod enums;
pub mod patient;

pub use patient::*;
