// Character records and the signed update envelope

pub mod character;
pub mod update;

pub use character::*;
pub use update::*;
