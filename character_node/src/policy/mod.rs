// Ownership-authenticated update enforcement

pub mod update_verifier;

pub use update_verifier::*;
