pub mod profile_commands;

pub use profile_commands::*;
