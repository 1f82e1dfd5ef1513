pub mod detect;
pub mod filter;
pub mod manifest;
pub mod mirror;
pub mod paths;
pub mod prune;
pub mod relocation;
pub mod walker;
