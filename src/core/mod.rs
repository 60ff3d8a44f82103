// src/core/mod.rs

pub mod link;
pub mod normalize;
pub mod sanitize;

pub use link::canonical_link;
pub use normalize::normalize;
