//! Integration test crate for Montage.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple montage crates to verify they work together.

#[cfg(test)]
mod compositing;

#[cfg(test)]
mod export;

#[cfg(test)]
mod timeline;
