//! # Base types for pawnsmith
//!
//! This is an auxiliary crate for `pawnsmith`, which contains plain value types. It is split from
//! the main crate, so everything declared here can be used in the build script for `pawnsmith`.
//!
//! Normally you don't want to use this crate directly. Use `pawnsmith` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
