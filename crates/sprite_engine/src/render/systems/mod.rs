//! Active rendering systems
//!
//! This module contains the stateful systems the sprite pipeline runs on:
//! atlas lookup, sprite pooling and batching.

pub mod atlas;
pub mod batching;
pub mod pooling;
