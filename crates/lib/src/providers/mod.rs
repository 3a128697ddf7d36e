//! # External Service Providers
//!
//! Every hosted capability the tutor relies on sits behind a trait here:
//! chat completion (`ai`), text embedding (`ai::embedding`) and nearest-neighbour
//! search (`index`). Callers hold trait objects so tests can substitute stubs.

pub mod ai;
pub mod factory;
pub mod index;
