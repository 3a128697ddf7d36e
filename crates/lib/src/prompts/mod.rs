//! # Prompt Template Modules
//!
//! This module organizes all prompt templates used by the `sparky` library.
//! Per-language tutor personas are data, not code, and live in the persona table
//! (`data/personas.yml`); everything here is language-independent.

pub mod readability;
pub mod tasks;
