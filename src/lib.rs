//! Indagar — scene-graph question answering.
//!
//! Executes typed functional programs against scene graphs, with
//! taxonomy-aware lexical matching and a categorized fault taxonomy that
//! keeps data limitations apart from defects.

pub mod cli;
pub mod core;
pub mod lexicon;
pub mod scene;
