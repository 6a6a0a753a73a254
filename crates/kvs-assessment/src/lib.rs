//! KVS assessment service.
//!
//! Orchestrates timed knowledge-test sessions over catalog-driven question
//! banks: drawing usage-balanced questions, sequencing the session state
//! machine, grading answers, and propagating finished-session events.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
