//! Upkeep - Property-maintenance photo analysis
//!
//! This library captions maintenance photos, triages text with per-locale
//! keyword tables, and rates request urgency. Every model-backed task runs
//! as an ordered fallback chain that ends in a rule-based strategy, so a
//! request always gets an answer when external providers are down.

pub mod api;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod provider;
pub mod registry;
pub mod strategy;
pub mod upload;
pub mod urgency;
