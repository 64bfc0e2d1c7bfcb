// src/models/mod.rs

//! Domain models for orgwatch.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod document;
mod links;
mod project;
mod repository;

use std::hash::Hash;

// Re-export all public types
pub use config::{
    AlertStyle, Config, FailurePolicy, GithubConfig, LinksConfig, StalenessRule, StatusConfig,
    StorageConfig, SweepConfig, WatchPreset,
};
pub use document::{DocRecord, StaleFinding};
pub use links::ProjectLinks;
pub use project::{ProjectDescriptor, StatusRecord};
pub use repository::Repository;

/// A record with a stable identifier used to diff snapshots.
pub trait Keyed {
    type Key: Eq + Hash;

    fn key(&self) -> Self::Key;
}
