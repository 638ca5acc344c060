//! depwatch - Dependency manifest analyzer library
//!
//! This library provides the pipeline that turns a manifest file into a
//! cached, classified analysis result:
//! - Node.js (package.json)
//! - Python (requirements.txt)
//! - Dart/Flutter (pubspec.yaml)

pub mod cache;
pub mod cli;
pub mod config;
pub mod delta;
pub mod domain;
pub mod error;
pub mod events;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod remote;
pub mod workspace;
