//! # Omicron Web Core
//!
//! I/O-free logic for resolving a time description into stored Omicron
//! monitoring reports: data models, GPS time normalization, presets, the
//! store abstraction, the artifact index, and the resolution façade.
//!
//! This crate performs no filesystem access of its own. Storage is reached
//! through [`store::ArtifactStore`]; the current time through
//! [`clock::Clock`].

pub mod clock;
pub mod error;
pub mod index;
pub mod models;
pub mod preset;
pub mod resolve;
pub mod store;
pub mod time;
