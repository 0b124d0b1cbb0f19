//! Structured project artifacts: dependency list, property files, manifest.
//!
//! Each codec owns one on-disk grammar. [`FileArtifactRepository`] ties them
//! to a [`Filesystem`](graft_core::application::ports::Filesystem) and an
//! [`ArtifactLayout`].

pub mod dependencies;
pub mod manifest;
pub mod properties;

mod layout;
mod repository;

pub use layout::ArtifactLayout;
pub use repository::FileArtifactRepository;
