//! # bridge_core - Steel Girder Bridge Schematic Engine
//!
//! `bridge_core` turns a set of bridge parameters (span, carriageway, footpaths,
//! girders, skew) into a consistent, dimensioned schematic. It sizes the deck,
//! keeps deck overhang and girder spacing in balance, and lays out a
//! cross-section and a top view as a flat list of drawing primitives any
//! renderer can paint.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: One recompute is a pure function of a parameter snapshot
//! - **Never fails**: Out-of-range input is clamped and reported as a notice
//! - **JSON-First**: All inputs, notices and primitives implement Serialize/Deserialize
//! - **Renderer-agnostic**: Output is pixel geometry with semantic roles
//!
//! ## Quick Start
//!
//! ```rust
//! use bridge_core::{
//!     compute_drawing, BridgeParameters, DrawingSettings, EditedField, ViewKind, Viewport,
//! };
//!
//! let params = BridgeParameters {
//!     num_girders: 5,
//!     ..Default::default()
//! };
//!
//! let drawing = compute_drawing(
//!     &params,
//!     EditedField::Other,
//!     ViewKind::Top,
//!     Viewport::new(1200.0, 800.0),
//!     &DrawingSettings::default(),
//! );
//!
//! // Girder spacing was rebalanced to fit the deck
//! assert!(drawing.parameters.girder_spacing_mm > 0.0);
//! let json = serde_json::to_string_pretty(&drawing).unwrap();
//! assert!(json.contains("TOP VIEW"));
//! ```
//!
//! ## Modules
//!
//! - [`parameters`] - Bridge parameters, ranges and normalization
//! - [`layout`] - Deck width, balancer, view layouts, dimensions and labels
//! - [`geometry`] - Points, rectangles and drawing primitives
//! - [`section`] - Girder, crash barrier and railing profiles
//! - [`settings`] - Viewport and drawing settings
//! - [`project`] - Named designs kept together in a project
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - `file_io` - Project files with atomic saves and locking (native only)

pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod geometry;
pub mod layout;
pub mod parameters;
pub mod project;
pub mod section;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{BridgeError, BridgeResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, modify_project, save_project, FileLock};
pub use layout::{compute_drawing, resolve, Drawing, ViewKind};
pub use parameters::{BridgeParameters, EditedField, FootpathConfig};
pub use project::{BridgeDesign, BridgeProject, ProjectMetadata};
pub use settings::{DrawingSettings, Viewport};
