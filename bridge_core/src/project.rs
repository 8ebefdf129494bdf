//! # Project Data Structures
//!
//! The `BridgeProject` struct keeps named parameter sets together with the
//! drawing settings they are shown with. Projects serialize to `.bridge`
//! files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! BridgeProject
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: DrawingSettings (margins, profiles, dimension offsets)
//! └── designs: HashMap<Uuid, BridgeDesign> (labelled parameter sets)
//! ```
//!
//! The engine itself stays stateless; a project is only a place to keep
//! snapshots between sessions.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::project::BridgeProject;
//! use bridge_core::parameters::BridgeParameters;
//!
//! let mut project = BridgeProject::new("Jane Engineer", "25-042", "County Roads");
//! let id = project.add_design("Option A", BridgeParameters::default()).unwrap();
//!
//! let (found, design) = project.find_design("Option A").unwrap();
//! assert_eq!(found, id);
//! assert_eq!(design.parameters.num_girders, 4);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BridgeError, BridgeResult};
use crate::parameters::BridgeParameters;
use crate::settings::DrawingSettings;

/// Current schema version for .bridge files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container, serialized to `.bridge` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeProject {
    /// Project metadata (version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Drawing settings shared by every design in the project
    #[serde(default)]
    pub settings: DrawingSettings,

    /// Designs keyed by UUID; labels are unique within a project
    pub designs: HashMap<Uuid, BridgeDesign>,
}

impl BridgeProject {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bridge_core::project::BridgeProject;
    ///
    /// let project = BridgeProject::new("John Doe", "25-001", "Client Corp");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// assert_eq!(project.design_count(), 0);
    /// ```
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        BridgeProject {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: DrawingSettings::default(),
            designs: HashMap::new(),
        }
    }

    /// Add a labelled design. Returns the UUID assigned to it.
    ///
    /// Fails with `InvalidInput` when the label is empty or already taken.
    pub fn add_design(
        &mut self,
        label: impl Into<String>,
        parameters: BridgeParameters,
    ) -> BridgeResult<Uuid> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(BridgeError::invalid_input(
                "label",
                label,
                "Design label must not be empty",
            ));
        }
        if self.designs.values().any(|d| d.label == label) {
            return Err(BridgeError::invalid_input(
                "label",
                label,
                "A design with this label already exists",
            ));
        }

        let id = Uuid::new_v4();
        self.designs.insert(id, BridgeDesign { label, parameters });
        self.touch();
        Ok(id)
    }

    /// Remove a design by UUID, returning it if it existed.
    pub fn remove_design(&mut self, id: &Uuid) -> Option<BridgeDesign> {
        let design = self.designs.remove(id);
        if design.is_some() {
            self.touch();
        }
        design
    }

    pub fn get_design(&self, id: &Uuid) -> Option<&BridgeDesign> {
        self.designs.get(id)
    }

    /// Look a design up by its label
    pub fn find_design(&self, label: &str) -> BridgeResult<(Uuid, &BridgeDesign)> {
        self.designs
            .iter()
            .find(|(_, d)| d.label == label)
            .map(|(id, d)| (*id, d))
            .ok_or_else(|| BridgeError::design_not_found(label))
    }

    /// Design labels in alphabetical order
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.designs.values().map(|d| d.label.as_str()).collect();
        labels.sort_unstable();
        labels
    }

    pub fn design_count(&self) -> usize {
        self.designs.len()
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for BridgeProject {
    fn default() -> Self {
        BridgeProject::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// A named parameter snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeDesign {
    /// User label (e.g., "Option A", "Widened deck")
    pub label: String,
    pub parameters: BridgeParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = BridgeProject::new("John Doe", "25-001", "Acme Corp");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = BridgeProject::new("Jane Engineer", "25-042", "Test Client");
        project.add_design("Option A", BridgeParameters::default()).unwrap();
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("Option A"));
        assert!(json.contains("cross_section_margin_px"));

        let roundtrip: BridgeProject = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.design_count(), 1);
    }

    #[test]
    fn test_add_find_remove_design() {
        let mut project = BridgeProject::new("Engineer", "25-001", "Client");
        let id = project.add_design("B", BridgeParameters::default()).unwrap();
        project
            .add_design(
                "A",
                BridgeParameters {
                    num_girders: 6,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(project.labels(), vec!["A", "B"]);
        assert_eq!(project.find_design("A").unwrap().1.parameters.num_girders, 6);
        assert_eq!(project.find_design("B").unwrap().0, id);

        let err = project.find_design("C").unwrap_err();
        assert_eq!(err.error_code(), "DESIGN_NOT_FOUND");

        assert!(project.remove_design(&id).is_some());
        assert!(project.get_design(&id).is_none());
        assert_eq!(project.design_count(), 1);
    }

    #[test]
    fn test_duplicate_and_empty_labels_rejected() {
        let mut project = BridgeProject::default();
        project.add_design("Option A", BridgeParameters::default()).unwrap();
        assert!(project.add_design("Option A", BridgeParameters::default()).is_err());
        assert!(project.add_design("  ", BridgeParameters::default()).is_err());
        assert_eq!(project.design_count(), 1);
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let project = BridgeProject::new("E", "J", "C");
        let mut value = serde_json::to_value(&project).unwrap();
        value.as_object_mut().unwrap().remove("settings");
        let loaded: BridgeProject = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.settings, DrawingSettings::default());
    }
}
