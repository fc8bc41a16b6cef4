//! Label service request and response types.
//!
//! These types model the REST API of the label service: labels are named,
//! identified records with an opaque key/value property map (color,
//! description, and whatever else the service attaches).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A label attachable to a resource.
///
/// Labels carry two distinct identities and both matter:
///
/// - `id` is the stable identity assigned by the service. Selecting a
///   highlighted candidate resolves through `id`.
/// - `name` is the display identity, unique among labels, and is the key used
///   for availability filtering and highlight matching.
///
/// The two are deliberately not unified; duplicate names under different ids
/// would otherwise behave unpredictably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Service-assigned identity, unique and stable.
    pub id: String,
    /// Display name, unique among labels for filtering purposes.
    pub name: String,
    /// Opaque key/value properties (e.g. "color", "description").
    ///
    /// A `BTreeMap` keeps the wire form deterministic.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Label {
    /// Create a label with no properties.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Get the label's color property, if set.
    pub fn color(&self) -> Option<&str> {
        self.properties.get("color").map(String::as_str)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Response body of `GET /api/v2/labels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsResponse {
    /// All labels known to the service.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Response body of `POST /api/v2/labels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelResponse {
    /// The created label.
    pub label: Label,
}

/// Request body for creating a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCreateRequest {
    /// The name of the new label.
    pub name: String,
    /// The organization that owns the label, if the service is multi-tenant.
    #[serde(rename = "orgID", skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Initial properties for the label.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}
