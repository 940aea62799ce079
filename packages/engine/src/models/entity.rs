//! Entity Data Structures
//!
//! An entity is the relational half of a node: the descriptive attributes
//! (display name, handle, bio, open-ended JSON properties) that live in the
//! relational store, keyed by the same external identifier the graph store
//! tracks.
//!
//! # Examples
//!
//! ```rust
//! use socialgraph_engine::models::{EntityAttributes, NodeKind};
//! use serde_json::json;
//!
//! let attrs = EntityAttributes::new()
//!     .with_display_name("Ada".to_string())
//!     .with_handle("ada".to_string())
//!     .with_properties(json!({ "timezone": "UTC" }));
//!
//! assert!(attrs.validate().is_ok());
//! assert_eq!(NodeKind::User.as_str(), "user");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Generate a fresh external identifier for a node
///
/// Callers may supply their own ULID/UUID-style identifiers; this helper
/// covers the common case where they do not.
pub fn new_external_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validation errors for entity data
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown node kind: {0}")]
    UnknownKind(String),

    #[error("Properties validation failed: {0}")]
    InvalidProperties(String),
}

/// Closed set of node kinds shared by the graph and relational stores
///
/// The kind is written to the graph store as a type label at node creation
/// and to the relational store's `kind` column. Invalid kinds are
/// unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    User,
    Event,
    Post,
    Comment,
}

impl NodeKind {
    /// Stable string form used in both stores
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::User => "user",
            NodeKind::Event => "event",
            NodeKind::Post => "post",
            NodeKind::Comment => "comment",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(NodeKind::User),
            "event" => Ok(NodeKind::Event),
            "post" => Ok(NodeKind::Post),
            "comment" => Ok(NodeKind::Comment),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Projectable relational fields
///
/// The closed set of descriptive columns callers may request during
/// hydration. Mapping through this enum (instead of raw column strings)
/// keeps the SQL assembly injection-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    DisplayName,
    Handle,
    AvatarUrl,
    Bio,
    Properties,
}

impl Field {
    /// Column name in the `entities` table
    pub fn column(&self) -> &'static str {
        match self {
            Field::DisplayName => "display_name",
            Field::Handle => "handle",
            Field::AvatarUrl => "avatar_url",
            Field::Bio => "bio",
            Field::Properties => "properties",
        }
    }
}

/// Relational field projection for hydration queries
///
/// The identity columns (`id`, `kind`, timestamps) are always fetched;
/// a projection narrows the descriptive columns on top of that. The
/// default covers what list views render.
///
/// # Examples
///
/// ```rust
/// use socialgraph_engine::models::{Field, Projection};
///
/// let projection = Projection::new(vec![Field::DisplayName, Field::Bio]);
/// assert!(projection.contains(Field::Bio));
/// assert!(!projection.contains(Field::Handle));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<Field>,
}

impl Projection {
    /// Create a projection, deduplicating while preserving request order
    pub fn new(fields: Vec<Field>) -> Self {
        let mut deduped = Vec::with_capacity(fields.len());
        for field in fields {
            if !deduped.contains(&field) {
                deduped.push(field);
            }
        }
        Self { fields: deduped }
    }

    /// Projection covering every descriptive column
    pub fn all() -> Self {
        Self::new(vec![
            Field::DisplayName,
            Field::Handle,
            Field::AvatarUrl,
            Field::Bio,
            Field::Properties,
        ])
    }

    /// Projected fields in selection order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether a field is part of this projection
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

impl Default for Projection {
    /// Default field set used when the caller requests no projection
    fn default() -> Self {
        Self::new(vec![Field::DisplayName, Field::Handle, Field::AvatarUrl])
    }
}

/// Relational record for a node, as returned by hydration
///
/// Descriptive fields outside the requested projection are left `None`
/// (or `{}` for `properties`); they were simply not fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// External identifier (ULID/UUID, immutable, caller-visible)
    pub id: String,

    /// Node kind shared with the graph store
    pub kind: NodeKind,

    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Unique short handle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    /// Avatar image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Free-form biography/description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Open-ended entity-specific fields (Pure JSON)
    pub properties: serde_json::Value,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

/// Descriptive attributes supplied at node creation or attribute update
///
/// Attribute updates touch only the relational row; edges are mutated
/// exclusively through the graph mutation path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Open-ended entity-specific fields (Pure JSON)
    #[serde(default = "empty_properties")]
    pub properties: serde_json::Value,
}

fn empty_properties() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl EntityAttributes {
    /// Create empty attributes (`properties` defaults to `{}`)
    pub fn new() -> Self {
        Self {
            properties: empty_properties(),
            ..Default::default()
        }
    }

    /// Set the display name
    pub fn with_display_name(mut self, display_name: String) -> Self {
        self.display_name = Some(display_name);
        self
    }

    /// Set the handle
    pub fn with_handle(mut self, handle: String) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Set the avatar URL
    pub fn with_avatar_url(mut self, avatar_url: String) -> Self {
        self.avatar_url = Some(avatar_url);
        self
    }

    /// Set the biography
    pub fn with_bio(mut self, bio: String) -> Self {
        self.bio = Some(bio);
        self
    }

    /// Set the JSON properties object
    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }

    /// Validate attribute structure
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `properties` is not a JSON object.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.properties.is_object() {
            return Err(ValidationError::InvalidProperties(
                "properties must be a JSON object".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_kind_round_trip() {
        for kind in [
            NodeKind::User,
            NodeKind::Event,
            NodeKind::Post,
            NodeKind::Comment,
        ] {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_node_kind_unknown() {
        assert!(matches!(
            "ticket".parse::<NodeKind>(),
            Err(ValidationError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_projection_dedupes_preserving_order() {
        let projection = Projection::new(vec![
            Field::Bio,
            Field::DisplayName,
            Field::Bio,
            Field::Handle,
        ]);

        assert_eq!(
            projection.fields(),
            &[Field::Bio, Field::DisplayName, Field::Handle]
        );
    }

    #[test]
    fn test_default_projection_excludes_bio_and_properties() {
        let projection = Projection::default();

        assert!(projection.contains(Field::DisplayName));
        assert!(!projection.contains(Field::Bio));
        assert!(!projection.contains(Field::Properties));
    }

    #[test]
    fn test_attributes_builder() {
        let attrs = EntityAttributes::new()
            .with_display_name("Ada".to_string())
            .with_properties(json!({ "timezone": "UTC" }));

        assert_eq!(attrs.display_name, Some("Ada".to_string()));
        assert_eq!(attrs.properties["timezone"], "UTC");
        assert!(attrs.validate().is_ok());
    }

    #[test]
    fn test_attributes_reject_non_object_properties() {
        let attrs = EntityAttributes::new().with_properties(json!("not an object"));

        assert!(matches!(
            attrs.validate(),
            Err(ValidationError::InvalidProperties(_))
        ));
    }

    #[test]
    fn test_external_ids_are_unique() {
        assert_ne!(new_external_id(), new_external_id());
    }
}
