//! Persisted spatial feature containers.

use geosketch_types::Geom;

use crate::error::EditError;
use crate::geometry::wkb;

/// Identifier of a feature row within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub i64);

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the database a layer's table lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(pub String);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Typed value of a feature attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Binary value.
    Blob(Vec<u8>),
    /// Missing value.
    Null,
}

/// Named attribute of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: AttributeValue,
}

/// A spatial feature container.
///
/// Identifies a persisted row by source database, table and feature id, and
/// carries the row's geometry as WKB bytes together with its attribute set.
/// Produced from query results; consumed by edit, copy and delete operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    source: SourceId,
    table: String,
    id: FeatureId,
    geometry: Vec<u8>,
    attributes: Vec<Attribute>,
}

impl Feature {
    /// Creates a feature with its geometry bytes.
    pub fn new(
        source: SourceId,
        table: impl Into<String>,
        id: FeatureId,
        geometry: Vec<u8>,
    ) -> Self {
        Self {
            source,
            table: table.into(),
            id,
            geometry,
            attributes: vec![],
        }
    }

    /// The feature id.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// The source database of the feature's table.
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// The table the feature belongs to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Raw geometry bytes in WKB encoding.
    pub fn geometry_wkb(&self) -> &[u8] {
        &self.geometry
    }

    /// Decodes the feature geometry.
    pub fn geometry(&self) -> Result<Geom, EditError> {
        wkb::from_wkb(&self.geometry)
    }

    /// Replaces the feature geometry.
    pub fn set_geometry(&mut self, geometry: &Geom) -> Result<(), EditError> {
        self.geometry = wkb::to_wkb(geometry)?;
        Ok(())
    }

    /// All attributes of the feature.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the value of the attribute with the given field name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Sets an attribute, replacing an existing value with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }
}
