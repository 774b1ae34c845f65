//! Schema description consumed by the catalog.
//!
//! Mirrors the subset of the Prisma DMMF document that matters here: models,
//! composite types, and their fields' documentation.

use crate::annotation::resolve_field_type;
use crate::config::RewriteConfig;
use crate::error::RewriteError;
use serde::Deserialize;

/// The DMMF `datamodel` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Datamodel {
    pub models: Vec<SchemaModel>,
    pub types: Vec<SchemaModel>,
}

#[derive(Debug, Deserialize)]
struct Document {
    datamodel: Datamodel,
}

impl Datamodel {
    /// Decode either a full DMMF document or a bare `datamodel` object.
    pub fn from_json(input: &str) -> Result<Self, RewriteError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        if value.get("datamodel").is_some() {
            let doc: Document = serde_json::from_value(value)?;
            Ok(doc.datamodel)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}

/// A model or composite type as described by the schema.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaModel {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Model,
    Type,
}

/// A schema entity with its fields' annotations already parsed.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: String,
    /// Replacement type expression, when the field is annotated.
    pub annotation: Option<String>,
}

impl Entity {
    pub fn from_schema(model: &SchemaModel, kind: EntityKind, config: &RewriteConfig) -> Self {
        let fields = model
            .fields
            .iter()
            .map(|f| Field {
                name: f.name.clone(),
                field_type: f.field_type.clone(),
                annotation: resolve_field_type(f.documentation.as_deref(), &f.field_type, config),
            })
            .collect();
        Self {
            name: model.name.clone(),
            kind,
            fields,
        }
    }

    pub fn has_annotations(&self) -> bool {
        self.fields.iter().any(|f| f.annotation.is_some())
    }

    /// The replacement type for `field`, if that field is annotated.
    pub fn annotation_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .and_then(|f| f.annotation.as_deref())
    }
}
