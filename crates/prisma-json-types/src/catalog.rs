//! Lookup structures built once per run from the schema.

use crate::config::RewriteConfig;
use crate::error::RewriteError;
use crate::naming::names_for;
use crate::schema::{Datamodel, Entity, EntityKind};
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;

/// Alias and entity lookups for the classifier.
///
/// Only annotated entities contribute aliases; the rest are recorded in the
/// no-op set so any declaration resolving to them is skipped.
#[derive(Debug, Default)]
pub struct EntityCatalog {
    aliases: HashMap<String, String>,
    entities: HashMap<String, Entity>,
    no_ops: HashSet<String>,
}

impl EntityCatalog {
    pub fn build(datamodel: &Datamodel, config: &RewriteConfig) -> Result<Self, RewriteError> {
        let models = datamodel
            .models
            .iter()
            .map(|m| Entity::from_schema(m, EntityKind::Model, config));
        let types = datamodel
            .types
            .iter()
            .map(|t| Entity::from_schema(t, EntityKind::Type, config));
        Self::from_entities(models.chain(types))
    }

    /// Build from already-resolved entities, in schema order.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self, RewriteError> {
        let mut catalog = Self::default();

        for entity in entities {
            if !entity.has_annotations() {
                tracing::trace!(entity = %entity.name, kind = ?entity.kind, "no annotated fields");
                catalog.no_ops.insert(entity.name);
                continue;
            }

            for alias in names_for(&entity.name) {
                match catalog.aliases.entry(alias) {
                    Entry::Occupied(existing) => {
                        return Err(RewriteError::AliasCollision {
                            alias: existing.key().clone(),
                            existing: existing.get().clone(),
                            incoming: entity.name,
                        });
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(entity.name.clone());
                    }
                }
            }
            catalog.entities.insert(entity.name.clone(), entity);
        }

        tracing::debug!(
            entities = catalog.entities.len(),
            aliases = catalog.aliases.len(),
            no_ops = catalog.no_ops.len(),
            "built entity catalog"
        );
        Ok(catalog)
    }

    /// The annotated entity that owns a generated alias.
    pub fn entity_for_alias(&self, alias: &str) -> Option<&Entity> {
        self.aliases
            .get(alias)
            .and_then(|name| self.entities.get(name))
    }

    /// An annotated entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn is_no_op(&self, name: &str) -> bool {
        self.no_ops.contains(name)
    }

    /// Whether nothing in the schema is annotated.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}
