//! Payload aliases (`$UserPayload`).
//!
//! ```ts
//! export type $UserPayload<ExtArgs> = {
//!   name: "User"
//!   objects: { posts: Prisma.$PostPayload<ExtArgs>[] }
//!   scalars: $Extensions.GetPayloadResult<{ id: string; settings: Prisma.JsonValue }, ExtArgs["result"]["user"]>
//!   composites: {}
//! }
//! ```
//!
//! `scalars` holds the entity's own fields. `objects` and `composites` hold
//! relations, whose inline shapes belong to other entities.

use super::{Disposition, Rewriter, classify, rewrite_object};
use crate::error::RewriteError;
use crate::schema::Entity;
use crate::syntax::{ObjectType, nested_objects, referenced_type_names};
use crate::writer::Patch;

/// Payload members that describe related entities.
const RELATION_MEMBERS: &[&str] = &["objects", "composites"];

impl<'t> Rewriter<'t> {
    pub(crate) fn rewrite_payload(
        &self,
        alias: &str,
        payload: ObjectType<'t>,
        entity: &Entity,
        patch: &mut Patch,
    ) -> Result<usize, RewriteError> {
        let scalars = payload
            .property("scalars", self.source)
            .and_then(|p| p.ty)
            .and_then(|ty| nested_objects(ty).into_iter().next())
            .ok_or_else(|| RewriteError::MissingScalars {
                alias: alias.to_string(),
            })?;
        let mut rewritten = rewrite_object(scalars, entity, self.source, patch);

        for member in RELATION_MEMBERS {
            let Some(relations) = payload
                .property(member, self.source)
                .and_then(|p| p.ty)
                .and_then(ObjectType::new)
            else {
                continue;
            };
            for relation in relations.properties(self.source) {
                let Some(ty) = relation.ty else {
                    continue;
                };
                for nested in nested_objects(ty) {
                    let Some(related) = self.resolve_nested(nested, ty)? else {
                        continue;
                    };
                    let label = format!("{alias}.{member}.{}", relation.name);
                    rewritten += self.rewrite_entity_object(&label, nested, related, patch)?;
                }
            }
        }
        Ok(rewritten)
    }

    /// Find the entity an inline relation shape belongs to.
    ///
    /// A `name: "Entity"` member wins; otherwise the alias names referenced
    /// alongside the shape are classified like top-level aliases.
    fn resolve_nested(
        &self,
        nested: ObjectType<'t>,
        relation_type: tree_sitter::Node<'t>,
    ) -> Result<Option<&'t Entity>, RewriteError> {
        if let Some(name) = nested
            .property("name", self.source)
            .and_then(|p| p.string_literal(self.source))
        {
            return Ok(self.catalog.entity(name));
        }

        for reference in referenced_type_names(relation_type, self.source) {
            match classify(self.catalog, reference, true)? {
                Disposition::Payload(entity)
                | Disposition::Object { entity, .. }
                | Disposition::ListField { entity, .. } => {
                    return Ok(Some(entity));
                }
                Disposition::NoOp => return Ok(None),
                Disposition::NotCandidate | Disposition::Unresolved => {}
            }
        }
        Ok(None)
    }
}
