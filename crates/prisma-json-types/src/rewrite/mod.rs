//! Classification and rewriting of generated type aliases.
//!
//! Every type alias in the module is classified against the
//! [`EntityCatalog`]. Payload aliases go to [`payload`], every other
//! entity-shaped object literal goes to [`object`].

mod object;
mod payload;

pub use object::{JSON_BLOB_TYPES, rewrite_list_wrapper, rewrite_object};

use crate::catalog::EntityCatalog;
use crate::error::RewriteError;
use crate::naming::{list_field_splits, payload_name, relation_patterns, template_bases};
use crate::schema::{Entity, Field};
use crate::syntax::{DeclarationVisitor, ObjectType, TypeAlias, parse_module, walk_module};
use crate::writer::Patch;
use serde::Serialize;

/// How an alias was tied to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Direct,
    /// Matched a relation wrapper shape; carries the shape's name.
    Fallback(&'static str),
}

/// What to do with one type alias.
#[derive(Debug, Clone, Copy)]
pub enum Disposition<'c> {
    /// Right-hand side is not an object literal.
    NotCandidate,
    /// Resolves to an entity with no annotated fields.
    NoOp,
    /// No direct name and no relation shape matched.
    Unresolved,
    Payload(&'c Entity),
    Object {
        entity: &'c Entity,
        resolution: Resolution,
    },
    /// `set`/`push` wrapper of one annotated list field.
    ListField {
        entity: &'c Entity,
        field: &'c Field,
    },
}

/// Classify an alias by name.
///
/// Direct lookup always wins over the relation patterns. Aliases generated for
/// an unannotated entity are no-ops. A relation shape whose every candidate
/// base is unknown to the schema is a grammar fault.
pub fn classify<'c>(
    catalog: &'c EntityCatalog,
    alias: &str,
    is_object: bool,
) -> Result<Disposition<'c>, RewriteError> {
    if !is_object {
        return Ok(Disposition::NotCandidate);
    }
    if catalog.is_no_op(alias) {
        return Ok(Disposition::NoOp);
    }

    if let Some(entity) = catalog.entity_for_alias(alias) {
        if alias == payload_name(&entity.name) {
            return Ok(Disposition::Payload(entity));
        }
        return Ok(Disposition::Object {
            entity,
            resolution: Resolution::Direct,
        });
    }

    if template_bases(alias).any(|base| catalog.is_no_op(base)) {
        return Ok(Disposition::NoOp);
    }

    let mut no_op = false;
    for (base, field) in list_field_splits(alias) {
        no_op |= catalog.is_no_op(base);
        let Some(entity) = catalog.entity(base) else {
            continue;
        };
        if let Some(field) = entity.fields.iter().find(|f| f.name == field) {
            return Ok(match field.annotation {
                Some(_) => Disposition::ListField { entity, field },
                None => Disposition::NoOp,
            });
        }
    }
    if no_op {
        return Ok(Disposition::NoOp);
    }

    // Every split of a matching shape is tried; a known entity beats a no-op.
    for pattern in relation_patterns() {
        let mut shortest = None;
        for base in pattern.bases(alias) {
            if let Some(entity) = catalog.entity(base) {
                return Ok(Disposition::Object {
                    entity,
                    resolution: Resolution::Fallback(pattern.name),
                });
            }
            no_op |= catalog.is_no_op(base);
            shortest.get_or_insert(base);
        }
        if no_op {
            return Ok(Disposition::NoOp);
        }
        if let Some(base) = shortest {
            return Err(RewriteError::UnknownRelationBase {
                alias: alias.to_string(),
                base: base.to_string(),
                pattern: pattern.name,
            });
        }
    }
    Ok(Disposition::Unresolved)
}

/// Per-run counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub non_candidates: usize,
    pub no_ops: usize,
    pub direct: usize,
    pub fallback: usize,
    pub unresolved: usize,
    pub failed: usize,
    pub fields_rewritten: usize,
}

/// A statement whose processing was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    pub alias: String,
    pub message: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RewriteReport {
    pub stats: RewriteStats,
    pub failures: Vec<StatementFailure>,
    /// Number of text edits scheduled.
    pub edits: usize,
    /// Whether the declaration file was written back.
    pub written: bool,
}

/// Shared state for rewriting one module.
pub(crate) struct Rewriter<'t> {
    pub catalog: &'t EntityCatalog,
    pub source: &'t str,
}

impl<'t> Rewriter<'t> {
    /// Rewrite an object literal owned by `entity`, picking the payload path
    /// when it has a `scalars` member.
    pub fn rewrite_entity_object(
        &self,
        name: &str,
        object: ObjectType<'t>,
        entity: &Entity,
        patch: &mut Patch,
    ) -> Result<usize, RewriteError> {
        if object.property("scalars", self.source).is_some() {
            self.rewrite_payload(name, object, entity, patch)
        } else {
            Ok(rewrite_object(object, entity, self.source, patch))
        }
    }
}

struct StatementPass<'t, 'p> {
    rewriter: Rewriter<'t>,
    patch: &'p mut Patch,
    report: RewriteReport,
}

impl<'t> StatementPass<'t, '_> {
    fn handle(&mut self, alias: TypeAlias<'t>) -> Result<(), RewriteError> {
        let object = alias.object();
        let disposition = classify(self.rewriter.catalog, alias.name, object.is_some())?;
        let stats = &mut self.report.stats;
        let Some(object) = object else {
            stats.non_candidates += 1;
            return Ok(());
        };

        let (entity, fields) = match disposition {
            Disposition::NotCandidate => {
                stats.non_candidates += 1;
                return Ok(());
            }
            Disposition::NoOp => {
                stats.no_ops += 1;
                return Ok(());
            }
            Disposition::Unresolved => {
                tracing::trace!(alias = alias.name, "unresolved alias");
                stats.unresolved += 1;
                return Ok(());
            }
            Disposition::Payload(entity) => {
                stats.direct += 1;
                let fields = self
                    .rewriter
                    .rewrite_payload(alias.name, object, entity, self.patch)?;
                (entity, fields)
            }
            Disposition::Object { entity, resolution } => {
                match resolution {
                    Resolution::Direct => stats.direct += 1,
                    Resolution::Fallback(pattern) => {
                        tracing::debug!(
                            alias = alias.name,
                            pattern,
                            entity = %entity.name,
                            "resolved by relation pattern"
                        );
                        stats.fallback += 1;
                    }
                }
                let fields = rewrite_object(object, entity, self.rewriter.source, self.patch);
                (entity, fields)
            }
            Disposition::ListField { entity, field } => {
                tracing::debug!(
                    alias = alias.name,
                    entity = %entity.name,
                    field = %field.name,
                    "scalar list wrapper"
                );
                stats.fallback += 1;
                let fields = rewrite_list_wrapper(object, field, self.rewriter.source, self.patch);
                (entity, fields)
            }
        };

        if fields > 0 {
            tracing::debug!(
                alias = alias.name,
                entity = %entity.name,
                fields,
                "rewrote declaration"
            );
        }
        self.report.stats.fields_rewritten += fields;
        Ok(())
    }
}

impl<'t> DeclarationVisitor<'t> for StatementPass<'t, '_> {
    type Error = RewriteError;

    fn visit_type_alias(&mut self, alias: TypeAlias<'t>) -> Result<(), RewriteError> {
        let mark = self.patch.len();
        match self.handle(alias) {
            Ok(()) => Ok(()),
            Err(err) if err.is_statement_local() => {
                self.patch.truncate(mark);
                tracing::warn!(alias = alias.name, "skipping declaration: {err}");
                self.report.stats.failed += 1;
                self.report.failures.push(StatementFailure {
                    alias: alias.name.to_string(),
                    message: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Classify and rewrite every type alias of `source`, scheduling edits into `patch`.
///
/// `label` names the module in diagnostics.
pub fn rewrite_module(
    source: &str,
    label: &str,
    catalog: &EntityCatalog,
    patch: &mut Patch,
) -> Result<RewriteReport, RewriteError> {
    let tree = parse_module(source, label)?;
    let start = patch.len();
    let mut pass = StatementPass {
        rewriter: Rewriter { catalog, source },
        patch: &mut *patch,
        report: RewriteReport::default(),
    };
    walk_module(&tree, source, &mut pass)?;

    let mut report = pass.report;
    report.edits = patch.len() - start;
    let stats = &report.stats;
    tracing::info!(
        file = label,
        non_candidates = stats.non_candidates,
        no_ops = stats.no_ops,
        direct = stats.direct,
        fallback = stats.fallback,
        unresolved = stats.unresolved,
        failed = stats.failed,
        fields = stats.fields_rewritten,
        "classified declarations"
    );
    Ok(report)
}

/// Rewrite `source` and return the new text alongside the report.
pub fn rewrite_source(
    source: &str,
    catalog: &EntityCatalog,
) -> Result<(String, RewriteReport), RewriteError> {
    let mut patch = Patch::new();
    let report = rewrite_module(source, "<memory>", catalog, &mut patch)?;
    Ok((patch.apply(source)?, report))
}
