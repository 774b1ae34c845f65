//! Typed JSON fields for generated Prisma client declarations.
//!
//! `prisma-json-types` rewrites the declaration module emitted by the Prisma
//! client generator so that fields documented with a type annotation use that
//! type instead of the generic `JsonValue` family.
//!
//! # Architecture
//!
//! ```text
//! schema (DMMF) ──> EntityCatalog ──┐
//!                   (naming.rs)     │
//!                                   ├─> classify ─┬─> payload rewriter ─┐
//! index.d.ts ──> tree-sitter tree ──┘             └─> object rewriter ──┴─> Patch ──> DeclarationWriter
//! ```
//!
//! # Example
//!
//! ```
//! use prisma_json_types::{EntityCatalog, RewriteConfig, rewrite_source, schema::Datamodel};
//!
//! let datamodel = Datamodel::from_json(r#"{
//!     "models": [{ "name": "User", "fields": [
//!         { "name": "id", "type": "String" },
//!         { "name": "settings", "type": "Json", "documentation": "![{ theme: 'dark' | 'light' }]" }
//!     ]}]
//! }"#).unwrap();
//! let catalog = EntityCatalog::build(&datamodel, &RewriteConfig::default()).unwrap();
//!
//! let (out, _report) = rewrite_source(
//!     "type UserCreateInput = { id: string; settings: Prisma.JsonValue }",
//!     &catalog,
//! ).unwrap();
//! assert_eq!(out, "type UserCreateInput = { id: string; settings: { theme: 'dark' | 'light' } }");
//! ```

pub mod annotation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generate;
pub mod naming;
pub mod rewrite;
pub mod schema;
pub mod syntax;
pub mod writer;

pub use catalog::EntityCatalog;
pub use config::RewriteConfig;
pub use error::RewriteError;
pub use generate::{GenerateOptions, generate, rewrite_writer};
pub use rewrite::{
    Disposition, Resolution, RewriteReport, RewriteStats, StatementFailure, classify,
    rewrite_module, rewrite_source,
};
pub use writer::{DeclarationWriter, Edit, Patch};
