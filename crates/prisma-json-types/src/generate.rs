//! One full rewrite of a generated declaration file.

use crate::catalog::EntityCatalog;
use crate::config::RewriteConfig;
use crate::error::RewriteError;
use crate::rewrite::{RewriteReport, rewrite_module};
use crate::schema::Datamodel;
use crate::writer::DeclarationWriter;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Compute the rewrite without writing the file back.
    pub dry_run: bool,
}

/// Load `declarations`, rewrite it against `datamodel`, and save it.
pub fn generate(
    datamodel: &Datamodel,
    declarations: &Path,
    config: &RewriteConfig,
    options: GenerateOptions,
) -> Result<RewriteReport, RewriteError> {
    let started = Instant::now();
    let _run = tracing::info_span!("generate", file = %declarations.display()).entered();

    let catalog = tracing::debug_span!("catalog")
        .in_scope(|| EntityCatalog::build(datamodel, config))?;
    if catalog.is_empty() {
        tracing::info!("schema has no annotated fields; declarations stay as generated");
    }
    let mut writer =
        tracing::debug_span!("load").in_scope(|| DeclarationWriter::load(declarations))?;
    tracing::debug!(bytes = writer.content().len(), "loaded declarations");

    let mut report = tracing::debug_span!("rewrite")
        .in_scope(|| rewrite_writer(&mut writer, &catalog))?;
    if !options.dry_run {
        report.written = tracing::debug_span!("save").in_scope(|| writer.save())?;
    }

    tracing::info!(
        edits = report.edits,
        written = report.written,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rewrite finished"
    );
    Ok(report)
}

/// Rewrite the writer's buffer in memory and commit the edits.
pub fn rewrite_writer(
    writer: &mut DeclarationWriter,
    catalog: &EntityCatalog,
) -> Result<RewriteReport, RewriteError> {
    let label = writer.path().display().to_string();
    let (source, patch) = writer.split_mut();
    let report = rewrite_module(source, &label, catalog, patch)?;
    writer.commit()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{
        "datamodel": {
            "models": [{
                "name": "User",
                "fields": [
                    { "name": "id", "type": "String" },
                    { "name": "settings", "type": "Json", "documentation": "[Settings]" }
                ]
            }],
            "types": []
        }
    }"#;

    const DECLARATIONS: &str = "export namespace Prisma {\n  export type UserCreateInput = {\n    id: string\n    settings: JsonNullValueInput | InputJsonValue\n  }\n}\n";

    #[test]
    fn test_generate_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.d.ts");
        std::fs::write(&path, DECLARATIONS).unwrap();

        let datamodel = Datamodel::from_json(SCHEMA).unwrap();
        let report = generate(
            &datamodel,
            &path,
            &RewriteConfig::default(),
            GenerateOptions::default(),
        )
        .unwrap();

        assert!(report.written);
        assert_eq!(report.edits, 1);
        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.contains("settings: JsonNullValueInput | PrismaJson.Settings"));
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.d.ts");
        std::fs::write(&path, DECLARATIONS).unwrap();

        let datamodel = Datamodel::from_json(SCHEMA).unwrap();
        let report = generate(
            &datamodel,
            &path,
            &RewriteConfig::default(),
            GenerateOptions { dry_run: true },
        )
        .unwrap();

        assert!(!report.written);
        assert_eq!(report.stats.fields_rewritten, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DECLARATIONS);
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.d.ts");
        std::fs::write(&path, DECLARATIONS).unwrap();
        let datamodel = Datamodel::from_json(SCHEMA).unwrap();
        let config = RewriteConfig::default();

        generate(&datamodel, &path, &config, GenerateOptions::default()).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        let report = generate(&datamodel, &path, &config, GenerateOptions::default()).unwrap();

        assert!(!report.written);
        assert_eq!(report.edits, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
