//! Error taxonomy for the rewrite pass.

use std::path::PathBuf;

/// Errors raised while building the catalog or rewriting declarations.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Two entities produce the same generated alias name.
    #[error("generated alias `{alias}` is claimed by both `{existing}` and `{incoming}`")]
    AliasCollision {
        alias: String,
        existing: String,
        incoming: String,
    },

    /// A relation pattern extracted a base name that is not a schema entity.
    #[error("`{alias}` matched the {pattern} pattern but `{base}` is not a known model or type")]
    UnknownRelationBase {
        alias: String,
        base: String,
        pattern: &'static str,
    },

    /// A payload alias has no object-literal `scalars` member.
    #[error("payload `{alias}` has no scalars object")]
    MissingScalars { alias: String },

    #[error("Prisma namespace content could not be found")]
    EmptyNamespace,

    #[error("failed to parse {0} as TypeScript")]
    Parse(String),

    /// Two scheduled edits cover intersecting byte ranges.
    #[error("overlapping edits at {first:?} and {second:?}")]
    OverlappingEdits {
        first: (usize, usize),
        second: (usize, usize),
    },

    #[error("edit {start}..{end} is outside the {len} byte buffer or splits a character")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid schema description: {0}")]
    Schema(#[from] serde_json::Error),
}

impl RewriteError {
    /// Whether the failure is confined to the statement being processed.
    ///
    /// Statement-local faults are recorded in the report and the pass moves on
    /// to the next declaration; everything else aborts the run.
    pub fn is_statement_local(&self) -> bool {
        matches!(
            self,
            RewriteError::UnknownRelationBase { .. } | RewriteError::MissingScalars { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RewriteError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_local_split() {
        let local = RewriteError::UnknownRelationBase {
            alias: "GhostCreateWithoutPostsInput".into(),
            base: "Ghost".into(),
            pattern: "without-relation",
        };
        assert!(local.is_statement_local());
        assert!(
            RewriteError::MissingScalars {
                alias: "$UserPayload".into()
            }
            .is_statement_local()
        );

        let fatal = RewriteError::AliasCollision {
            alias: "UserUncheckedCreateInput".into(),
            existing: "User".into(),
            incoming: "UserUnchecked".into(),
        };
        assert!(!fatal.is_statement_local());
        assert!(!RewriteError::EmptyNamespace.is_statement_local());
    }

    #[test]
    fn test_collision_message_names_both_entities() {
        let err = RewriteError::AliasCollision {
            alias: "FooPayload".into(),
            existing: "Foo".into(),
            incoming: "Bar".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FooPayload"));
        assert!(msg.contains("`Foo`"));
        assert!(msg.contains("`Bar`"));
    }
}
