//! Configuration for the rewrite pass.
//!
//! Loaded from `prisma-json-types.toml` in the project root, or from an
//! explicit path. Every key is optional.
//!
//! Example:
//! ```toml
//! namespace = "PrismaJson"
//! client_output = "node_modules/.prisma/client/index.d.ts"
//! use_type = "UntypedJson"
//! ```

use crate::error::RewriteError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default namespace that `[Name]` annotations resolve into.
pub const DEFAULT_NAMESPACE: &str = "PrismaJson";

/// Project config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "prisma-json-types.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Namespace prefixed to `[Name]` annotations.
    pub namespace: String,
    /// Generated declaration file, or the client directory containing it.
    pub client_output: Option<PathBuf>,
    /// Type applied to `Json` fields that carry no annotation.
    pub use_type: Option<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            client_output: None,
            use_type: None,
        }
    }
}

impl RewriteConfig {
    /// Load `prisma-json-types.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, RewriteError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file path.
    pub fn load_file(path: &Path) -> Result<Self, RewriteError> {
        let content = std::fs::read_to_string(path).map_err(|e| RewriteError::io(path, e))?;
        toml::from_str(&content).map_err(|source| RewriteError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the declaration file to rewrite.
    ///
    /// A directory resolves to `client.ts` when the newer `prisma-client`
    /// layout is present, otherwise to `index.d.ts`.
    pub fn declarations_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        let base = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.client_output.clone())?;
        if !base.is_dir() {
            return Some(base);
        }
        let client = base.join("client.ts");
        if client.is_file() {
            Some(client)
        } else {
            Some(base.join("index.d.ts"))
        }
    }
}
