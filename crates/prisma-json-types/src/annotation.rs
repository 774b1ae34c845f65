//! Field annotation syntax.
//!
//! A schema field opts into a typed JSON value with a documentation line:
//!
//! ```prisma
//! /// [UserSettings]
//! settings Json
//!
//! /// ![{ theme: 'dark' | 'light' }]
//! theme Json
//! ```
//!
//! `[Name]` refers to a type declared in the configured namespace, `![...]`
//! inlines the type expression verbatim.

use crate::config::RewriteConfig;

/// Parse a field's documentation into a replacement type expression.
///
/// Returns `None` when the documentation carries no annotation.
pub fn parse_annotation(documentation: Option<&str>, namespace: &str) -> Option<String> {
    documentation?.lines().find_map(|line| {
        let line = line.trim();
        let (literal, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let rest = rest.strip_prefix('[')?;
        let inner = rest[..rest.rfind(']')?].trim();
        if inner.is_empty() {
            None
        } else if literal {
            Some(inner.to_string())
        } else {
            Some(format!("{namespace}.{inner}"))
        }
    })
}

/// Resolve the type a field should receive, honoring `use_type` for untyped `Json` fields.
pub fn resolve_field_type(
    documentation: Option<&str>,
    field_type: &str,
    config: &RewriteConfig,
) -> Option<String> {
    parse_annotation(documentation, &config.namespace).or_else(|| {
        let fallback = config.use_type.as_deref()?;
        (field_type == "Json").then(|| format!("{}.{fallback}", config.namespace))
    })
}
