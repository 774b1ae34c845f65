//! Typed views over the tree-sitter TypeScript syntax tree.
//!
//! The tree is only read; edits go through [`crate::writer::Patch`] using the
//! byte spans exposed here.

use crate::error::RewriteError;
use tree_sitter::{Node, Parser, Tree};

/// Namespace the Prisma client declares its generated types in.
pub const PRISMA_NAMESPACE: &str = "Prisma";

/// Parse a declaration module.
pub fn parse_module(source: &str, label: &str) -> Result<Tree, RewriteError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_typescript::language().into())
        .map_err(|e| RewriteError::Parse(format!("{label} (tree-sitter init: {e})")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| RewriteError::Parse(label.to_string()))?;
    if tree.root_node().has_error() {
        tracing::warn!(file = label, "declaration module contains syntax errors");
    }
    Ok(tree)
}

/// Text of a node, or the empty string if the span is not valid UTF-8.
pub fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Visitor over the type aliases of a declaration module.
pub trait DeclarationVisitor<'t> {
    type Error;

    fn visit_type_alias(&mut self, alias: TypeAlias<'t>) -> Result<(), Self::Error>;

    /// Whether to descend into a namespace with this name.
    fn enter_namespace(&mut self, name: &str) -> bool {
        name == PRISMA_NAMESPACE
    }
}

/// Walk top-level type aliases and those inside entered namespaces, in file order.
///
/// An entered namespace without statements is a malformed module.
pub fn walk_module<'t, V>(
    tree: &'t Tree,
    source: &'t str,
    visitor: &mut V,
) -> Result<(), V::Error>
where
    V: DeclarationVisitor<'t>,
    V::Error: From<RewriteError>,
{
    walk_statements(tree.root_node(), source, visitor)
}

fn walk_statements<'t, V>(
    container: Node<'t>,
    source: &'t str,
    visitor: &mut V,
) -> Result<(), V::Error>
where
    V: DeclarationVisitor<'t>,
    V::Error: From<RewriteError>,
{
    let mut cursor = container.walk();
    for child in container.named_children(&mut cursor) {
        let Some(decl) = unwrap_declaration(child) else {
            continue;
        };
        match decl.kind() {
            "type_alias_declaration" => {
                if let Some(alias) = TypeAlias::from_node(decl, source) {
                    visitor.visit_type_alias(alias)?;
                }
            }
            "internal_module" | "module" => {
                let Some(name) = decl.child_by_field_name("name") else {
                    continue;
                };
                if !visitor.enter_namespace(node_text(name, source)) {
                    continue;
                }
                let body = decl
                    .child_by_field_name("body")
                    .filter(|b| b.named_child_count() > 0)
                    .ok_or(RewriteError::EmptyNamespace)?;
                walk_statements(body, source, visitor)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Strip `export` and `declare` wrappers off a statement.
fn unwrap_declaration(node: Node) -> Option<Node> {
    match node.kind() {
        "export_statement" => node
            .child_by_field_name("declaration")
            .and_then(unwrap_declaration),
        "ambient_declaration" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next();
            inner.and_then(unwrap_declaration)
        }
        "expression_statement" => {
            // `namespace X {}` without `declare` can parse as an expression statement.
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "internal_module");
            inner
        }
        _ => Some(node),
    }
}

/// A `type Name<...> = value` declaration.
#[derive(Debug, Clone, Copy)]
pub struct TypeAlias<'t> {
    pub name: &'t str,
    pub node: Node<'t>,
    pub value: Node<'t>,
}

impl<'t> TypeAlias<'t> {
    fn from_node(node: Node<'t>, source: &'t str) -> Option<Self> {
        let name = node_text(node.child_by_field_name("name")?, source);
        let value = node.child_by_field_name("value")?;
        Some(Self { name, node, value })
    }

    /// The right-hand side as an object literal, if it is one.
    pub fn object(&self) -> Option<ObjectType<'t>> {
        ObjectType::new(self.value)
    }
}

/// An object type literal (`{ a: string; b?: number }`).
#[derive(Debug, Clone, Copy)]
pub struct ObjectType<'t> {
    pub node: Node<'t>,
}

impl<'t> ObjectType<'t> {
    pub fn new(node: Node<'t>) -> Option<Self> {
        (node.kind() == "object_type").then_some(Self { node })
    }

    pub fn properties(&self, source: &'t str) -> Vec<Property<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "property_signature")
            .filter_map(|c| Property::from_node(c, source))
            .collect()
    }

    pub fn property(&self, name: &str, source: &'t str) -> Option<Property<'t>> {
        self.properties(source).into_iter().find(|p| p.name == name)
    }
}

/// A property signature inside an object type.
#[derive(Debug, Clone, Copy)]
pub struct Property<'t> {
    pub name: &'t str,
    /// The declared type, without the leading `:`.
    pub ty: Option<Node<'t>>,
}

impl<'t> Property<'t> {
    fn from_node(node: Node<'t>, source: &'t str) -> Option<Self> {
        let name = unquote(node_text(node.child_by_field_name("name")?, source));
        let ty = node.child_by_field_name("type").and_then(|annotation| {
            let mut cursor = annotation.walk();
            let inner = annotation.named_children(&mut cursor).next();
            inner
        });
        Some(Self { name, ty })
    }

    /// The string value of a literal type such as `name: "User"`.
    pub fn string_literal(&self, source: &'t str) -> Option<&'t str> {
        let ty = self.ty?;
        (ty.kind() == "literal_type").then(|| unquote(node_text(ty, source)))
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
        .unwrap_or(text)
}

/// Object literals reachable from `node` without crossing another object literal.
///
/// Generic arguments, unions, arrays and parentheses are descended into, so
/// `Wrapper<{ a: 1 }, X>[] | null` yields the inner literal.
pub fn nested_objects(node: Node) -> Vec<ObjectType> {
    let mut out = Vec::new();
    collect_objects(node, &mut out);
    out
}

fn collect_objects<'t>(node: Node<'t>, out: &mut Vec<ObjectType<'t>>) {
    if let Some(object) = ObjectType::new(node) {
        out.push(object);
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_objects(child, out);
    }
}

/// Type names referenced by `node` (`Prisma.$PostPayload<X>[]` yields `$PostPayload`).
///
/// Qualifiers are dropped. Object literals are not descended into.
pub fn referenced_type_names<'s>(node: Node, source: &'s str) -> Vec<&'s str> {
    let mut out = Vec::new();
    collect_names(node, source, &mut out);
    out
}

fn collect_names<'s>(node: Node, source: &'s str, out: &mut Vec<&'s str>) {
    match node.kind() {
        "object_type" => return,
        "type_identifier" => {
            out.push(node_text(node, source));
            return;
        }
        "nested_type_identifier" => {
            if let Some(name) = node.child_by_field_name("name") {
                out.push(node_text(name, source));
            }
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_names(child, source, out);
    }
}
