//! Field type substitution inside a flat object literal.

use crate::schema::{Entity, Field};
use crate::syntax::{ObjectType, node_text};
use crate::writer::Patch;
use tree_sitter::Node;

/// Type names the Prisma client uses for untyped JSON values.
pub const JSON_BLOB_TYPES: &[&str] = &[
    "JsonValue",
    "InputJsonValue",
    "JsonObject",
    "InputJsonObject",
    "JsonArray",
    "InputJsonArray",
];

/// Members of a scalar-list wrapper (`UserCreatehistoryInput`) that carry list values.
const LIST_MEMBERS: &[&str] = &["set", "push"];

/// Replace the JSON blob references of every annotated field in `object`.
///
/// Only the blob reference itself is replaced; `?`, `| null`, null-value
/// inputs and array brackets around it stay as they are. Returns the number
/// of fields that received at least one edit.
pub fn rewrite_object<'t>(
    object: ObjectType<'t>,
    entity: &Entity,
    source: &'t str,
    patch: &mut Patch,
) -> usize {
    let mut rewritten = 0;
    for property in object.properties(source) {
        let Some(annotation) = entity.annotation_for(property.name) else {
            continue;
        };
        if let Some(ty) = property.ty
            && rewrite_type(ty, annotation, source, patch)
        {
            rewritten += 1;
        }
    }
    rewritten
}

/// Rewrite the `set`/`push` members of a scalar-list wrapper with `field`'s annotation.
pub fn rewrite_list_wrapper<'t>(
    object: ObjectType<'t>,
    field: &Field,
    source: &'t str,
    patch: &mut Patch,
) -> usize {
    let Some(annotation) = field.annotation.as_deref() else {
        return 0;
    };
    object
        .properties(source)
        .into_iter()
        .filter(|p| LIST_MEMBERS.contains(&p.name))
        .filter_map(|p| p.ty)
        .filter(|&ty| rewrite_type(ty, annotation, source, patch))
        .count()
}

/// Schedule replacing every blob reference in `ty` with `annotation`.
fn rewrite_type(ty: Node, annotation: &str, source: &str, patch: &mut Patch) -> bool {
    if mentions_blob(annotation) && contains_word(node_text(ty, source), annotation) {
        // Already rewritten with an annotation that itself names a blob type.
        return false;
    }

    let mut blobs = Vec::new();
    collect_blob_refs(ty, source, &mut blobs);
    for blob in &blobs {
        let text = if needs_parens(blob.parent().map(|p| p.kind()), annotation) {
            format!("({annotation})")
        } else {
            annotation.to_string()
        };
        patch.replace(blob.start_byte(), blob.end_byte(), text);
    }
    !blobs.is_empty()
}

/// Blob references sit at the top of a field type, in a union member, an
/// array element or parentheses. Generic arguments and object literals are
/// someone else's types and are left alone.
fn collect_blob_refs<'t>(node: Node<'t>, source: &str, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "type_identifier" => {
            if JSON_BLOB_TYPES.contains(&node_text(node, source)) {
                out.push(node);
            }
        }
        "nested_type_identifier" => {
            let is_blob = node
                .child_by_field_name("name")
                .is_some_and(|n| JSON_BLOB_TYPES.contains(&node_text(n, source)));
            if is_blob {
                out.push(node);
            }
        }
        "union_type" | "array_type" | "parenthesized_type" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_blob_refs(child, source, out);
            }
        }
        _ => {}
    }
}

fn needs_parens(parent: Option<&str>, annotation: &str) -> bool {
    match parent {
        Some("array_type") => !is_plain_reference(annotation),
        Some("union_type") => binding(annotation) == Binding::Loose,
        Some("intersection_type") => binding(annotation) < Binding::Intersection,
        _ => false,
    }
}

/// `Foo`, `PrismaJson.Foo`: safe to use as an array element without parentheses.
fn is_plain_reference(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// Loosest operator at the top level of a type expression, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Binding {
    /// Function, constructor or conditional type.
    Loose,
    Union,
    Intersection,
    Tight,
}

fn binding(text: &str) -> Binding {
    let trimmed = text.trim_start();
    if trimmed.starts_with("new ") || trimmed.starts_with("abstract new ") {
        return Binding::Loose;
    }

    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quote = None;
    let mut loosest = Binding::Tight;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == b'\\' {
                i += 1;
            } else if c == q {
                quote = None;
            }
        } else {
            match c {
                b'\'' | b'"' | b'`' => quote = Some(c),
                b'=' if bytes.get(i + 1) == Some(&b'>') => {
                    if depth == 0 {
                        return Binding::Loose;
                    }
                    i += 1;
                }
                b'(' | b'[' | b'{' | b'<' => depth += 1,
                b')' | b']' | b'}' | b'>' => depth -= 1,
                b'?' if depth == 0 => return Binding::Loose,
                b'|' if depth == 0 => loosest = loosest.min(Binding::Union),
                b'&' if depth == 0 => loosest = loosest.min(Binding::Intersection),
                _ => {}
            }
        }
        i += 1;
    }
    loosest
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether `needle` occurs in `haystack` without identifier characters on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    haystack.match_indices(needle).any(|(at, _)| {
        let before = at.checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(at + needle.len()).copied();
        !before.is_some_and(is_ident_byte) && !after.is_some_and(is_ident_byte)
    })
}

fn mentions_blob(annotation: &str) -> bool {
    JSON_BLOB_TYPES.iter().any(|blob| contains_word(annotation, blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityKind, Field};
    use crate::syntax::parse_module;

    fn user() -> Entity {
        Entity {
            name: "User".into(),
            kind: EntityKind::Model,
            fields: vec![
                Field {
                    name: "id".into(),
                    field_type: "String".into(),
                    annotation: None,
                },
                Field {
                    name: "settings".into(),
                    field_type: "Json".into(),
                    annotation: Some("{ theme: 'dark' | 'light' }".into()),
                },
                Field {
                    name: "tags".into(),
                    field_type: "Json".into(),
                    annotation: Some("PrismaJson.Tag".into()),
                },
                Field {
                    name: "raw".into(),
                    field_type: "Json".into(),
                    annotation: None,
                },
            ],
        }
    }

    fn rewrite(source: &str, entity: &Entity) -> (String, usize) {
        let tree = parse_module(source, "t.ts").unwrap();
        let decl = tree.root_node().named_child(0).unwrap();
        let value = decl.child_by_field_name("value").unwrap();
        let object = ObjectType::new(value).unwrap();
        let mut patch = Patch::new();
        let count = rewrite_object(object, entity, source, &mut patch);
        (patch.apply(source).unwrap(), count)
    }

    #[test]
    fn test_replaces_annotated_fields_only() {
        let (out, count) = rewrite(
            "type UserCreateInput = { id: string; settings: Prisma.JsonValue; raw: Prisma.JsonValue }",
            &user(),
        );
        assert_eq!(
            out,
            "type UserCreateInput = { id: string; settings: { theme: 'dark' | 'light' }; raw: Prisma.JsonValue }"
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_preserves_optional_nullable_array() {
        let source = "type T = {\n  settings?: (InputJsonValue)[] | null\n  tags?: NullableJsonNullValueInput | InputJsonValue[]\n}";
        let (out, count) = rewrite(source, &user());
        assert_eq!(
            out,
            "type T = {\n  settings?: ({ theme: 'dark' | 'light' })[] | null\n  tags?: NullableJsonNullValueInput | PrismaJson.Tag[]\n}"
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn test_array_element_is_parenthesized() {
        let (out, _) = rewrite("type T = { settings: JsonValue[] }", &user());
        assert_eq!(out, "type T = { settings: ({ theme: 'dark' | 'light' })[] }");
    }

    #[test]
    fn test_filters_are_untouched() {
        let source = "type UserWhereInput = { settings?: JsonNullableFilter<\"User\"> }";
        let (out, count) = rewrite(source, &user());
        assert_eq!(out, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_already_rewritten_is_stable() {
        let source = "type T = { tags: PrismaJson.Tag | null }";
        let (out, count) = rewrite(source, &user());
        assert_eq!(out, source);
        assert_eq!(count, 0);
    }

    fn field(name: &str, annotation: &str) -> Entity {
        Entity {
            name: "User".into(),
            kind: EntityKind::Model,
            fields: vec![Field {
                name: name.into(),
                field_type: "Json".into(),
                annotation: Some(annotation.into()),
            }],
        }
    }

    #[test]
    fn test_loose_annotation_keeps_union_members() {
        let entity = field("cb", "() => string");
        let (out, _) = rewrite("type T = { cb: JsonValue | null }", &entity);
        assert_eq!(out, "type T = { cb: (() => string) | null }");

        let entity = field("cb", "T extends string ? 'a' : 'b'");
        let (out, _) = rewrite(
            "type T = { cb?: NullableJsonNullValueInput | InputJsonValue }",
            &entity,
        );
        assert_eq!(
            out,
            "type T = { cb?: NullableJsonNullValueInput | (T extends string ? 'a' : 'b') }"
        );

        // Unions nest without parentheses.
        let entity = field("cb", "'a' | 'b'");
        let (out, _) = rewrite("type T = { cb: JsonValue | null }", &entity);
        assert_eq!(out, "type T = { cb: 'a' | 'b' | null }");
    }

    #[test]
    fn test_annotation_naming_blob_is_stable() {
        let entity = field("meta", "Record<string, Prisma.JsonValue>");
        let (first, count) = rewrite("type T = { meta: Prisma.JsonValue | null }", &entity);
        assert_eq!(first, "type T = { meta: Record<string, Prisma.JsonValue> | null }");
        assert_eq!(count, 1);

        let (second, count) = rewrite(&first, &entity);
        assert_eq!(second, first);
        assert_eq!(count, 0);

        let entity = field("meta", "Prisma.JsonValue[] | string");
        let (first, _) = rewrite("type T = { meta: InputJsonValue }", &entity);
        let (second, count) = rewrite(&first, &entity);
        assert_eq!(second, first);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_generic_arguments_are_not_descended() {
        let entity = field("meta", "PrismaJson.Meta");
        let (out, count) = rewrite("type T = { meta: Wrapper<JsonValue> }", &entity);
        assert_eq!(out, "type T = { meta: Wrapper<JsonValue> }");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_binding_levels() {
        assert_eq!(binding("PrismaJson.Tag"), Binding::Tight);
        assert_eq!(binding("{ a?: string; b: () => void }"), Binding::Tight);
        assert_eq!(binding("Array<'|'>"), Binding::Tight);
        assert_eq!(binding("A & B"), Binding::Intersection);
        assert_eq!(binding("'a' | 'b'"), Binding::Union);
        assert_eq!(binding("(x: number) => string"), Binding::Loose);
        assert_eq!(binding("new () => Foo"), Binding::Loose);
        assert_eq!(binding("T extends U ? X : Y"), Binding::Loose);
    }

    #[test]
    fn test_list_wrapper_members() {
        let source = "type UserUpdatehistoryInput = {\n  set?: InputJsonValue[]\n  push?: InputJsonValue | InputJsonValue[]\n}";
        let tree = parse_module(source, "t.ts").unwrap();
        let value = tree
            .root_node()
            .named_child(0)
            .unwrap()
            .child_by_field_name("value")
            .unwrap();
        let history = Field {
            name: "history".into(),
            field_type: "Json".into(),
            annotation: Some("PrismaJson.Entry".into()),
        };
        let mut patch = Patch::new();
        let object = ObjectType::new(value).unwrap();
        let count = rewrite_list_wrapper(object, &history, source, &mut patch);
        assert_eq!(count, 2);
        assert_eq!(
            patch.apply(source).unwrap(),
            "type UserUpdatehistoryInput = {\n  set?: PrismaJson.Entry[]\n  push?: PrismaJson.Entry | PrismaJson.Entry[]\n}"
        );
    }

    #[test]
    fn test_plain_reference() {
        assert!(is_plain_reference("PrismaJson.Tag"));
        assert!(!is_plain_reference("'a' | 'b'"));
        assert!(!is_plain_reference("Record<string, number>"));
        assert!(!is_plain_reference(""));
    }
}
