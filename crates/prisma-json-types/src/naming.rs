//! Names the Prisma client generator emits for each model and composite type.
//!
//! Direct names are produced from a fixed list of templates. Relation wrapper
//! variants embed a relation field name (`PostCreateWithoutAuthorInput`) and
//! cannot be enumerated from the entity name alone, so they are recognized by
//! [`relation_patterns`] and [`list_field_splits`] instead.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Templates for direct aliases. `%` is replaced by the entity name.
const ALIAS_TEMPLATES: &[&str] = &[
    "%",
    "$%Payload",
    // Output shapes
    "%GroupByOutputType",
    "%CountAggregateOutputType",
    "%MinAggregateOutputType",
    "%MaxAggregateOutputType",
    "%AvgAggregateOutputType",
    "%SumAggregateOutputType",
    "%CountOutputType",
    // Filters and ordering
    "%WhereInput",
    "%WhereUniqueInput",
    "%ScalarWhereInput",
    "%ScalarWhereWithAggregatesInput",
    "%OrderByWithRelationInput",
    "%OrderByWithRelationAndSearchRelevanceInput",
    "%OrderByWithAggregationInput",
    // Create / update inputs
    "%CreateInput",
    "%UncheckedCreateInput",
    "%CreateManyInput",
    "%UpdateInput",
    "%UncheckedUpdateInput",
    "%UpdateManyMutationInput",
    "%UncheckedUpdateManyInput",
    // Composite type inputs
    "%ObjectEqualityInput",
    "%CreateEnvelopeInput",
    "%UpdateEnvelopeInput",
    "%ListCreateEnvelopeInput",
    "%ListUpdateEnvelopeInput",
    "%UpsertInput",
    "%UpdateManyInput",
    "%DeleteManyInput",
    "%CompositeFilter",
    "%CompositeListFilter",
    "%NullableCompositeFilter",
    "%OrderByInput",
    "%OrderByCompositeAggregateInput",
];

/// The payload alias for an entity (`$UserPayload`).
pub fn payload_name(entity: &str) -> String {
    format!("${entity}Payload")
}

/// Every direct alias the generator emits for `entity`, in sorted order.
pub fn names_for(entity: &str) -> BTreeSet<String> {
    ALIAS_TEMPLATES
        .iter()
        .map(|template| template.replace('%', entity))
        .collect()
}

/// Entity names `base` for which `alias` is one of [`names_for`]`(base)`.
///
/// Lets the classifier recognize aliases of unannotated entities without
/// registering them in the alias map.
pub fn template_bases(alias: &str) -> impl Iterator<Item = &str> {
    ALIAS_TEMPLATES.iter().filter_map(move |template| {
        let (prefix, suffix) = template.split_once('%')?;
        let base = alias.strip_prefix(prefix)?.strip_suffix(suffix)?;
        (!base.is_empty()).then_some(base)
    })
}

/// A relation wrapper naming shape: an entity name followed by a fixed suffix.
pub struct RelationPattern {
    pub name: &'static str,
    /// `^\w+?(?:<suffix>)$`, used to reject non-matching aliases quickly.
    whole: Regex,
    /// `^(?:<suffix>)$`, tried at every split point.
    suffix: Regex,
}

impl RelationPattern {
    fn new(name: &'static str, suffix: &str) -> Self {
        let compile =
            |pattern: String| Regex::new(&pattern).expect("relation pattern is a valid regex");
        Self {
            name,
            whole: compile(format!(r"^\w+?(?:{suffix})$")),
            suffix: compile(format!("^(?:{suffix})$")),
        }
    }

    /// Every base name `alias` could embed under this shape, shortest first.
    ///
    /// A suffix keyword can also end an entity name (`WishList` +
    /// `RelationFilter`), so all splits are offered and the caller picks the
    /// one that names an entity.
    pub fn bases<'a>(&self, alias: &'a str) -> impl Iterator<Item = &'a str> {
        let matched = self.whole.is_match(alias);
        (1..alias.len())
            .filter(move |_| matched)
            .filter(move |&at| alias.is_char_boundary(at) && self.suffix.is_match(&alias[at..]))
            .map(move |at| &alias[..at])
    }

    /// The captured `field` group for the split at `base`, if the shape has one.
    fn field<'a>(&self, alias: &'a str, base: &str) -> Option<&'a str> {
        self.suffix
            .captures(&alias[base.len()..])
            .and_then(|c| c.name("field"))
            .map(|m| m.as_str())
    }
}

/// The relation shapes, in the order they are tried.
pub fn relation_patterns() -> &'static [RelationPattern] {
    static PATTERNS: OnceLock<Vec<RelationPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            RelationPattern::new(
                "without-relation",
                r"(?:Unchecked)?(?:Create|Update|Upsert)(?:OrConnect|Nested(?:Many|One)|Many(?:WithWhere)?|One(?:Required)?|ToOneWithWhere|WithWhereUnique)?Without\w+?(?:Nested)?Input",
            ),
            RelationPattern::new("create-many-relation", r"CreateMany\w+?Input(?:Envelope)?"),
            RelationPattern::new(
                "relation-filter",
                r"(?:List|Nullable)?(?:Scalar)?RelationFilter",
            ),
            RelationPattern::new("relation-aggregate-order", r"OrderByRelationAggregateInput"),
        ]
    })
}

/// Scalar-list wrappers: `UserCreatehistoryInput`, `UserUpdatehistoryInput`.
fn list_pattern() -> &'static RelationPattern {
    static PATTERN: OnceLock<RelationPattern> = OnceLock::new();
    PATTERN.get_or_init(|| {
        RelationPattern::new("scalar-list", r"(?:Create|Update)(?P<field>[a-z]\w*)Input")
    })
}

/// Every `(entity, field)` split of a scalar-list wrapper alias, shortest entity first.
pub fn list_field_splits(alias: &str) -> impl Iterator<Item = (&str, &str)> {
    let pattern = list_pattern();
    pattern
        .bases(alias)
        .filter_map(move |base| pattern.field(alias, base).map(|field| (base, field)))
}
