//! Query Template Catalog
//!
//! The closed set of parameterized traversal queries, one per
//! `(edge kind, mode)` pair plus the two-node "mixed" variants. Only this
//! module assembles query text; business logic never sees backend syntax,
//! so a backend swap touches this file and the codec only.
//!
//! Variables bound by the graph client:
//!
//! - `$id` - source node's external id (all templates)
//! - `$other` - second node's external id (mixed templates)
//! - `$after` / `$first` - page cursor and size (`Page` mode)
//! - `$target` - probed external id (`Lookup` mode)

use crate::models::{EdgeKind, MixedKind, QueryMode};

/// Predicate holding a node's external identifier
pub const ID_PREDICATE: &str = "entity.id";

/// Predicate holding a node's kind label
pub const KIND_PREDICATE: &str = "entity.kind";

/// Single-node traversal template for `(kind, mode)`
pub fn edge_query(kind: EdgeKind, mode: QueryMode) -> String {
    let predicate = kind.predicate();
    match mode {
        QueryMode::Page => format!(
            "query edge_page($id: string, $after: string, $first: int) {{\n\
             \x20 source as var(func: eq(entity.id, $id))\n\
             \x20 declaration(func: uid(source)) {{ entity.id }}\n\
             \x20 matches(func: uid(source)) {{\n\
             \x20   {predicate} (first: $first, after: $after) {{ entity.id }}\n\
             \x20 }}\n\
             }}"
        ),
        QueryMode::Lookup => format!(
            "query edge_lookup($id: string, $target: string) {{\n\
             \x20 source as var(func: eq(entity.id, $id))\n\
             \x20 declaration(func: uid(source)) {{ entity.id }}\n\
             \x20 matches(func: uid(source)) {{\n\
             \x20   {predicate} @filter(eq(entity.id, $target)) {{ entity.id }}\n\
             \x20 }}\n\
             }}"
        ),
        QueryMode::Count => format!(
            "query edge_count($id: string) {{\n\
             \x20 source as var(func: eq(entity.id, $id))\n\
             \x20 matches(func: uid(source)) {{ count({predicate}) }}\n\
             }}"
        ),
    }
}

/// Two-node intersection/difference template for `(kind, mode)`
pub fn mixed_query(kind: MixedKind, mode: QueryMode) -> String {
    let name = kind.name();
    let (var_blocks, filter) = match kind {
        MixedKind::FriendsInCommon => (
            "  a as var(func: eq(entity.id, $id)) { fa as friend }\n\
             \x20 b as var(func: eq(entity.id, $other)) { fb as friend }",
            "func: uid(fa)) @filter(uid(fb)",
        ),
        MixedKind::FriendsNotInCommon => (
            "  a as var(func: eq(entity.id, $id)) { fa as friend }\n\
             \x20 b as var(func: eq(entity.id, $other)) { fb as friend }",
            "func: uid(fa)) @filter(NOT uid(fb)",
        ),
        MixedKind::FollowersInCommon => (
            "  a as var(func: eq(entity.id, $id)) { fa as ~follows }\n\
             \x20 b as var(func: eq(entity.id, $other)) { fb as ~follows }",
            "func: uid(fa)) @filter(uid(fb)",
        ),
    };

    match mode {
        QueryMode::Page => format!(
            "query {name}_page($id: string, $other: string, $after: string, $first: int) {{\n\
             {var_blocks}\n\
             \x20 declaration(func: uid(a)) {{ entity.id }}\n\
             \x20 matches({filter}, first: $first, after: $after) {{ entity.id }}\n\
             }}"
        ),
        QueryMode::Lookup => format!(
            "query {name}_lookup($id: string, $other: string, $target: string) {{\n\
             {var_blocks}\n\
             \x20 declaration(func: uid(a)) {{ entity.id }}\n\
             \x20 matches({filter} AND eq(entity.id, $target)) {{ entity.id }}\n\
             }}"
        ),
        QueryMode::Count => format!(
            "query {name}_count($id: string, $other: string) {{\n\
             {var_blocks}\n\
             \x20 matches({filter}) {{ count(uid) }}\n\
             }}"
        ),
    }
}

/// Per-node count summary across every edge predicate
///
/// Response parses with [`crate::graph::codec::parse_count_map`].
pub fn count_summary_query() -> String {
    let counts: Vec<String> = EdgeKind::ALL
        .iter()
        .map(|kind| format!("    count({})", kind.predicate()))
        .collect();

    format!(
        "query edge_counts($id: string) {{\n\
         \x20 source as var(func: eq(entity.id, $id))\n\
         \x20 matches(func: uid(source)) {{\n\
         {}\n\
         \x20 }}\n\
         }}",
        counts.join("\n")
    )
}

/// Per-node edge listing summary across every edge predicate
///
/// Response parses with [`crate::graph::codec::parse_predicate_map`].
pub fn edge_summary_query() -> String {
    let blocks: Vec<String> = EdgeKind::ALL
        .iter()
        .map(|kind| format!("    {} {{ entity.id }}", kind.predicate()))
        .collect();

    format!(
        "query edge_summary($id: string) {{\n\
         \x20 source as var(func: eq(entity.id, $id))\n\
         \x20 matches(func: uid(source)) {{\n\
         {}\n\
         \x20 }}\n\
         }}",
        blocks.join("\n")
    )
}
