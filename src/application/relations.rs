//! `_expand` (parent lookup) and `_embed` (child lookup) between collections.
//!
//! Relations follow the `<singular>Id` foreign key convention: a book with
//! `authorId: 1` expands to the `authors` record with `id: 1`, and an author
//! embeds the `books` whose `authorId` equals its id.

use serde_json::{Map, Value};

use super::filtering::{matches_id, scalar_text};
use crate::domain::QueryParams;

/// `libraries` -> `library`, `books` -> `book`.
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = name.strip_suffix('s') {
        stem.to_string()
    } else {
        name.to_string()
    }
}

/// `library` -> `libraries`, `author` -> `authors`.
pub fn pluralize(name: &str) -> String {
    let consonant_y = name.len() > 1
        && name.ends_with('y')
        && !name[..name.len() - 1].ends_with(|c: char| "aeiou".contains(c));
    if consonant_y {
        format!("{}ies", &name[..name.len() - 1])
    } else {
        format!("{name}s")
    }
}

/// Comma-separated relation names from a query key such as `_expand`.
pub fn relation_names<'q>(query: &'q QueryParams, key: &str) -> Vec<&'q str> {
    query
        .get(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Attach `record[parent]` from collection `pluralize(parent)` for every
/// requested parent. Unknown collections and dangling keys are skipped.
pub fn expand(record: &mut Value, parents: &[&str], resources: &Map<String, Value>) {
    let Value::Object(fields) = record else {
        return;
    };

    for parent in parents {
        let Some(foreign_key) = fields.get(&format!("{parent}Id")).and_then(scalar_text) else {
            continue;
        };
        let Some(Value::Array(candidates)) = resources.get(&pluralize(parent)) else {
            continue;
        };
        if let Some(found) = candidates
            .iter()
            .find(|candidate| matches_id(candidate.get("id"), &foreign_key))
        {
            fields.insert((*parent).to_string(), found.clone());
        }
    }
}

/// Attach `record[child]` = all records of collection `child` pointing back
/// at `record` through `<singular(resource)>Id`.
pub fn embed(
    record: &mut Value,
    resource: &str,
    children: &[&str],
    resources: &Map<String, Value>,
) {
    let Value::Object(fields) = record else {
        return;
    };
    let Some(id) = fields.get("id").and_then(scalar_text) else {
        return;
    };
    let foreign_key = format!("{}Id", singularize(resource));

    for child in children {
        let Some(Value::Array(candidates)) = resources.get(*child) else {
            continue;
        };
        let related: Vec<Value> = candidates
            .iter()
            .filter(|candidate| matches_id(candidate.get(&foreign_key), &id))
            .cloned()
            .collect();
        fields.insert((*child).to_string(), Value::Array(related));
    }
}

/// Apply `_expand` and `_embed` from `query` to one record.
pub fn attach_relations(
    record: &mut Value,
    resource: &str,
    query: &QueryParams,
    resources: &Map<String, Value>,
) {
    let parents = relation_names(query, "_expand");
    if !parents.is_empty() {
        expand(record, &parents, resources);
    }
    let children = relation_names(query, "_embed");
    if !children.is_empty() {
        embed(record, resource, &children, resources);
    }
}
