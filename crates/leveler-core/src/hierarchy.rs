//! Collection hierarchy resolution

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::properties::serialize_properties;
use crate::scene::Collection;

/// Collection name to parent collection name (`None` for top-level collections)
pub type CollectionHierarchy = BTreeMap<String, Option<String>>;

/// Flatten the collection tree under the implicit root into a parent lookup
///
/// A collection linked in several places keeps the first parent found in
/// depth-first order and is only descended once.
pub fn collection_hierarchy(roots: &[Collection]) -> CollectionHierarchy {
    let mut hierarchy = CollectionHierarchy::new();
    for root in roots {
        visit(root, None, &mut hierarchy);
    }
    hierarchy
}

fn visit(collection: &Collection, parent: Option<&str>, hierarchy: &mut CollectionHierarchy) {
    if hierarchy.contains_key(&collection.name) {
        return;
    }
    hierarchy.insert(collection.name.clone(), parent.map(str::to_string));

    for child in &collection.children {
        visit(child, Some(&collection.name), hierarchy);
    }
}

/// Collections an object is directly linked into, in depth-first order
pub fn object_collections<'a>(roots: &'a [Collection], object: &str) -> Vec<&'a Collection> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    for root in roots {
        collect_memberships(root, object, &mut seen, &mut found);
    }
    found
}

fn collect_memberships<'a>(
    collection: &'a Collection,
    object: &str,
    seen: &mut HashSet<&'a str>,
    found: &mut Vec<&'a Collection>,
) {
    if !seen.insert(collection.name.as_str()) {
        return;
    }
    if collection.contains_object(object) {
        found.push(collection);
    }
    for child in &collection.children {
        collect_memberships(child, object, seen, found);
    }
}

/// Membership names plus each collection's serialized properties
pub struct Memberships {
    pub names: Vec<String>,
    pub properties: BTreeMap<String, Map<String, Value>>,
}

/// Resolve an object's memberships and attach every collection's custom properties
pub fn memberships(roots: &[Collection], object: &str) -> Memberships {
    let collections = object_collections(roots, object);
    Memberships {
        names: collections.iter().map(|c| c.name.clone()).collect(),
        properties: collections
            .iter()
            .map(|c| (c.name.clone(), serialize_properties(&c.properties)))
            .collect(),
    }
}
