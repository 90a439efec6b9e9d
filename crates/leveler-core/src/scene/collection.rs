//! Collection (grouping) tree

use serde::Deserialize;

use super::PropertyBag;

/// A named group of objects, possibly nested
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Names of objects linked directly into this collection
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub children: Vec<Collection>,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a directly linked object
    pub fn with_object(mut self, name: impl Into<String>) -> Self {
        self.objects.push(name.into());
        self
    }

    /// Add a child collection
    pub fn with_child(mut self, child: Collection) -> Self {
        self.children.push(child);
        self
    }

    /// Returns true if the object is linked directly into this collection
    pub fn contains_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o == name)
    }
}
