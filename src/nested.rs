//! Compiled nested-class names and the parent -> children index.
//!
//! `com/example/Outer$Inner` is recorded as `com.example.Inner` and registered
//! as a child of `com.example.Outer`. Only the first `$` of the last path
//! segment splits, so `Outer$Inner$Deep` yields `Inner$Deep` under `Outer`.

use indexmap::{IndexMap, IndexSet};

const NESTED_MARKER: char = '$';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub parent: Option<String>,
}

impl ResolvedName {
    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }
}

pub fn resolve_name(raw: &str) -> ResolvedName {
    let dotted = raw.replace('/', ".");
    let (package, last) = match dotted.rsplit_once('.') {
        Some((package, last)) => (Some(package), last),
        None => (None, dotted.as_str()),
    };

    let qualify = |simple: &str| match package {
        Some(package) => format!("{package}.{simple}"),
        None => simple.to_string(),
    };

    match last.split_once(NESTED_MARKER) {
        Some((outer, own)) if !outer.is_empty() && !own.is_empty() => ResolvedName {
            name: qualify(own),
            parent: Some(qualify(outer)),
        },
        _ => ResolvedName {
            name: dotted.clone(),
            parent: None,
        },
    }
}

/// Filled while the archive is walked and read only once the walk is over:
/// a child can be seen before its parent.
#[derive(Debug, Clone, Default)]
pub struct NestedClassIndex {
    children: IndexMap<String, IndexSet<String>>,
}

impl NestedClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, parent: &str, child: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());
    }

    pub fn children_of(&self, parent: &str) -> Option<&IndexSet<String>> {
        self.children.get(parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
