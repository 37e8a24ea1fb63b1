use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::warn;

use crate::extract::ExtractedClass;
use crate::model::{ClassRecord, DependencyModel, ExternalDependencyRecord};
use crate::nested::NestedClassIndex;

/// Collects classes and external dependencies in the order they are seen.
///
/// Nested-class lists are attached in [`ModelBuilder::finish`], once every
/// class of the archive has been added.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    classes: Vec<ClassRecord>,
    latest_by_name: HashMap<String, usize>,
    class_names: IndexSet<String>,
    nested: NestedClassIndex,
    external: Vec<ExternalDependencyRecord>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, extracted: ExtractedClass) {
        let ExtractedClass { record, parent } = extracted;
        if let Some(parent) = parent.as_deref() {
            self.nested.register(parent, &record.name);
        }
        self.class_names.insert(record.name.clone());
        self.latest_by_name
            .insert(record.name.clone(), self.classes.len());
        self.classes.push(record);
    }

    pub fn add_external<I>(&mut self, dependencies: I)
    where
        I: IntoIterator<Item = ExternalDependencyRecord>,
    {
        self.external.extend(dependencies);
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn nested_index(&self) -> &NestedClassIndex {
        &self.nested
    }

    pub fn finish(self) -> DependencyModel {
        let ModelBuilder {
            mut classes,
            latest_by_name,
            class_names,
            nested,
            external,
        } = self;

        for (parent, children) in nested.iter() {
            match latest_by_name.get(parent) {
                Some(&i) => classes[i].nested_classes = children.iter().cloned().collect(),
                None => warn!("nested classes registered under unknown parent {parent}"),
            }
        }

        DependencyModel {
            classes,
            external_dependencies: external,
            class_names: class_names.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::event::{Access, ClassEvent};
    use crate::extract::extract_class;
    use crate::namespace::Namespace;

    fn class(raw: &str) -> Result<ExtractedClass> {
        let ns = Namespace::new("com.example");
        extract_class(
            raw,
            [
                ClassEvent::Begin {
                    name: raw.to_string(),
                    access: Access(Access::PUBLIC),
                    super_name: Some("java/lang/Object".to_string()),
                    interfaces: Vec::new(),
                },
                ClassEvent::End,
            ],
            &ns,
        )
    }

    #[test]
    fn children_attach_whatever_the_visit_order() -> Result<()> {
        let mut builder = ModelBuilder::new();
        builder.add_class(class("com/example/Outer$Inner")?);
        builder.add_class(class("com/example/Outer")?);
        builder.add_class(class("com/example/Outer$Other")?);

        let model = builder.finish();
        let outer = model
            .classes
            .iter()
            .find(|c| c.name == "com.example.Outer")
            .cloned();
        let outer = outer.map(|c| c.nested_classes).unwrap_or_default();
        assert_eq!(outer, vec!["com.example.Inner", "com.example.Other"]);
        assert!(model.classes[0].is_nested);
        Ok(())
    }

    #[test]
    fn class_names_are_distinct() -> Result<()> {
        let mut builder = ModelBuilder::new();
        builder.add_class(class("com/example/A")?);
        builder.add_class(class("com/example/A")?);
        builder.add_class(class("com/example/B")?);
        assert_eq!(builder.class_count(), 3);

        let model = builder.finish();
        assert_eq!(model.class_names, vec!["com.example.A", "com.example.B"]);
        Ok(())
    }

    #[test]
    fn orphan_children_are_dropped_from_the_model() -> Result<()> {
        let mut builder = ModelBuilder::new();
        builder.add_class(class("com/example/Gone$Child")?);
        assert_eq!(builder.nested_index().len(), 1);

        let model = builder.finish();
        assert_eq!(model.classes.len(), 1);
        assert!(model.classes[0].nested_classes.is_empty());
        Ok(())
    }

    #[test]
    fn external_dependencies_keep_order() {
        let mut builder = ModelBuilder::new();
        builder.add_external([
            ExternalDependencyRecord {
                group_id: "g".into(),
                artifact_id: "a".into(),
                ..Default::default()
            },
            ExternalDependencyRecord {
                group_id: "g".into(),
                artifact_id: "b".into(),
                ..Default::default()
            },
        ]);
        let model = builder.finish();
        let ids: Vec<_> = model
            .external_dependencies
            .iter()
            .map(|d| d.artifact_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
