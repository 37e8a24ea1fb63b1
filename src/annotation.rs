//! Canonical text rendering of annotation occurrences.
//!
//! `@com.example.Cached` when no element was visited, otherwise
//! `@com.example.Cached(ttl = 30, unit = java/util/concurrent/TimeUnit.SECONDS)`
//! with elements in visit order.
//!
//! Enum constants keep the slash-separated type name while nested annotation
//! types are dotted. Stored models depend on this exact text, so the two stay
//! as they are.

use crate::descriptor::{internal_to_dotted, strip_object_wrapper};
use crate::event::{AnnotationEvent, AnnotationValue};

#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    type_name: String,
    parameters: Vec<String>,
}

impl SignatureBuilder {
    /// `type_name` is the dotted annotation type, without the leading `@`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn from_descriptor(descriptor: &str) -> Self {
        Self::new(annotation_type_name(descriptor))
    }

    pub fn plain(&mut self, name: Option<&str>, value: &str) {
        match name {
            Some(name) => self.parameters.push(format!("{name} = {value}")),
            None => self.parameters.push(value.to_string()),
        }
    }

    pub fn enum_value(&mut self, name: Option<&str>, descriptor: &str, constant: &str) {
        let rendered = format!("{}.{constant}", strip_object_wrapper(descriptor));
        match name {
            Some(name) => self.parameters.push(format!("{name} = {rendered}")),
            None => self.parameters.push(rendered),
        }
    }

    /// Records the nested annotation and hands back the builder its own
    /// elements go to. Nested elements share this builder's parameter list.
    pub fn nested(&mut self, name: Option<&str>, descriptor: &str) -> &mut Self {
        let nested_type = annotation_type_name(descriptor);
        match name {
            Some(name) => self.parameters.push(format!("{name} = @{nested_type}")),
            None => self.parameters.push(format!("@{nested_type}")),
        }
        self
    }

    pub fn apply(&mut self, value: &AnnotationValue) {
        match value {
            AnnotationValue::Plain { name, value } => self.plain(name.as_deref(), value),
            AnnotationValue::Enum {
                name,
                descriptor,
                constant,
            } => self.enum_value(name.as_deref(), descriptor, constant),
            AnnotationValue::Nested {
                name,
                descriptor,
                values,
            } => {
                let inner = self.nested(name.as_deref(), descriptor);
                for value in values {
                    inner.apply(value);
                }
            }
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn finish(self) -> String {
        if self.parameters.is_empty() {
            format!("@{}", self.type_name)
        } else {
            format!("@{}({})", self.type_name, self.parameters.join(", "))
        }
    }
}

pub fn format_annotation(event: &AnnotationEvent) -> String {
    let mut builder = SignatureBuilder::from_descriptor(&event.descriptor);
    for value in &event.values {
        builder.apply(value);
    }
    builder.finish()
}

/// `Lorg/springframework/stereotype/Service;` -> `org.springframework.stereotype.Service`.
pub fn annotation_type_name(descriptor: &str) -> String {
    internal_to_dotted(strip_object_wrapper(descriptor))
}

/// Last segment of the annotation type, e.g. `RestController`.
pub fn simple_name(descriptor: &str) -> String {
    let dotted = annotation_type_name(descriptor);
    match dotted.rsplit_once('.') {
        Some((_, simple)) => simple.to_string(),
        None => dotted,
    }
}
