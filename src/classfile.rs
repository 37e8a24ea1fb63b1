//! Turns raw class-file bytes into the event stream the extractor consumes.
//!
//! Parsing is delegated to `ristretto_classfile`; this module only walks the
//! parsed structure in declaration order.

use std::io::Cursor;

use ristretto_classfile::attributes::{Annotation, AnnotationElement, Attribute};
use ristretto_classfile::{ClassFile, Constant, ConstantPool};

use crate::annotation::annotation_type_name;
use crate::descriptor::strip_object_wrapper;
use crate::error::{ExtractError, Result};
use crate::event::{Access, AnnotationEvent, AnnotationValue, ClassEvent};

pub fn class_events(entry: &str, bytes: Vec<u8>) -> Result<Vec<ClassEvent>> {
    let unreadable = |reason: String| ExtractError::UnreadableClass {
        entry: entry.to_string(),
        reason,
    };

    let class = ClassFile::from_bytes(&mut Cursor::new(bytes))
        .map_err(|e| unreadable(format!("failed to parse class file: {e:?}")))?;
    let pool = Pool(&class.constant_pool);

    let name = class
        .class_name()
        .map_err(|e| unreadable(format!("missing class name: {e:?}")))?
        .to_string();
    let super_name = if class.super_class == 0 {
        None
    } else {
        Some(pool.class(class.super_class).map_err(&unreadable)?)
    };
    let interfaces = class
        .interfaces
        .iter()
        .map(|&i| pool.class(i))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(&unreadable)?;

    let mut events = vec![ClassEvent::Begin {
        name,
        access: Access(class.access_flags.bits()),
        super_name,
        interfaces,
    }];
    push_annotations(&pool, &class.attributes, &mut events).map_err(&unreadable)?;

    for field in &class.fields {
        events.push(ClassEvent::Field {
            name: pool.utf8(field.name_index).map_err(&unreadable)?,
            descriptor: pool.utf8(field.descriptor_index).map_err(&unreadable)?,
            access: Access(field.access_flags.bits()),
        });
        push_annotations(&pool, &field.attributes, &mut events).map_err(&unreadable)?;
    }

    for method in &class.methods {
        events.push(ClassEvent::Method {
            name: pool.utf8(method.name_index).map_err(&unreadable)?,
            access: Access(method.access_flags.bits()),
        });
        push_annotations(&pool, &method.attributes, &mut events).map_err(&unreadable)?;
    }

    events.push(ClassEvent::End);
    Ok(events)
}

type PoolResult<T> = std::result::Result<T, String>;

struct Pool<'a>(&'a ConstantPool);

impl Pool<'_> {
    fn utf8(&self, index: u16) -> PoolResult<String> {
        self.0
            .try_get_utf8(index)
            .map(|s| s.to_string())
            .map_err(|e| format!("bad utf8 constant #{index}: {e:?}"))
    }

    fn class(&self, index: u16) -> PoolResult<String> {
        self.0
            .try_get_class(index)
            .map(|s| s.to_string())
            .map_err(|e| format!("bad class constant #{index}: {e:?}"))
    }

    fn constant_text(&self, index: u16) -> PoolResult<String> {
        match self.0.get(index) {
            Some(Constant::Utf8(value)) => Ok(value.to_string()),
            Some(Constant::Integer(value)) => Ok(value.to_string()),
            Some(Constant::Long(value)) => Ok(value.to_string()),
            Some(Constant::Float(value)) => Ok(floating_text(format!("{value:?}"))),
            Some(Constant::Double(value)) => Ok(floating_text(format!("{value:?}"))),
            Some(other) => Ok(format!("{other:?}")),
            None => Err(format!("missing constant #{index}")),
        }
    }

    fn int(&self, index: u16) -> PoolResult<i32> {
        match self.0.get(index) {
            Some(Constant::Integer(value)) => Ok(*value),
            _ => Err(format!("constant #{index} is not an integer")),
        }
    }
}

/// `1.0` rather than `1`, and `Infinity` rather than `inf`.
fn floating_text(debug: String) -> String {
    match debug.as_str() {
        "inf" => "Infinity".to_string(),
        "-inf" => "-Infinity".to_string(),
        _ => debug,
    }
}

fn push_annotations(
    pool: &Pool<'_>,
    attributes: &[Attribute],
    events: &mut Vec<ClassEvent>,
) -> PoolResult<()> {
    for attribute in attributes {
        let annotations = match attribute {
            Attribute::RuntimeVisibleAnnotations { annotations, .. }
            | Attribute::RuntimeInvisibleAnnotations { annotations, .. } => annotations,
            _ => continue,
        };
        for annotation in annotations {
            events.push(ClassEvent::Annotation(annotation_event(pool, annotation)?));
        }
    }
    Ok(())
}

fn annotation_event(pool: &Pool<'_>, annotation: &Annotation) -> PoolResult<AnnotationEvent> {
    Ok(AnnotationEvent {
        descriptor: pool.utf8(annotation.type_index)?,
        values: element_values(pool, annotation)?,
    })
}

fn element_values(pool: &Pool<'_>, annotation: &Annotation) -> PoolResult<Vec<AnnotationValue>> {
    annotation
        .elements
        .iter()
        .map(|pair| {
            let name = pool.utf8(pair.name_index)?;
            element_value(pool, Some(&name), &pair.value)
        })
        .collect()
}

fn element_value(
    pool: &Pool<'_>,
    name: Option<&str>,
    element: &AnnotationElement,
) -> PoolResult<AnnotationValue> {
    let value = match element {
        AnnotationElement::Enum {
            type_name_index,
            const_name_index,
        } => AnnotationValue::enumeration(
            name,
            &pool.utf8(*type_name_index)?,
            &pool.utf8(*const_name_index)?,
        ),
        AnnotationElement::Annotation { annotation } => AnnotationValue::nested(
            name,
            &pool.utf8(annotation.type_index)?,
            element_values(pool, annotation)?,
        ),
        other => AnnotationValue::plain(name, element_text(pool, other)?),
    };
    Ok(value)
}

/// Flat text of one element; arrays become `{a, b}`.
fn element_text(pool: &Pool<'_>, element: &AnnotationElement) -> PoolResult<String> {
    let text = match element {
        AnnotationElement::Boolean { const_value_index } => {
            (pool.int(*const_value_index)? != 0).to_string()
        }
        AnnotationElement::Char { const_value_index } => {
            let code = pool.int(*const_value_index)?;
            char::from_u32(code as u32)
                .map(String::from)
                .unwrap_or_else(|| code.to_string())
        }
        AnnotationElement::Byte { const_value_index }
        | AnnotationElement::Short { const_value_index }
        | AnnotationElement::Int { const_value_index }
        | AnnotationElement::Long { const_value_index }
        | AnnotationElement::Float { const_value_index }
        | AnnotationElement::Double { const_value_index }
        | AnnotationElement::String { const_value_index } => {
            pool.constant_text(*const_value_index)?
        }
        AnnotationElement::Class { class_info_index } => pool.utf8(*class_info_index)?,
        AnnotationElement::Enum {
            type_name_index,
            const_name_index,
        } => format!(
            "{}.{}",
            strip_object_wrapper(&pool.utf8(*type_name_index)?),
            pool.utf8(*const_name_index)?
        ),
        AnnotationElement::Annotation { annotation } => {
            format!("@{}", annotation_type_name(&pool.utf8(annotation.type_index)?))
        }
        AnnotationElement::Array { values } => {
            let items = values
                .iter()
                .map(|v| element_text(pool, v))
                .collect::<PoolResult<Vec<_>>>()?;
            format!("{{{}}}", items.join(", "))
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_reported_not_panicked() {
        let err = class_events("com/example/Broken.class", b"dummy".to_vec()).unwrap_err();
        assert_eq!(err.entry(), Some("com/example/Broken.class"));
        assert!(matches!(err, ExtractError::UnreadableClass { .. }));
    }

    #[test]
    fn floating_constants_keep_their_fraction() {
        assert_eq!(floating_text(format!("{:?}", 1.0f32)), "1.0");
        assert_eq!(floating_text(format!("{:?}", 2.5f64)), "2.5");
        assert_eq!(floating_text(format!("{:?}", 30f64)), "30.0");
        assert_eq!(floating_text(format!("{:?}", f64::INFINITY)), "Infinity");
        assert_eq!(floating_text(format!("{:?}", f32::NEG_INFINITY)), "-Infinity");
        assert_eq!(floating_text(format!("{:?}", f64::NAN)), "NaN");
    }

    #[test]
    fn empty_entry_is_unreadable() {
        assert!(class_events("com/example/Empty.class", Vec::new()).is_err());
    }
}
