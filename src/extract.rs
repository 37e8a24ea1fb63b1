//! Folds one class's event stream into a [`ClassRecord`].

use indexmap::IndexSet;
use tracing::debug;

use crate::annotation::{format_annotation, simple_name};
use crate::error::{ExtractError, Result};
use crate::event::{Access, AnnotationEvent, ClassEvent};
use crate::members::{FieldBuilder, MethodBuilder, extract_route, is_route_annotation, is_skipped_method};
use crate::model::{ClassKind, ClassRecord, ClassRole, RouteInfo};
use crate::namespace::{Namespace, Supertype};
use crate::nested::resolve_name;

/// A finished class plus the enclosing class it must be registered under.
#[derive(Debug, Clone)]
pub struct ExtractedClass {
    pub record: ClassRecord,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Class,
    Field(usize),
    Method(usize),
    Ignored,
}

#[derive(Debug)]
struct Header {
    name: String,
    parent: Option<String>,
    kind: ClassKind,
    supertype: Supertype,
    interfaces: IndexSet<String>,
}

pub struct ClassExtractor<'a> {
    entry: &'a str,
    namespace: &'a Namespace,
    header: Option<Header>,
    target: Target,
    class_annotations: Vec<AnnotationEvent>,
    fields: Vec<FieldBuilder>,
    methods: Vec<MethodBuilder>,
}

impl<'a> ClassExtractor<'a> {
    pub fn new(entry: &'a str, namespace: &'a Namespace) -> Self {
        Self {
            entry,
            namespace,
            header: None,
            target: Target::Class,
            class_annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Returns the finished class on [`ClassEvent::End`].
    pub fn feed(&mut self, event: ClassEvent) -> Result<Option<ExtractedClass>> {
        match event {
            ClassEvent::Begin {
                name,
                access,
                super_name,
                interfaces,
            } => {
                if self.header.is_some() {
                    return Err(self.broken("second class header in one stream"));
                }
                self.header = Some(self.begin(&name, access, super_name.as_deref(), &interfaces));
            }
            ClassEvent::Field {
                name,
                descriptor,
                access,
            } => {
                self.require_header()?;
                self.fields.push(FieldBuilder::new(&name, &descriptor, access));
                self.target = Target::Field(self.fields.len() - 1);
            }
            ClassEvent::Method { name, access } => {
                self.require_header()?;
                if is_skipped_method(&name) {
                    self.target = Target::Ignored;
                } else {
                    self.methods.push(MethodBuilder::new(&name, access));
                    self.target = Target::Method(self.methods.len() - 1);
                }
            }
            ClassEvent::Annotation(annotation) => {
                self.require_header()?;
                match self.target {
                    Target::Class => self.class_annotations.push(annotation),
                    Target::Field(i) => self.fields[i].annotate(&annotation),
                    Target::Method(i) => self.methods[i].annotate(&annotation),
                    Target::Ignored => {}
                }
            }
            ClassEvent::End => {
                let header = self
                    .header
                    .take()
                    .ok_or_else(|| self.broken("end of class before its header"))?;
                return Ok(Some(self.finish(header)));
            }
        }
        Ok(None)
    }

    fn begin(
        &self,
        raw_name: &str,
        access: Access,
        super_name: Option<&str>,
        interfaces: &[String],
    ) -> Header {
        let resolved = resolve_name(raw_name);
        let kind = if access.is_interface() {
            ClassKind::Interface
        } else if access.is_abstract() {
            ClassKind::Abstract
        } else {
            ClassKind::Normal
        };

        let supertype = Supertype::resolve(super_name, self.namespace);
        if let Supertype::External(external) = &supertype {
            debug!("{}: supertype {external} is outside the namespace", resolved.name);
        }

        let interfaces = interfaces
            .iter()
            .map(|i| i.replace('/', "."))
            .filter(|i| self.namespace.contains(i))
            .collect();

        Header {
            name: resolved.name,
            parent: resolved.parent,
            kind,
            supertype,
            interfaces,
        }
    }

    fn finish(&mut self, header: Header) -> ExtractedClass {
        let is_controller = self
            .class_annotations
            .iter()
            .any(|a| simple_name(&a.descriptor).to_lowercase().contains("controller"));

        let mut base_path = String::new();
        let mut annotations = Vec::with_capacity(self.class_annotations.len());
        for annotation in self.class_annotations.drain(..) {
            let signature = format_annotation(&annotation);
            if is_controller && is_route_annotation(&annotation.descriptor) {
                base_path = extract_route(&signature);
            } else {
                annotations.push(signature);
            }
        }

        let fields = self.fields.drain(..).map(FieldBuilder::finish).collect();

        let mut endpoints = Vec::new();
        let methods = self
            .methods
            .drain(..)
            .map(|m| m.finish(is_controller, &mut endpoints))
            .collect();

        let role = if is_controller {
            ClassRole::Controller(RouteInfo {
                base_path,
                endpoints,
            })
        } else {
            ClassRole::Plain
        };

        self.target = Target::Class;

        ExtractedClass {
            record: ClassRecord {
                name: header.name,
                kind: header.kind,
                superclass: header.supertype.internal_name().unwrap_or_default().to_string(),
                interfaces: header.interfaces,
                fields,
                methods,
                annotations,
                is_nested: header.parent.is_some(),
                role,
                nested_classes: Vec::new(),
            },
            parent: header.parent,
        }
    }

    fn require_header(&self) -> Result<()> {
        if self.header.is_none() {
            return Err(self.broken("member event before the class header"));
        }
        Ok(())
    }

    fn broken(&self, reason: &str) -> ExtractError {
        ExtractError::UnreadableClass {
            entry: self.entry.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Runs a whole stream through a fresh extractor. The stream must end with
/// [`ClassEvent::End`]; anything after it is rejected.
pub fn extract_class<I>(entry: &str, events: I, namespace: &Namespace) -> Result<ExtractedClass>
where
    I: IntoIterator<Item = ClassEvent>,
{
    let mut extractor = ClassExtractor::new(entry, namespace);
    let mut finished = None;
    for event in events {
        if finished.is_some() {
            return Err(extractor.broken("event after end of class"));
        }
        finished = extractor.feed(event)?;
    }
    finished.ok_or_else(|| extractor.broken("stream ended without end of class"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AnnotationValue;

    const REST_CONTROLLER: &str = "Lorg/springframework/web/bind/annotation/RestController;";
    const REQUEST_MAPPING: &str = "Lorg/springframework/web/bind/annotation/RequestMapping;";
    const POST_MAPPING: &str = "Lorg/springframework/web/bind/annotation/PostMapping;";

    fn begin(name: &str, access: u16, super_name: &str, interfaces: &[&str]) -> ClassEvent {
        ClassEvent::Begin {
            name: name.to_string(),
            access: Access(access),
            super_name: Some(super_name.to_string()),
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ns() -> Namespace {
        Namespace::new("com.example")
    }

    #[test]
    fn empty_class_still_yields_a_record() -> Result<()> {
        let ns = ns();
        let out = extract_class(
            "com/example/Empty.class",
            [begin("com/example/Empty", Access::PUBLIC, "java/lang/Object", &[]), ClassEvent::End],
            &ns,
        )?;
        let r = out.record;
        assert_eq!(r.name, "com.example.Empty");
        assert_eq!(r.kind, ClassKind::Normal);
        assert_eq!(r.superclass, "");
        assert!(r.interfaces.is_empty());
        assert!(r.fields.is_empty());
        assert!(r.methods.is_empty());
        assert!(r.annotations.is_empty());
        assert!(!r.is_nested);
        assert!(!r.is_controller());
        assert!(out.parent.is_none());
        Ok(())
    }

    #[test]
    fn class_kinds() -> Result<()> {
        let ns = ns();
        let kind = |access| -> Result<ClassKind> {
            Ok(extract_class(
                "x",
                [begin("com/example/K", access, "java/lang/Object", &[]), ClassEvent::End],
                &ns,
            )?
            .record
            .kind)
        };
        assert_eq!(kind(Access::INTERFACE | Access::ABSTRACT)?, ClassKind::Interface);
        assert_eq!(kind(Access::ABSTRACT)?, ClassKind::Abstract);
        assert_eq!(kind(Access::PUBLIC)?, ClassKind::Normal);
        Ok(())
    }

    #[test]
    fn supertypes_are_filtered_to_namespace() -> Result<()> {
        let ns = ns();
        let r = extract_class(
            "x",
            [
                begin(
                    "com/example/Impl",
                    Access::PUBLIC,
                    "com/example/Base",
                    &["com/example/Api", "java/io/Serializable", "com/example/Api"],
                ),
                ClassEvent::End,
            ],
            &ns,
        )?
        .record;
        assert_eq!(r.superclass, "com.example.Base");
        assert_eq!(r.interfaces.iter().collect::<Vec<_>>(), vec!["com.example.Api"]);

        let r = extract_class(
            "x",
            [
                begin("com/example/Impl", Access::PUBLIC, "java/lang/Likeable", &[]),
                ClassEvent::End,
            ],
            &ns,
        )?
        .record;
        assert_eq!(r.superclass, "");
        Ok(())
    }

    #[test]
    fn nested_class_reports_parent() -> Result<()> {
        let ns = ns();
        let out = extract_class(
            "x",
            [
                begin("com/example/OuterClass$InnerClass", 0, "java/lang/Object", &[]),
                ClassEvent::End,
            ],
            &ns,
        )?;
        assert_eq!(out.record.name, "com.example.InnerClass");
        assert!(out.record.is_nested);
        assert_eq!(out.parent.as_deref(), Some("com.example.OuterClass"));
        Ok(())
    }

    #[test]
    fn members_and_their_annotations() -> Result<()> {
        let ns = ns();
        let r = extract_class(
            "x",
            [
                begin("com/example/Svc", Access::PUBLIC, "java/lang/Object", &[]),
                ClassEvent::Annotation(AnnotationEvent::new(
                    "Lorg/springframework/stereotype/Service;",
                )),
                ClassEvent::Field {
                    name: "cache".into(),
                    descriptor: "[Ljava/lang/String;".into(),
                    access: Access(Access::STATIC),
                },
                ClassEvent::Annotation(
                    AnnotationEvent::new("Lcom/example/Cfg;")
                        .with(AnnotationValue::plain(Some("size"), "10")),
                ),
                ClassEvent::Method {
                    name: "<init>".into(),
                    access: Access::default(),
                },
                ClassEvent::Annotation(AnnotationEvent::new("Lcom/example/Lost;")),
                ClassEvent::Method {
                    name: "lambda$run$0".into(),
                    access: Access(Access::STATIC | Access::SYNTHETIC),
                },
                ClassEvent::Method {
                    name: "run".into(),
                    access: Access(Access::STATIC),
                },
                ClassEvent::Annotation(AnnotationEvent::new("Ljava/lang/Deprecated;")),
                ClassEvent::End,
            ],
            &ns,
        )?
        .record;

        assert_eq!(r.annotations, vec!["@org.springframework.stereotype.Service"]);
        assert_eq!(r.fields.len(), 1);
        assert_eq!(r.fields[0].datatype, "java.lang.String[]");
        assert_eq!(r.fields[0].annotations, vec!["@com.example.Cfg(size = 10)"]);
        assert!(r.fields[0].is_annotated);
        assert!(r.fields[0].is_static);
        assert_eq!(r.methods.len(), 1);
        assert_eq!(r.methods[0].name, "run");
        assert!(r.methods[0].is_static);
        assert_eq!(r.methods[0].annotations, vec!["@java.lang.Deprecated"]);
        Ok(())
    }

    #[test]
    fn controller_routes_regardless_of_annotation_order() -> Result<()> {
        let ns = ns();
        let r = extract_class(
            "x",
            [
                begin("com/example/Api", Access::PUBLIC, "java/lang/Object", &[]),
                ClassEvent::Annotation(
                    AnnotationEvent::new(REQUEST_MAPPING)
                        .with(AnnotationValue::plain(Some("value"), "{/initialize}")),
                ),
                ClassEvent::Annotation(AnnotationEvent::new(REST_CONTROLLER)),
                ClassEvent::Method {
                    name: "upload".into(),
                    access: Access::default(),
                },
                ClassEvent::Annotation(
                    AnnotationEvent::new(POST_MAPPING)
                        .with(AnnotationValue::plain(Some("value"), "{/upload}")),
                ),
                ClassEvent::Method {
                    name: "ping".into(),
                    access: Access::default(),
                },
                ClassEvent::Annotation(AnnotationEvent::new(POST_MAPPING)),
                ClassEvent::End,
            ],
            &ns,
        )?
        .record;

        assert!(r.is_controller());
        assert_eq!(
            r.annotations,
            vec!["@org.springframework.web.bind.annotation.RestController"]
        );
        let routes = r.role.routes().cloned().unwrap_or_default();
        assert_eq!(routes.base_path, "/initialize");
        assert_eq!(routes.endpoints, vec!["/upload", "/"]);
        assert!(r.methods.iter().all(|m| m.annotations.is_empty()));
        Ok(())
    }

    #[test]
    fn route_annotations_stay_plain_without_controller() -> Result<()> {
        let ns = ns();
        let r = extract_class(
            "x",
            [
                begin("com/example/NotWeb", Access::PUBLIC, "java/lang/Object", &[]),
                ClassEvent::Annotation(AnnotationEvent::new(REQUEST_MAPPING)),
                ClassEvent::End,
            ],
            &ns,
        )?
        .record;
        assert!(!r.is_controller());
        assert_eq!(
            r.annotations,
            vec!["@org.springframework.web.bind.annotation.RequestMapping"]
        );
        Ok(())
    }

    #[test]
    fn broken_streams_are_rejected() {
        let ns = ns();
        let err = extract_class(
            "com/example/Bad.class",
            [ClassEvent::Method {
                name: "m".into(),
                access: Access::default(),
            }],
            &ns,
        )
        .unwrap_err();
        assert_eq!(err.entry(), Some("com/example/Bad.class"));

        assert!(
            extract_class(
                "x",
                [begin("com/example/A", 0, "java/lang/Object", &[])],
                &ns
            )
            .is_err()
        );
        assert!(extract_class("x", [ClassEvent::End], &ns).is_err());
    }
}
