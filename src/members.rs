//! Field and method records, plus web route detection on their annotations.

use std::sync::LazyLock;

use regex::Regex;

use crate::annotation::{format_annotation, simple_name};
use crate::descriptor::decode_type;
use crate::event::{Access, AnnotationEvent};
use crate::model::{FieldRecord, MethodRecord};

const CONSTRUCTOR: &str = "<init>";
const STATIC_INITIALIZER: &str = "<clinit>";
const LAMBDA_PREFIX: &str = "lambda$";

const ROUTE_ANNOTATIONS: [&str; 6] = [
    "RequestMapping",
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
];

pub const DEFAULT_ROUTE: &str = "/";

static VALUE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bvalue\s*=\s*").expect("value pattern is valid"));

pub fn is_route_annotation(descriptor: &str) -> bool {
    let simple = simple_name(descriptor);
    ROUTE_ANNOTATIONS.contains(&simple.as_str())
}

/// Path carried by the `value` element of a route annotation signature,
/// `/` when there is none.
pub fn extract_route(signature: &str) -> String {
    let route = VALUE_ELEMENT
        .find(signature)
        .map(|m| first_value(&signature[m.end()..]))
        .unwrap_or_default();
    if route.is_empty() {
        DEFAULT_ROUTE.to_string()
    } else {
        route
    }
}

/// First item of a rendered element value, either `x` or `{x, y}`. Braces
/// inside an item belong to path variables and are kept.
fn first_value(rest: &str) -> String {
    let (body, in_array) = match rest.strip_prefix('{') {
        Some(inner) => (inner, true),
        None => (rest, false),
    };

    let mut depth = 0usize;
    let mut quoted = false;
    let mut end = body.len();
    for (i, c) in body.char_indices() {
        match c {
            '"' => quoted = !quoted,
            _ if quoted => {}
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            '}' if in_array => {
                end = i;
                break;
            }
            ',' | ')' if depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    body[..end].trim().trim_matches('"').trim().to_string()
}

pub fn is_skipped_method(name: &str) -> bool {
    name == CONSTRUCTOR || name == STATIC_INITIALIZER || name.starts_with(LAMBDA_PREFIX)
}

#[derive(Debug, Clone)]
pub struct FieldBuilder {
    record: FieldRecord,
}

impl FieldBuilder {
    pub fn new(name: &str, descriptor: &str, access: Access) -> Self {
        Self {
            record: FieldRecord {
                identifier: name.to_string(),
                datatype: decode_type(descriptor),
                is_static: access.is_static(),
                is_annotated: false,
                annotations: Vec::new(),
            },
        }
    }

    pub fn annotate(&mut self, event: &AnnotationEvent) {
        self.record.annotations.push(format_annotation(event));
    }

    pub fn finish(mut self) -> FieldRecord {
        self.record.is_annotated = !self.record.annotations.is_empty();
        self.record
    }
}

/// A method's annotations are held back until the class is finished, since
/// only then is it known whether route annotations become endpoints.
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    is_static: bool,
    annotations: Vec<MethodAnnotation>,
}

#[derive(Debug, Clone)]
struct MethodAnnotation {
    signature: String,
    is_route: bool,
}

impl MethodBuilder {
    pub fn new(name: &str, access: Access) -> Self {
        Self {
            name: name.to_string(),
            is_static: access.is_static(),
            annotations: Vec::new(),
        }
    }

    pub fn annotate(&mut self, event: &AnnotationEvent) {
        self.annotations.push(MethodAnnotation {
            signature: format_annotation(event),
            is_route: is_route_annotation(&event.descriptor),
        });
    }

    /// Route annotations go to `endpoints` when `controller` is set; everything
    /// else stays on the method.
    pub fn finish(self, controller: bool, endpoints: &mut Vec<String>) -> MethodRecord {
        let mut annotations = Vec::with_capacity(self.annotations.len());
        for annotation in self.annotations {
            if controller && annotation.is_route {
                endpoints.push(extract_route(&annotation.signature));
            } else {
                annotations.push(annotation.signature);
            }
        }
        MethodRecord {
            name: self.name,
            is_static: self.is_static,
            annotations,
        }
    }
}
