//! Structural events emitted for one class file.
//!
//! A stream always opens with [`ClassEvent::Begin`] and closes with
//! [`ClassEvent::End`]. An [`ClassEvent::Annotation`] belongs to whatever was
//! opened last: the class itself before any member, otherwise the most recent
//! field or method.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access(pub u16);

impl Access {
    pub const PUBLIC: u16 = 0x0001;
    pub const STATIC: u16 = 0x0008;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;

    pub fn has(self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn is_static(self) -> bool {
        self.has(Self::STATIC)
    }

    pub fn is_interface(self) -> bool {
        self.has(Self::INTERFACE)
    }

    pub fn is_abstract(self) -> bool {
        self.has(Self::ABSTRACT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassEvent {
    Begin {
        /// Internal (slash-separated) name, e.g. `com/example/Outer$Inner`.
        name: String,
        access: Access,
        /// Internal name of the direct supertype; `None` only for the root type.
        super_name: Option<String>,
        interfaces: Vec<String>,
    },
    Field {
        name: String,
        descriptor: String,
        access: Access,
    },
    Method {
        name: String,
        access: Access,
    },
    Annotation(AnnotationEvent),
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEvent {
    pub descriptor: String,
    pub values: Vec<AnnotationValue>,
}

impl AnnotationEvent {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            values: Vec::new(),
        }
    }

    pub fn with(mut self, value: AnnotationValue) -> Self {
        self.values.push(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Plain {
        name: Option<String>,
        value: String,
    },
    Enum {
        name: Option<String>,
        descriptor: String,
        constant: String,
    },
    Nested {
        name: Option<String>,
        descriptor: String,
        values: Vec<AnnotationValue>,
    },
}

impl AnnotationValue {
    pub fn plain(name: Option<&str>, value: impl Into<String>) -> Self {
        AnnotationValue::Plain {
            name: name.map(str::to_string),
            value: value.into(),
        }
    }

    pub fn enumeration(name: Option<&str>, descriptor: &str, constant: &str) -> Self {
        AnnotationValue::Enum {
            name: name.map(str::to_string),
            descriptor: descriptor.to_string(),
            constant: constant.to_string(),
        }
    }

    pub fn nested(name: Option<&str>, descriptor: &str, values: Vec<AnnotationValue>) -> Self {
        AnnotationValue::Nested {
            name: name.map(str::to_string),
            descriptor: descriptor.to_string(),
            values,
        }
    }
}
