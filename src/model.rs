use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Normal,
    Abstract,
    Interface,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub base_path: String,
    pub endpoints: Vec<String>,
}

/// Decided once per class, after all of its class-level annotations are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRole {
    Plain,
    Controller(RouteInfo),
}

impl ClassRole {
    pub fn routes(&self) -> Option<&RouteInfo> {
        match self {
            ClassRole::Plain => None,
            ClassRole::Controller(routes) => Some(routes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub identifier: String,
    pub datatype: String,
    pub is_static: bool,
    pub is_annotated: bool,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    pub is_static: bool,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub kind: ClassKind,
    /// Empty unless the direct supertype lives in the user namespace.
    pub superclass: String,
    pub interfaces: IndexSet<String>,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
    pub annotations: Vec<String>,
    pub is_nested: bool,
    pub role: ClassRole,
    pub nested_classes: Vec<String>,
}

impl ClassRecord {
    pub fn is_controller(&self) -> bool {
        matches!(self.role, ClassRole::Controller(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDependencyRecord {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub scope: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyModel {
    pub classes: Vec<ClassRecord>,
    pub external_dependencies: Vec<ExternalDependencyRecord>,
    pub class_names: Vec<String>,
}
