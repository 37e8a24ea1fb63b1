//! # class-deps
//!
//! Builds a structural dependency model from a compiled Java archive: classes
//! with their supertypes, members, annotations, nesting and web routes, plus
//! the Maven dependencies the archive declares.
//!
//! ## Architecture
//!
//! - **descriptor**: Type descriptor decoding (`[I` -> `int[]`)
//! - **annotation**: Canonical annotation signatures
//! - **members**: Field/method records and route extraction
//! - **nested**: Nested-class name splitting and the parent -> children index
//! - **extract**: Per-class event folding into a `ClassRecord`
//! - **assemble**: Aggregation of all classes into a `DependencyModel`
//! - **pom**: `pom.xml` dependency extraction
//! - **classfile**: Class-file bytes to structural events
//! - **archive**: Archive walking and entry classification
//! - **store**: Persistent project storage using heed (LMDB)

pub mod annotation;
pub mod archive;
pub mod assemble;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod extract;
pub mod logging;
pub mod members;
pub mod model;
pub mod namespace;
pub mod nested;
pub mod pom;
pub mod store;

pub use archive::{AnalysisReport, analyze_archive, analyze_bytes};
pub use model::DependencyModel;
pub use namespace::Namespace;
