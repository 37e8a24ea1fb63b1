//! Walks a compiled archive (jar/war) and builds its dependency model.
//!
//! Entries are read once in archive order. Class files are decoded in
//! parallel, but folded into the model sequentially so the nested-class index
//! has a single writer.

use anyhow::{Context, Result};
use memmap2::Mmap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::assemble::ModelBuilder;
use crate::classfile::class_events;
use crate::error::ExtractError;
use crate::extract::extract_class;
use crate::model::DependencyModel;
use crate::namespace::Namespace;
use crate::pom::extract_dependencies;

const CLASS_SUFFIX: &str = ".class";
const BUILD_DESCRIPTOR: &str = "pom.xml";
const CLASS_ROOTS: [&str; 2] = ["BOOT-INF/classes/", "WEB-INF/classes/"];
const NON_TYPE_CLASSES: [&str; 2] = ["module-info.class", "package-info.class"];
/// Upper bound for one class or descriptor entry.
const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Class,
    BuildDescriptor,
    Other,
}

pub fn classify_entry(name: &str, namespace: &Namespace) -> EntryKind {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    if file_name == BUILD_DESCRIPTOR {
        return EntryKind::BuildDescriptor;
    }
    if !name.ends_with(CLASS_SUFFIX)
        || NON_TYPE_CLASSES.contains(&file_name)
        || is_anonymous_class(file_name)
    {
        return EntryKind::Other;
    }

    let path = CLASS_ROOTS
        .iter()
        .find_map(|root| name.strip_prefix(root))
        .unwrap_or(name);
    if namespace.contains_path(path) {
        EntryKind::Class
    } else {
        EntryKind::Other
    }
}

/// `Foo$1.class`, `Foo$Bar$12.class`.
fn is_anonymous_class(file_name: &str) -> bool {
    let stem = file_name.trim_end_matches(CLASS_SUFFIX);
    match stem.rsplit_once('$') {
        Some((_, tail)) => !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub entry: String,
    pub reason: String,
}

impl From<&ExtractError> for SkippedEntry {
    fn from(err: &ExtractError) -> Self {
        Self {
            entry: err.entry().unwrap_or_default().to_string(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub archive: String,
    pub namespace: String,
    pub project_id: String,
    pub model: DependencyModel,
    pub skipped: Vec<SkippedEntry>,
}

pub fn analyze_archive(archive_path: &Path, namespace: &Namespace) -> Result<AnalysisReport> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap archive: {}", archive_path.display()))?;

    info!("analyzing {} (namespace {})", archive_path.display(), namespace.as_str());
    analyze_bytes(&archive_path.to_string_lossy(), &mmap[..], namespace)
}

struct RawEntry {
    name: String,
    kind: EntryKind,
    bytes: Vec<u8>,
}

pub fn analyze_bytes(label: &str, bytes: &[u8], namespace: &Namespace) -> Result<AnalysisReport> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .with_context(|| format!("Failed to read zip structure: {label}"))?;

    let mut raw = Vec::new();
    let mut skipped = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read entry #{i} of {label}"))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let kind = classify_entry(&name, namespace);
        if kind == EntryKind::Other {
            continue;
        }
        let declared = entry.size();
        match read_bounded(&mut entry, declared, MAX_ENTRY_BYTES) {
            Ok(content) => raw.push(RawEntry {
                name,
                kind,
                bytes: content,
            }),
            Err(reason) => {
                warn!("skipping {name}: {reason}");
                skipped.push(SkippedEntry {
                    entry: name,
                    reason,
                });
            }
        }
    }

    let decoded: Vec<Option<crate::error::Result<_>>> = raw
        .par_iter_mut()
        .map(|e| match e.kind {
            EntryKind::Class => Some(class_events(&e.name, std::mem::take(&mut e.bytes))),
            _ => None,
        })
        .collect();

    let mut builder = ModelBuilder::new();
    let mut record_failure = |err: ExtractError| {
        warn!("skipping {err}");
        skipped.push(SkippedEntry::from(&err));
    };

    for (entry, events) in raw.iter().zip(decoded) {
        match (entry.kind, events) {
            (EntryKind::Class, Some(events)) => {
                match events.and_then(|ev| extract_class(&entry.name, ev, namespace)) {
                    Ok(extracted) => {
                        debug!("extracted {}", extracted.record.name);
                        builder.add_class(extracted);
                    }
                    Err(err) => record_failure(err),
                }
            }
            (EntryKind::BuildDescriptor, _) => match descriptor_dependencies(entry) {
                Ok(deps) => {
                    debug!("{}: {} declared dependencies", entry.name, deps.len());
                    builder.add_external(deps);
                }
                Err(err) => record_failure(err),
            },
            _ => {}
        }
    }

    info!(
        "{label}: {} classes, {} skipped entries",
        builder.class_count(),
        skipped.len()
    );

    Ok(AnalysisReport {
        archive: label.to_string(),
        namespace: namespace.as_str().to_string(),
        project_id: project_id(namespace, bytes),
        model: builder.finish(),
        skipped,
    })
}

fn descriptor_dependencies(
    entry: &RawEntry,
) -> crate::error::Result<Vec<crate::model::ExternalDependencyRecord>> {
    let xml = std::str::from_utf8(&entry.bytes).map_err(|e| ExtractError::MalformedDescriptor {
        entry: entry.name.clone(),
        reason: e.to_string(),
    })?;
    extract_dependencies(&entry.name, xml)
}

/// Reads one entry without trusting its header: the declared size only
/// sizes the buffer, and nothing past `limit` bytes is accepted.
fn read_bounded<R: Read>(
    reader: R,
    declared: u64,
    limit: u64,
) -> std::result::Result<Vec<u8>, String> {
    if declared > limit {
        return Err(format!("entry declares {declared} bytes, limit is {limit}"));
    }
    let mut content = Vec::with_capacity(declared as usize);
    reader
        .take(limit + 1)
        .read_to_end(&mut content)
        .map_err(|e| format!("failed to read entry: {e}"))?;
    if content.len() as u64 > limit {
        return Err(format!("entry exceeds {limit} bytes"));
    }
    Ok(content)
}

/// Stable identifier of one (namespace, archive) analysis.
pub fn project_id(namespace: &Namespace, archive_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(archive_bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_entries() {
        let ns = Namespace::new("com.example");
        assert_eq!(classify_entry("com/example/A.class", &ns), EntryKind::Class);
        assert_eq!(
            classify_entry("com/example/A$Inner.class", &ns),
            EntryKind::Class
        );
        assert_eq!(
            classify_entry("BOOT-INF/classes/com/example/web/Api.class", &ns),
            EntryKind::Class
        );
        assert_eq!(classify_entry("com/example/A$1.class", &ns), EntryKind::Other);
        assert_eq!(classify_entry("org/other/B.class", &ns), EntryKind::Other);
        assert_eq!(
            classify_entry("com/example/package-info.class", &ns),
            EntryKind::Other
        );
        assert_eq!(
            classify_entry("META-INF/maven/com.example/demo/pom.xml", &ns),
            EntryKind::BuildDescriptor
        );
        assert_eq!(classify_entry("pom.xml", &ns), EntryKind::BuildDescriptor);
        assert_eq!(classify_entry("META-INF/MANIFEST.MF", &ns), EntryKind::Other);
    }

    #[test]
    fn anonymous_class_detection() {
        assert!(is_anonymous_class("Foo$1.class"));
        assert!(is_anonymous_class("Foo$Bar$12.class"));
        assert!(!is_anonymous_class("Foo$Bar.class"));
        assert!(!is_anonymous_class("Foo$.class"));
        assert!(!is_anonymous_class("Foo.class"));
    }

    #[test]
    fn oversized_entries_are_refused_before_allocating() {
        let err = read_bounded(&b"tiny"[..], u64::MAX, MAX_ENTRY_BYTES).unwrap_err();
        assert!(err.contains("declares"));
    }

    #[test]
    fn entry_longer_than_its_header_is_cut_off() {
        let err = read_bounded(&b"0123456789"[..], 2, 4).unwrap_err();
        assert_eq!(err, "entry exceeds 4 bytes");
        assert_eq!(read_bounded(&b"0123"[..], 4, 4).unwrap(), b"0123".to_vec());
    }

    #[test]
    fn read_errors_are_reported_per_entry() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("corrupt deflate stream"))
            }
        }
        let err = read_bounded(Failing, 10, MAX_ENTRY_BYTES).unwrap_err();
        assert!(err.contains("corrupt deflate stream"));
    }

    #[test]
    fn project_id_depends_on_namespace_and_bytes() {
        let a = Namespace::new("com.a");
        let b = Namespace::new("com.b");
        assert_eq!(project_id(&a, b"jar"), project_id(&a, b"jar"));
        assert_ne!(project_id(&a, b"jar"), project_id(&b, b"jar"));
        assert_ne!(project_id(&a, b"jar"), project_id(&a, b"jar2"));
        assert_eq!(project_id(&a, b"jar").len(), 64);
    }
}
