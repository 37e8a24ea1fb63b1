//! Declared third-party dependencies from a Maven `pom.xml`.
//!
//! Property placeholders are not resolved. A value such as `${spring.version}`
//! is compacted to `springversion` instead.

use std::collections::HashMap;

use roxmltree::{Document, Node};

use crate::error::{ExtractError, Result};
use crate::model::ExternalDependencyRecord;

pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

const PLACEHOLDER_OPEN: &str = "${";
const PLACEHOLDER_NOISE: [char; 8] = ['"', '\n', '\r', '\t', '$', '{', '}', '.'];

pub fn extract_dependencies(entry: &str, xml: &str) -> Result<Vec<ExternalDependencyRecord>> {
    let doc = Document::parse(xml).map_err(|e| ExtractError::MalformedDescriptor {
        entry: entry.to_string(),
        reason: e.to_string(),
    })?;

    Ok(doc
        .descendants()
        .filter(|n| is_pom_element(n, "dependency"))
        .map(|n| dependency_record(&n))
        .collect())
}

fn is_pom_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && matches!(node.tag_name().namespace(), None | Some(POM_NAMESPACE))
}

fn dependency_record(node: &Node<'_, '_>) -> ExternalDependencyRecord {
    let mut values: HashMap<&str, String> = HashMap::new();
    for child in node.children().filter(|c| c.is_element()) {
        let key = child.tag_name().name();
        // Nested exclusion lists have no flat value.
        if key == "exclusions" {
            continue;
        }
        values.insert(key, sanitize(text_content(&child).trim()));
    }

    let mut take = |key: &str| values.remove(key).unwrap_or_default();
    ExternalDependencyRecord {
        group_id: take("groupId"),
        artifact_id: take("artifactId"),
        version: take("version"),
        scope: take("scope"),
    }
}

fn text_content(node: &Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

pub fn sanitize(value: &str) -> String {
    if value.contains(PLACEHOLDER_OPEN) {
        value.chars().filter(|c| !PLACEHOLDER_NOISE.contains(c)).collect()
    } else {
        value.to_string()
    }
}
