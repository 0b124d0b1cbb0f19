//! JSON manifest codec (`package.json` style).
//!
//! Only object-valued top-level members with string values are read into the
//! [`ManifestDocument`]. On write, the document is merged into the existing
//! JSON so unrelated members and member order survive.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};
use tracing::warn;

use graft_core::{
    application::ApplicationError,
    domain::{Indentation, ManifestDocument, ManifestKey, ManifestNamespace},
    error::{GraftError, GraftResult},
};

pub fn parse(path: &Path, content: &str) -> GraftResult<ManifestDocument> {
    let root = parse_object(path, content)?;
    let mut document = ManifestDocument::new();

    for (namespace, members) in &root {
        let Value::Object(members) = members else {
            continue;
        };
        let Ok(namespace) = ManifestNamespace::new(namespace.as_str()) else {
            warn!(%namespace, "Skipping manifest namespace with an invalid name");
            continue;
        };
        for (name, value) in members {
            let (Ok(name), Value::String(value)) = (ManifestKey::new(name.as_str()), value) else {
                continue;
            };
            document.set(namespace.clone(), name, value.as_str());
        }
    }

    Ok(document)
}

/// Write `document` over `existing`, returning the new file content.
pub fn render(
    path: &Path,
    existing: Option<&str>,
    document: &ManifestDocument,
    indentation: &Indentation,
) -> GraftResult<String> {
    let mut root = match existing {
        Some(content) if !content.trim().is_empty() => parse_object(path, content)?,
        _ => Map::new(),
    };

    for (namespace, entries) in document.namespaces() {
        let slot = root
            .entry(namespace.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(members) = slot else {
            return Err(malformed(
                path,
                format!("'{}' is not an object", namespace),
            ));
        };
        for (name, value) in entries {
            members.insert(name.to_string(), Value::String(value.clone()));
        }
    }

    let unit = indentation.unit();
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(unit.as_bytes()));
    Value::Object(root)
        .serialize(&mut serializer)
        .map_err(|e| malformed(path, e))?;

    let mut content = String::from_utf8(out).map_err(|e| malformed(path, e))?;
    content.push('\n');
    Ok(content)
}

fn parse_object(path: &Path, content: &str) -> GraftResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(content).map_err(|e| malformed(path, e))? {
        Value::Object(root) => Ok(root),
        _ => Err(malformed(path, "top level is not an object")),
    }
}

fn malformed(path: &Path, reason: impl std::fmt::Display) -> GraftError {
    ApplicationError::MalformedArtifact {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}
