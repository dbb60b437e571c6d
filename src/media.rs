//! Media library helpers: ordering resources for display and phrasing the
//! confirmation shown before one is deleted.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::api::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Filename,
    Location,
    Type,
    UploadDate,
    Size,
    Referenced,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filename" | "name" => Ok(SortKey::Filename),
            "location" | "path" => Ok(SortKey::Location),
            "type" => Ok(SortKey::Type),
            "date" | "upload-date" => Ok(SortKey::UploadDate),
            "size" => Ok(SortKey::Size),
            "referenced" | "ref" => Ok(SortKey::Referenced),
            other => Err(format!(
                "unknown sort key '{other}' (expected filename, location, type, date, size or referenced)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

fn compare(a: &Resource, b: &Resource, key: SortKey) -> Ordering {
    match key {
        SortKey::Filename => a.original_filename.cmp(&b.original_filename),
        SortKey::Location => a.location.cmp(&b.location),
        SortKey::Type => a.resource_type.cmp(&b.resource_type),
        // Dates are ISO-formatted, so string order is chronological
        SortKey::UploadDate => a.upload_date.cmp(&b.upload_date),
        SortKey::Size => a.size.cmp(&b.size),
        SortKey::Referenced => a.referenced.cmp(&b.referenced),
    }
}

/// Returns a sorted copy of `resources`. Without a spec the input order is
/// kept. The sort is stable, so equal keys keep their relative order in
/// both directions.
pub fn sort_resources(resources: &[Resource], spec: Option<SortSpec>) -> Vec<Resource> {
    let mut sorted = resources.to_vec();
    if let Some(spec) = spec {
        sorted.sort_by(|a, b| match spec.order {
            SortOrder::Ascending => compare(a, b, spec.key),
            SortOrder::Descending => compare(b, a, spec.key),
        });
    }
    sorted
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteWarning {
    /// Set when articles still reference the resource.
    pub severe: bool,
    pub message: String,
}

impl fmt::Display for DeleteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.severe { "SEVERE WARNING" } else { "Warning" };
        write!(f, "{label}: {}", self.message)
    }
}

pub fn deletion_warning(resource: &Resource) -> DeleteWarning {
    let name = if resource.original_filename.is_empty() {
        resource.location.as_str()
    } else {
        resource.original_filename.as_str()
    };

    if resource.referenced {
        DeleteWarning {
            severe: true,
            message: format!(
                "resource '{name}' is referenced by articles; deleting it will break them"
            ),
        }
    } else {
        DeleteWarning {
            severe: false,
            message: format!("resource '{name}' will be deleted from the server"),
        }
    }
}
