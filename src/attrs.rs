//! Resource attribute string parsing.
//!
//! Resource attributes arrive as a single delimited string in the settings
//! file (`key=value,key=value,...`) and are parsed once at startup into a
//! mapping shared by every pipeline.

use std::collections::HashMap;

/// Static resource attributes, keyed by attribute name.
pub type ResourceAttributes = HashMap<String, String>;

/// Parses a comma-separated `key=value` string into resource attributes.
///
/// Candidates are split on `,`, then on `=`. A candidate is accepted only if
/// the split yields exactly two parts and the key is non-empty after
/// trimming; anything else is silently skipped. Malformed segments are an
/// expected part of hand-edited settings files, not an error. Absent or
/// empty input yields an empty mapping.
pub fn parse_resource_attributes(input: Option<&str>) -> ResourceAttributes {
    let mut attributes = HashMap::new();
    let Some(input) = input else {
        return attributes;
    };

    for candidate in input.split(',') {
        let parts: Vec<&str> = candidate.split('=').collect();
        if parts.len() != 2 {
            continue;
        }
        let key = parts[0].trim();
        if key.is_empty() {
            continue;
        }
        attributes.insert(key.to_string(), parts[1].trim().to_string());
    }

    attributes
}
