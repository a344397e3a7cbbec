//! Property path resolution.
//!
//! Every field-taking operation receives an accessor: a one-argument closure
//! that walks from the document to a field through a chain of selections,
//! e.g. `|x| x.select("address").select("city")`. The closure argument stands
//! for the document itself, so the resolved path never carries a parameter
//! segment: the accessor above resolves to `address.city`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::DslError;

/// A chain of field selections, handed to property accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    segments: Vec<String>,
}

impl Selector {
    /// Select a member of the current value.
    pub fn select(mut self, name: impl Into<String>) -> Self {
        self.segments.push(name.into());
        self
    }

    /// Select several nested members at once from a dotted string.
    pub fn dotted(mut self, path: &str) -> Self {
        self.segments.extend(path.split('.').map(str::to_string));
        self
    }
}

impl From<PropertyPath> for Selector {
    fn from(path: PropertyPath) -> Self {
        Self {
            segments: path.segments,
        }
    }
}

/// A resolved, validated dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// The individual member names, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path in dotted form, e.g. `user.email`.
    pub fn as_dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_dotted())
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_dotted())
    }
}

/// Run an accessor and validate the member chain it selected.
///
/// Fails when the accessor selects nothing, or when a selected name is empty,
/// contains a `.` or contains whitespace: such chains do not name a field.
pub fn resolve<F>(accessor: F) -> Result<PropertyPath, DslError>
where
    F: FnOnce(Selector) -> Selector,
{
    let selector = accessor(Selector::default());

    if selector.segments.is_empty() {
        return Err(DslError::unresolvable(
            "accessor does not select any member",
        ));
    }

    for (position, segment) in selector.segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(DslError::unresolvable(format!(
                "empty member name at position {}",
                position
            )));
        }
        if segment.contains('.') {
            return Err(DslError::unresolvable(format!(
                "member name '{}' contains '.'",
                segment
            )));
        }
        if segment.chars().any(char::is_whitespace) {
            return Err(DslError::unresolvable(format!(
                "member name '{}' contains whitespace",
                segment
            )));
        }
    }

    Ok(PropertyPath {
        segments: selector.segments,
    })
}
