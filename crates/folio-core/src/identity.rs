#![forbid(unsafe_code)]

//! Element identities and the enrollment registry.
//!
//! Every enrolled element gets an identity that is stable across page loads
//! and independent of its styling classes: the DOM `id` when one is present
//! and unclaimed, otherwise `"{group}:{ordinal}"` where the ordinal counts
//! the group's elements in document order. The identity is the join key of
//! the persisted layout.

use std::fmt;

/// Host-side handle of an enrolled element (index into the registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Persisted identity of an enrolled element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIdentity(String);

impl ElementIdentity {
    /// Identity taken verbatim (DOM id or a stored record's `id`).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generated identity for the `ordinal`-th element of `group`.
    #[must_use]
    pub fn generated(group: &str, ordinal: usize) -> Self {
        Self(format!("{group}:{ordinal}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-separated class names, for resolving legacy records that
    /// were keyed by an element's class list.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    /// Compound class selector (`.a.b`) for legacy class-list identities.
    ///
    /// Returns `None` when the identity has no usable class tokens.
    #[must_use]
    pub fn legacy_class_selector(&self) -> Option<String> {
        let mut selector = String::new();
        for class in self.class_names() {
            if !class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return None;
            }
            selector.push('.');
            selector.push_str(class);
        }
        (!selector.is_empty()).then_some(selector)
    }
}

impl fmt::Display for ElementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ElementIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One enrolled element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledElement {
    pub id: ElementId,
    pub identity: ElementIdentity,
    /// Name of the group that enrolled the element.
    pub group: String,
}

/// Enrollment registry; handles are dense and assigned in enrollment order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    elements: Vec<EnrolledElement>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll one element of `group`.
    ///
    /// `dom_id` is the element's `id` attribute. It becomes the identity
    /// unless it is empty or already claimed, in which case a generated
    /// identity is used.
    pub fn enroll(&mut self, group: &str, dom_id: Option<&str>) -> &EnrolledElement {
        let identity = match dom_id.map(str::trim) {
            Some(raw) if !raw.is_empty() && self.find(raw).is_none() => ElementIdentity::new(raw),
            _ => self.next_generated(group),
        };
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(EnrolledElement {
            id,
            identity,
            group: group.to_owned(),
        });
        &self.elements[id.index()]
    }

    fn next_generated(&self, group: &str) -> ElementIdentity {
        let mut ordinal = self.elements.iter().filter(|e| e.group == group).count();
        loop {
            let candidate = ElementIdentity::generated(group, ordinal);
            if self.find(candidate.as_str()).is_none() {
                return candidate;
            }
            ordinal += 1;
        }
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&EnrolledElement> {
        self.elements.get(id.index())
    }

    /// Look up an enrolled element by exact identity.
    #[must_use]
    pub fn find(&self, identity: &str) -> Option<&EnrolledElement> {
        self.elements.iter().find(|e| e.identity.as_str() == identity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrolledElement> {
        self.elements.iter()
    }
}
