use crate::models::{Exercise, Food};

/// Placeholder shown wherever a log entry points at a record that no longer exists.
pub const UNKNOWN_NAME: &str = "-";

/// A reference record addressable by id and shown by name.
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Named for Exercise {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Food {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Resolve foreign keys from log entries against a reference collection.
///
/// References are allowed to dangle, so resolution is always optional and
/// never an error.
pub trait Lookup {
    type Record;

    fn resolve(&self, id: &str) -> Option<&Self::Record>;

    /// Human-readable name for `id`, or [`UNKNOWN_NAME`] when it does not resolve.
    fn display_name(&self, id: &str) -> &str;
}

impl<T: Named> Lookup for [T] {
    type Record = T;

    fn resolve(&self, id: &str) -> Option<&T> {
        self.iter().find(|r| r.id() == id)
    }

    fn display_name(&self, id: &str) -> &str {
        self.resolve(id).map_or(UNKNOWN_NAME, Named::name)
    }
}
