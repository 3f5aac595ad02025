mod accessor;
mod error;

use std::fmt;

use serde_json::Value;
use tracing::trace;

pub use accessor::{Accessor, PathSegment};
pub use error::AccessError;

use accessor::pointer_of;

/// Notification sent to observers after every edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub accessor: Accessor,
    pub revision: u64,
}

type Observer = Box<dyn FnMut(&Change)>;

/// The edited value plus its observers.
///
/// All edits go through [`Document::write`] or [`Document::modify`]; both bump
/// the revision and notify every observer before returning.
pub struct Document {
    value: Value,
    revision: u64,
    observers: Vec<Observer>,
}

impl Document {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            revision: 0,
            observers: Vec::new(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Call `observer` after every edit for as long as the document lives.
    pub fn subscribe(&mut self, observer: impl FnMut(&Change) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn read(&self, accessor: &Accessor) -> Result<&Value, AccessError> {
        let mut current = &self.value;
        for (depth, segment) in accessor.path().iter().enumerate() {
            current = match segment {
                PathSegment::Attribute(name) => {
                    let Value::Object(map) = current else {
                        return Err(AccessError::NotAnObject(pointer_of(
                            &accessor.path()[..depth],
                        )));
                    };
                    map.get(name).ok_or_else(|| {
                        AccessError::MissingSlot(pointer_of(&accessor.path()[..=depth]))
                    })?
                }
                PathSegment::Index(index) => {
                    let Value::Array(items) = current else {
                        return Err(AccessError::NotAnArray(pointer_of(
                            &accessor.path()[..depth],
                        )));
                    };
                    items.get(*index).ok_or_else(|| AccessError::IndexOutOfRange {
                        pointer: pointer_of(&accessor.path()[..=depth]),
                        index: *index,
                        len: items.len(),
                    })?
                }
            };
        }
        Ok(current)
    }

    /// Replace the value behind `accessor`. Attributes are inserted when
    /// missing; array slots must already exist.
    pub fn write(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError> {
        match accessor.parent() {
            None => self.value = value,
            Some((parent, segment)) => {
                let container = self.slot_mut(&parent)?;
                match (segment, container) {
                    (PathSegment::Attribute(name), Value::Object(map)) => {
                        map.insert(name.clone(), value);
                    }
                    (PathSegment::Attribute(_), _) => {
                        return Err(AccessError::NotAnObject(parent.pointer()));
                    }
                    (PathSegment::Index(index), Value::Array(items)) => {
                        let len = items.len();
                        let slot = items.get_mut(*index).ok_or_else(|| {
                            AccessError::IndexOutOfRange {
                                pointer: accessor.pointer(),
                                index: *index,
                                len,
                            }
                        })?;
                        *slot = value;
                    }
                    (PathSegment::Index(_), _) => {
                        return Err(AccessError::NotAnArray(parent.pointer()));
                    }
                }
            }
        }
        self.notify(accessor);
        Ok(())
    }

    /// Edit the value behind `accessor` in place.
    pub fn modify<R>(
        &mut self,
        accessor: &Accessor,
        edit: impl FnOnce(&mut Value) -> R,
    ) -> Result<R, AccessError> {
        let slot = self.slot_mut(accessor)?;
        let result = edit(slot);
        self.notify(accessor);
        Ok(result)
    }

    pub(crate) fn materialize_attribute(
        &mut self,
        parent: &Accessor,
        name: &str,
    ) -> Result<(), AccessError> {
        match self.slot_mut(parent)? {
            Value::Object(map) => {
                if !map.contains_key(name) {
                    map.insert(name.to_string(), Value::Null);
                }
                Ok(())
            }
            _ => Err(AccessError::NotAnObject(parent.pointer())),
        }
    }

    fn slot_mut(&mut self, accessor: &Accessor) -> Result<&mut Value, AccessError> {
        // validate with the shared walk first so error reporting lives in one place
        self.read(accessor)?;
        let mut current = &mut self.value;
        for segment in accessor.path() {
            current = match (segment, current) {
                (PathSegment::Attribute(name), Value::Object(map)) => map
                    .get_mut(name)
                    .ok_or_else(|| AccessError::MissingSlot(accessor.pointer()))?,
                (PathSegment::Index(index), Value::Array(items)) => items
                    .get_mut(*index)
                    .ok_or_else(|| AccessError::MissingSlot(accessor.pointer()))?,
                _ => return Err(AccessError::MissingSlot(accessor.pointer())),
            };
        }
        Ok(current)
    }

    fn notify(&mut self, accessor: &Accessor) {
        self.revision += 1;
        trace!(path = %accessor, revision = self.revision, "document changed");
        let change = Change {
            accessor: accessor.clone(),
            revision: self.revision,
        };
        for observer in &mut self.observers {
            observer(&change);
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("value", &self.value)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}
