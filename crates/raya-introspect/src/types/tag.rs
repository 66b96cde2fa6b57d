//! Metadata tags attached to members
//!
//! A tag is any `Debug + Send + Sync` Rust value implementing [`Tag`]. Its
//! Rust type is the tag type: presence is tested per [`TagType`], and the
//! typed value can be read back with [`TagSet::get`].
//!
//! ```rust,ignore
//! #[derive(Debug)]
//! struct Plog(&'static str);
//! impl Tag for Plog {}
//!
//! let method = registry.introspector().find_method(ty, false, "test", &[])?.unwrap();
//! assert_eq!(method.tags().get::<Plog>().unwrap().0, "Test");
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Marker trait for metadata tags
pub trait Tag: Any + fmt::Debug + Send + Sync {}

/// Identity of a tag type
#[derive(Debug, Clone, Copy)]
pub struct TagType {
    id: TypeId,
    name: &'static str,
}

impl TagType {
    /// Tag type of `T`
    pub fn of<T: Tag>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Readable tag type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TagType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TagType {}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Ordered set of tags attached to one member
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    entries: Vec<(TagType, Arc<dyn Tag>)>,
}

impl TagSet {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a tag, replacing any earlier tag of the same type
    pub fn insert<T: Tag>(&mut self, tag: T) {
        let ty = TagType::of::<T>();
        let tag: Arc<dyn Tag> = Arc::new(tag);
        match self.entries.iter_mut().find(|(t, _)| *t == ty) {
            Some(entry) => entry.1 = tag,
            None => self.entries.push((ty, tag)),
        }
    }

    /// Check whether a tag of the given type is attached
    pub fn contains(&self, ty: TagType) -> bool {
        self.entries.iter().any(|(t, _)| *t == ty)
    }

    /// Check whether a tag of type `T` is attached
    pub fn has<T: Tag>(&self) -> bool {
        self.contains(TagType::of::<T>())
    }

    /// Get the attached tag of type `T`
    pub fn get<T: Tag>(&self) -> Option<&T> {
        let ty = TagType::of::<T>();
        self.entries
            .iter()
            .find(|(t, _)| *t == ty)
            .and_then(|(_, tag)| {
                let tag: &dyn Tag = &**tag;
                let any: &dyn Any = tag;
                any.downcast_ref::<T>()
            })
    }

    /// Tag types in attachment order
    pub fn types(&self) -> impl Iterator<Item = TagType> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Number of attached tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no tags are attached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
