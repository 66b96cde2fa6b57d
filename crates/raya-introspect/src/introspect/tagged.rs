//! Tag-filtered enumeration

use super::Introspector;
use crate::error::IntrospectResult;
use crate::types::{
    ConstructorDescriptor, FieldDescriptor, Member, MethodDescriptor, TagType, TypeHandle,
};

fn retain_tagged<M: Member>(members: Vec<&M>, tag: TagType) -> Vec<&M> {
    members
        .into_iter()
        .filter(|member| member.tags().contains(tag))
        .collect()
}

impl<'r> Introspector<'r> {
    /// Fields carrying a tag of type `tag`, in enumeration order
    pub fn list_fields_with_tag(
        &self,
        ty: TypeHandle,
        tag: TagType,
        recursive: bool,
    ) -> IntrospectResult<Vec<&'r FieldDescriptor>> {
        Ok(retain_tagged(self.list_fields(ty, recursive)?, tag))
    }

    /// Methods carrying a tag of type `tag`, in enumeration order
    pub fn list_methods_with_tag(
        &self,
        ty: TypeHandle,
        tag: TagType,
        recursive: bool,
    ) -> IntrospectResult<Vec<&'r MethodDescriptor>> {
        Ok(retain_tagged(self.list_methods(ty, recursive)?, tag))
    }

    /// Constructors carrying a tag of type `tag`, in enumeration order
    pub fn list_constructors_with_tag(
        &self,
        ty: TypeHandle,
        tag: TagType,
        recursive: bool,
    ) -> IntrospectResult<Vec<&'r ConstructorDescriptor>> {
        Ok(retain_tagged(self.list_constructors(ty, recursive)?, tag))
    }
}
