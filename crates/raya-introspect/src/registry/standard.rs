//! Standard primitive types
//!
//! Pre-registered so that field types and parameter signatures can name them.
//! Each primitive has a public zero-argument constructor producing its default
//! value.

use std::any::Any;

use super::{ConstructorDefinition, RegistryBuilder, TypeDefinition};

fn primitive<T: Any + Send + Default>(builder: &mut RegistryBuilder, name: &str) {
    let def = TypeDefinition::of::<T>(name).constructor(ConstructorDefinition::nullary(T::default));
    if let Err(err) = builder.register(def) {
        // `standard()` starts from an empty builder and the names below are
        // distinct, so this does not fire for the built-in set.
        tracing::warn!(%err, "skipping standard type");
    }
}

pub(super) fn register_primitives(builder: &mut RegistryBuilder) {
    primitive::<bool>(builder, "bool");
    primitive::<i8>(builder, "i8");
    primitive::<i16>(builder, "i16");
    primitive::<i32>(builder, "i32");
    primitive::<i64>(builder, "i64");
    primitive::<u8>(builder, "u8");
    primitive::<u16>(builder, "u16");
    primitive::<u32>(builder, "u32");
    primitive::<u64>(builder, "u64");
    primitive::<f32>(builder, "f32");
    primitive::<f64>(builder, "f64");
    primitive::<char>(builder, "char");
    primitive::<String>(builder, "String");
}
