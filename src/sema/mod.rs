// src/sema/mod.rs

pub mod analysis;
pub mod checker;
pub mod registry;
pub mod scope;
pub mod types;

pub use analysis::Analysis;
pub use checker::Checker;
pub use registry::{ClassInfo, FieldInfo, Lookup, Signature, TypeRegistry, CTOR_NAME};
pub use scope::{Scope, Variable};
pub use types::{ClassKey, Type};
