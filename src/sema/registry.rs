// src/sema/registry.rs
//! Class metadata and the global type registry.
//!
//! The registry maps qualified class names to their fields and signatures.
//! Externally known classes are populated by the embedder before checking;
//! the checker inserts the file's own class during its first pass. Lookup
//! after that point is read-only.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::frontend::ast::Accessor;
use crate::sema::types::{ClassKey, Type};

/// Constructor signatures are registered under this name.
pub const CTOR_NAME: &str = "<init>";

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub owner: ClassKey,
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub companion: bool,
    pub accessor: Accessor,
}

/// A function or constructor identity: owner, name, ordered parameter types.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub owner: ClassKey,
    pub name: String,
    pub params: SmallVec<[Type; 4]>,
    pub ret: Type,
    pub companion: bool,
}

impl Signature {
    pub fn is_constructor(&self) -> bool {
        self.name == CTOR_NAME
    }
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub key: ClassKey,
    pub fields: Vec<FieldInfo>,
    pub signatures: Vec<Signature>,
    /// Set when this class is the boxed form of a primitive; array literal
    /// inference unboxes such foundations.
    pub boxes: Option<Type>,
}

impl ClassInfo {
    pub fn new(key: ClassKey) -> Self {
        Self {
            key,
            fields: vec![],
            signatures: vec![],
            boxes: None,
        }
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Add a field; `false` when a field of that name already exists.
    pub fn add_field(&mut self, field: FieldInfo) -> bool {
        if self.find_field(&field.name).is_some() {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Add a signature; `false` when one with the same name and parameter
    /// type list already exists.
    pub fn add_signature(&mut self, signature: Signature) -> bool {
        let duplicate = self
            .signatures
            .iter()
            .any(|s| s.name == signature.name && s.params == signature.params);
        if duplicate {
            return false;
        }
        self.signatures.push(signature);
        true
    }
}

/// Outcome of overload resolution.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Signature),
    Ambiguous,
    Missing,
}

#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: FxHashMap<ClassKey, ClassInfo>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: ClassInfo) {
        self.classes.insert(info.key.clone(), info);
    }

    pub fn get(&self, key: &ClassKey) -> Option<&ClassInfo> {
        self.classes.get(key)
    }

    pub fn contains(&self, key: &ClassKey) -> bool {
        self.classes.contains_key(key)
    }

    pub fn find_field(&self, key: &ClassKey, name: &str) -> Option<&FieldInfo> {
        self.get(key).and_then(|c| c.find_field(name))
    }

    /// Resolve `name(args)` on `key` under numeric promotion: an argument
    /// matches a parameter when it is identical or implicitly widenable.
    /// The most specific candidate (least total widening) wins; a tie is
    /// ambiguous.
    pub fn find_function(&self, key: &ClassKey, name: &str, args: &[Type]) -> Lookup<'_> {
        let Some(info) = self.get(key) else {
            return Lookup::Missing;
        };

        let mut best: Option<(&Signature, u32)> = None;
        let mut tied = false;
        for candidate in info.signatures.iter().filter(|s| s.name == name) {
            let Some(cost) = match_cost(args, &candidate.params) else {
                continue;
            };
            match &best {
                Some((_, best_cost)) if cost > *best_cost => {}
                Some((_, best_cost)) if cost == *best_cost => tied = true,
                _ => {
                    best = Some((candidate, cost));
                    tied = false;
                }
            }
        }

        match best {
            Some(_) if tied => Lookup::Ambiguous,
            Some((signature, _)) => Lookup::Found(signature),
            None => Lookup::Missing,
        }
    }
}

/// Total conversion cost of `args` against `params`, or `None` when they do
/// not match. Identity costs nothing, numeric widening costs the rank
/// distance, null-into-reference costs one.
fn match_cost(args: &[Type], params: &[Type]) -> Option<u32> {
    if args.len() != params.len() {
        return None;
    }
    let mut cost = 0u32;
    for (arg, param) in args.iter().zip(params.iter()) {
        if arg == param || matches!(arg, Type::Error) {
            continue;
        }
        if !arg.can_cast(param) {
            return None;
        }
        cost += match (arg.rank(), param.rank()) {
            (Some(from), Some(to)) => u32::from(to - from),
            _ => 1,
        };
    }
    Some(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn key() -> ClassKey {
        ClassKey::new("a/X")
    }

    fn sig(name: &str, params: SmallVec<[Type; 4]>, ret: Type) -> Signature {
        Signature {
            owner: key(),
            name: name.to_string(),
            params,
            ret,
            companion: false,
        }
    }

    fn registry_with(signatures: Vec<Signature>) -> TypeRegistry {
        let mut info = ClassInfo::new(key());
        for s in signatures {
            assert!(info.add_signature(s));
        }
        let mut registry = TypeRegistry::new();
        registry.insert(info);
        registry
    }

    #[test]
    fn exact_match_beats_widening() {
        let registry = registry_with(vec![
            sig("f", smallvec![Type::I32], Type::Unit),
            sig("f", smallvec![Type::I64], Type::Unit),
        ]);
        match registry.find_function(&key(), "f", &[Type::I32]) {
            Lookup::Found(s) => assert_eq!(s.params[0], Type::I32),
            other => panic!("expected exact match, got {:?}", other),
        }
    }

    #[test]
    fn widening_picks_the_nearest_overload() {
        let registry = registry_with(vec![
            sig("f", smallvec![Type::I32], Type::Unit),
            sig("f", smallvec![Type::I64], Type::Unit),
        ]);
        match registry.find_function(&key(), "f", &[Type::I8]) {
            Lookup::Found(s) => assert_eq!(s.params[0], Type::I32),
            other => panic!("expected i32 overload, got {:?}", other),
        }
    }

    #[test]
    fn no_narrowing_match() {
        let registry = registry_with(vec![sig("f", smallvec![Type::I8], Type::Unit)]);
        assert_eq!(
            registry.find_function(&key(), "f", &[Type::I64]),
            Lookup::Missing
        );
    }

    #[test]
    fn ambiguous_when_two_candidates_cost_the_same() {
        // i16 -> (i32, i64) costs 1+3; i16 -> (i64, i32) costs 3+1.
        let registry = registry_with(vec![
            sig("f", smallvec![Type::I32, Type::I64], Type::Unit),
            sig("f", smallvec![Type::I64, Type::I32], Type::Unit),
        ]);
        assert_eq!(
            registry.find_function(&key(), "f", &[Type::I16, Type::I16]),
            Lookup::Ambiguous
        );
    }

    #[test]
    fn null_argument_matches_reference_parameter() {
        let registry = registry_with(vec![sig("f", smallvec![Type::Str], Type::Unit)]);
        assert!(matches!(
            registry.find_function(&key(), "f", &[Type::Null]),
            Lookup::Found(_)
        ));
    }

    #[test]
    fn duplicate_detection_by_name_and_params() {
        let mut info = ClassInfo::new(key());
        assert!(info.add_signature(sig("f", smallvec![Type::I32], Type::Unit)));
        assert!(!info.add_signature(sig("f", smallvec![Type::I32], Type::I64)));
        assert!(info.add_signature(sig("f", smallvec![Type::I64], Type::Unit)));

        let field = FieldInfo {
            owner: key(),
            name: "a".to_string(),
            ty: Type::I32,
            mutable: false,
            companion: false,
            accessor: Accessor::Pub,
        };
        assert!(info.add_field(field.clone()));
        assert!(!info.add_field(field));
    }
}
