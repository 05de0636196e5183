// src/sema/checker/mod.rs
//! Two-pass semantic checker.
//!
//! Pass A registers the file's class — fields, function and constructor
//! signatures — into the registry, so bodies can forward-reference anything
//! in the class. Pass B opens a scope per function and checks bodies.
//! Every diagnostic accumulates in the report sink; nothing unwinds.

mod arrays;
mod expr;
mod stmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::errors::{Reports, SemaError};
use crate::frontend::ast::*;
use crate::frontend::{Interner, Span};
use crate::sema::analysis::Analysis;
use crate::sema::registry::{ClassInfo, FieldInfo, Signature, TypeRegistry, CTOR_NAME};
use crate::sema::scope::Scope;
use crate::sema::types::{ClassKey, Type};

pub struct Checker<'a> {
    pub(crate) interner: &'a Interner,
    pub(crate) reports: &'a mut Reports,
    pub(crate) registry: TypeRegistry,
    pub(crate) analysis: Analysis,
    /// Short name (or alias) to qualified class, from the usage table.
    pub(crate) usages: FxHashMap<Symbol, ClassKey>,
    pub(crate) scope: Scope,
    pub(crate) current_class: ClassKey,
    pub(crate) current_return: Type,
}

impl<'a> Checker<'a> {
    /// `registry` carries the externally known classes; it is treated as
    /// read-only except for the one class this file declares.
    pub fn new(interner: &'a Interner, registry: TypeRegistry, reports: &'a mut Reports) -> Self {
        let placeholder = ClassKey::new("");
        Self {
            interner,
            reports,
            registry,
            analysis: Analysis::new(),
            usages: FxHashMap::default(),
            scope: Scope::new(placeholder.clone()),
            current_class: placeholder,
            current_return: Type::Unit,
        }
    }

    /// Check the file: signatures first, then bodies. Once both passes are
    /// done the report list is put back into source-position order, since
    /// pass A touches every signature before pass B reaches the first body.
    pub fn check(mut self, file: &File) -> (Analysis, TypeRegistry) {
        if let Some(clazz) = &file.clazz {
            self.declare_class(clazz);
            self.check_bodies(clazz);
        }
        self.reports.sort_by_position();
        (self.analysis, self.registry)
    }

    // -----------------------------------------------------------------------
    // Pass A — signatures
    // -----------------------------------------------------------------------

    fn declare_class(&mut self, clazz: &Class) {
        let key = ClassKey::new(clazz.qualified_name(self.interner));
        self.current_class = key.clone();
        self.scope = Scope::new(key.clone());

        for usage in &clazz.usages {
            let short = usage.alias.unwrap_or_else(|| usage.reference.name());
            let target = ClassKey::new(usage.reference.qualified(self.interner));
            self.usages.insert(short, target);
        }
        // The class's own simple name resolves to itself.
        self.usages.insert(clazz.name, key.clone());

        let mut info = ClassInfo::new(key.clone());

        for field in &clazz.fields {
            let ty = self.resolve_type_ref_or_report(&field.type_ref);
            let added = info.add_field(FieldInfo {
                owner: key.clone(),
                name: self.interner.resolve(field.name).to_string(),
                ty,
                mutable: field.mutable,
                companion: field.companion,
                accessor: field.accessor,
            });
            if !added {
                let name = self.interner.resolve(field.name).to_string();
                self.reports.push(
                    SemaError::DuplicateField {
                        name,
                        span: field.span.into(),
                    },
                    Some(field.span),
                );
            }
        }

        for function in &clazz.functions {
            let params = self.signature_params(&function.params);
            let ret = match &function.return_type_ref {
                Some(type_ref) => self.resolve_type_ref_or_report(type_ref),
                None => Type::Unit,
            };
            let added = info.add_signature(Signature {
                owner: key.clone(),
                name: self.interner.resolve(function.name).to_string(),
                params,
                ret,
                companion: function.companion,
            });
            if !added {
                let name = self.interner.resolve(function.name).to_string();
                self.reports.push(
                    SemaError::DuplicateFunction {
                        name,
                        span: function.span.into(),
                    },
                    Some(function.span),
                );
            }
        }

        for constructor in &clazz.constructors {
            let params = self.signature_params(&constructor.params);
            let added = info.add_signature(Signature {
                owner: key.clone(),
                name: CTOR_NAME.to_string(),
                params,
                ret: Type::Class(key.clone()),
                companion: false,
            });
            if !added {
                self.reports.push(
                    SemaError::DuplicateConstructor {
                        span: constructor.span.into(),
                    },
                    Some(constructor.span),
                );
            }
        }

        // A class with no declared constructor gets the implicit zero-arg one.
        if clazz.constructors.is_empty() {
            info.add_signature(Signature {
                owner: key.clone(),
                name: CTOR_NAME.to_string(),
                params: SmallVec::new(),
                ret: Type::Class(key.clone()),
                companion: false,
            });
        }

        self.registry.insert(info);
    }

    fn signature_params(&mut self, params: &[Parameter]) -> SmallVec<[Type; 4]> {
        let mut seen: FxHashSet<Symbol> = FxHashSet::default();
        let mut types = SmallVec::new();
        for param in params {
            if !seen.insert(param.name) {
                let name = self.interner.resolve(param.name).to_string();
                self.reports.push(
                    SemaError::DuplicateParameter {
                        name,
                        span: param.span.into(),
                    },
                    Some(param.span),
                );
            }
            types.push(self.resolve_type_ref_or_report(&param.type_ref));
        }
        types
    }

    // -----------------------------------------------------------------------
    // Pass B — bodies
    // -----------------------------------------------------------------------

    fn check_bodies(&mut self, clazz: &Class) {
        for constructor in &clazz.constructors {
            self.current_return = Type::Unit;
            self.scope.enter_function(false);
            self.scope.reserve(1); // self
            self.declare_params(&constructor.params);
            self.check_stmts(&constructor.body);
            self.scope.exit();
        }

        for function in &clazz.functions {
            self.current_return = match &function.return_type_ref {
                Some(type_ref) => self.resolve_type_ref(type_ref).unwrap_or(Type::Error),
                None => Type::Unit,
            };
            self.scope.enter_function(function.companion);
            if !function.companion {
                self.scope.reserve(1); // self
            }
            self.declare_params(&function.params);
            self.check_stmts(&function.body);
            self.scope.exit();
        }
    }

    fn declare_params(&mut self, params: &[Parameter]) {
        for param in params {
            let ty = self.resolve_type_ref(&param.type_ref).unwrap_or(Type::Error);
            // Duplicate names were reported in pass A; a failed declare here
            // is silent.
            if let Some(slot) = self.scope.declare(param.name, param.mutable, ty) {
                self.analysis.record_slot(param.id, slot);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Name resolution
    // -----------------------------------------------------------------------

    /// Resolve a declared type: usages first, then known classes, then the
    /// primitive table; bracket suffixes wrap the result in array types.
    pub(crate) fn resolve_type_ref(&self, type_ref: &TypeRef) -> Option<Type> {
        let mut ty = self.resolve_reference_type(&type_ref.reference)?;
        for _ in 0..type_ref.dims {
            ty = Type::array(ty);
        }
        Some(ty)
    }

    fn resolve_reference_type(&self, reference: &Reference) -> Option<Type> {
        if reference.segments.len() == 1 {
            let name = reference.name();
            if let Some(key) = self.usages.get(&name) {
                return Some(Type::Class(key.clone()));
            }
            let text = self.interner.resolve(name);
            let plain = ClassKey::new(text);
            if self.registry.contains(&plain) {
                return Some(Type::Class(plain));
            }
            return Type::primitive_named(text);
        }
        let qualified = ClassKey::new(reference.qualified(self.interner));
        if self.registry.contains(&qualified) {
            return Some(Type::Class(qualified));
        }
        // A multi-segment path spelled exactly like a usage target is the
        // same import written long-hand.
        if self.usages.values().any(|v| v == &qualified) {
            return Some(Type::Class(qualified));
        }
        None
    }

    pub(crate) fn resolve_type_ref_or_report(&mut self, type_ref: &TypeRef) -> Type {
        match self.resolve_type_ref(type_ref) {
            Some(ty) => ty,
            None => {
                let name = type_ref.reference.qualified(self.interner);
                self.reports.push(
                    SemaError::UnknownType {
                        name,
                        span: type_ref.span.into(),
                    },
                    Some(type_ref.span),
                );
                Type::Error
            }
        }
    }

    /// Resolve the owner path of a companion access (`Owner::member`).
    pub(crate) fn resolve_owner(&self, reference: &Reference) -> Option<ClassKey> {
        match self.resolve_reference_type(reference)? {
            Type::Class(key) => Some(key),
            _ => None,
        }
    }

    pub(crate) fn report_unknown_owner(&mut self, reference: &Reference) {
        let name = reference.qualified(self.interner);
        let span = reference.span;
        self.reports.push(
            SemaError::UnknownType {
                name,
                span: span.into(),
            },
            Some(span),
        );
    }

    /// Internal invariant breakage: reported as a warning, never a panic.
    pub(crate) fn internal_error(&mut self, detail: &str, span: Span) {
        self.reports.push(
            SemaError::Internal {
                detail: detail.to_string(),
                span: span.into(),
            },
            Some(span),
        );
    }
}
