// src/sema/analysis.rs
//! Checker output: side tables keyed by [`NodeId`].
//!
//! The AST stays immutable after parsing; everything the code generator
//! needs — resolved types, cast targets, variable slots, signatures,
//! field owners — is recorded here.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::frontend::ast::NodeId;
use crate::sema::registry::Signature;
use crate::sema::types::{ClassKey, Type};

#[derive(Debug, Default)]
pub struct Analysis {
    /// Resolved type of every checked expression.
    types: FxHashMap<NodeId, Type>,
    /// Coercion target recorded where an operand needs widening or a
    /// condition/index needs conversion.
    casts: FxHashMap<NodeId, Type>,
    /// Runtime slot for variable declarations, parameters, and identifier
    /// uses that resolved to a variable.
    slots: FxHashMap<NodeId, u16>,
    /// Resolved signature per call and constructor-call node.
    signatures: FxHashMap<NodeId, Signature>,
    /// Resolved owner class per field access.
    owners: FxHashMap<NodeId, ClassKey>,
    /// Identifier nodes that resolved to companion fields.
    companion_fields: FxHashSet<NodeId>,
    /// Identifier nodes that resolved to a class name (companion target).
    companion_targets: FxHashSet<NodeId>,
    /// Call nodes written in companion form (through a type, not an instance).
    companion_calls: FxHashSet<NodeId>,
    /// Expression-statement roots whose value is discarded.
    discarded: FxHashSet<NodeId>,
    /// Index expressions that are assignment targets.
    assigned_indices: FxHashSet<NodeId>,
    /// Declared return type recorded on each return statement.
    return_types: FxHashMap<NodeId, Type>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn record_cast(&mut self, id: NodeId, target: Type) {
        self.casts.insert(id, target);
    }

    pub fn cast_of(&self, id: NodeId) -> Option<&Type> {
        self.casts.get(&id)
    }

    pub fn record_slot(&mut self, id: NodeId, slot: u16) {
        self.slots.insert(id, slot);
    }

    pub fn slot_of(&self, id: NodeId) -> Option<u16> {
        self.slots.get(&id).copied()
    }

    pub fn record_signature(&mut self, id: NodeId, signature: Signature) {
        self.signatures.insert(id, signature);
    }

    pub fn signature_of(&self, id: NodeId) -> Option<&Signature> {
        self.signatures.get(&id)
    }

    pub fn record_owner(&mut self, id: NodeId, owner: ClassKey) {
        self.owners.insert(id, owner);
    }

    pub fn owner_of(&self, id: NodeId) -> Option<&ClassKey> {
        self.owners.get(&id)
    }

    pub fn mark_companion_field(&mut self, id: NodeId) {
        self.companion_fields.insert(id);
    }

    pub fn is_companion_field(&self, id: NodeId) -> bool {
        self.companion_fields.contains(&id)
    }

    pub fn mark_companion_target(&mut self, id: NodeId) {
        self.companion_targets.insert(id);
    }

    pub fn is_companion_target(&self, id: NodeId) -> bool {
        self.companion_targets.contains(&id)
    }

    pub fn mark_companion_call(&mut self, id: NodeId) {
        self.companion_calls.insert(id);
    }

    pub fn is_companion_call(&self, id: NodeId) -> bool {
        self.companion_calls.contains(&id)
    }

    pub fn mark_discarded(&mut self, id: NodeId) {
        self.discarded.insert(id);
    }

    pub fn is_discarded(&self, id: NodeId) -> bool {
        self.discarded.contains(&id)
    }

    pub fn mark_assigned_index(&mut self, id: NodeId) {
        self.assigned_indices.insert(id);
    }

    pub fn is_assigned_index(&self, id: NodeId) -> bool {
        self.assigned_indices.contains(&id)
    }

    pub fn record_return_type(&mut self, id: NodeId, ty: Type) {
        self.return_types.insert(id, ty);
    }

    pub fn return_type_of(&self, id: NodeId) -> Option<&Type> {
        self.return_types.get(&id)
    }
}
