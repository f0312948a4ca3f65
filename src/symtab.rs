use crate::ast::DataType;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub usize);

#[derive(Debug, Clone)]
pub enum SymbolSig {
    Scalar(DataType),
    Array { elem: DataType, elem_count: i32 },
    Function {
        params: Vec<DataType>,
        return_ty: DataType,
    },
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    /// Nesting level of the declaring scope. Level 0 is the global scope;
    /// entries there live in the data segment, everything deeper lives in
    /// the enclosing function's frame.
    pub level: usize,
    /// `$fp`-relative byte offset. Meaningful only when `level > 0`.
    pub offset: i32,
    pub sig: SymbolSig,
}

/// Scope handle threaded through lowering. The pass only sees this trait,
/// so tests can substitute their own implementation.
pub trait ScopeStack {
    fn open_scope(&mut self);
    fn close_scope(&mut self);
    /// Insert into the innermost scope, shadowing any outer binding of the
    /// same name.
    fn insert_symbol(&mut self, name: &str, sig: SymbolSig) -> SymbolId;
    /// Innermost binding wins.
    fn lookup(&self, name: &str) -> Option<&SymbolEntry>;
    fn set_offset(&mut self, id: SymbolId, offset: i32);
    fn current_level(&self) -> usize;
}

/// Production scope stack: one name map per nesting level over a shared
/// entry arena, so `SymbolId`s stay valid after their scope closes.
#[derive(Debug)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    scopes: Vec<HashMap<String, SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scopes: vec![HashMap::new()],
        }
    }

    pub fn get(&self, id: SymbolId) -> &SymbolEntry {
        &self.entries[id.0]
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack for SymbolTable {
    fn open_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn close_scope(&mut self) {
        // The global scope stays; only nested scopes pop.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn insert_symbol(&mut self, name: &str, sig: SymbolSig) -> SymbolId {
        let id = SymbolId(self.entries.len());
        let level = self.scopes.len() - 1;
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            level,
            offset: 0,
            sig,
        });
        self.scopes[level].insert(name.to_string(), id);
        id
    }

    fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        for scope in self.scopes.iter().rev() {
            if let Some(id) = scope.get(name) {
                return Some(&self.entries[id.0]);
            }
        }
        None
    }

    fn set_offset(&mut self, id: SymbolId, offset: i32) {
        self.entries[id.0].offset = offset;
    }

    fn current_level(&self) -> usize {
        self.scopes.len() - 1
    }
}
