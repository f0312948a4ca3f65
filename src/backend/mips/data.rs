use log::debug;

use super::Codegen;
use crate::ast::{DataType, Decl, Dimension, IdDecl, IdDeclKind, InitValue, Program};
use crate::symtab::SymbolSig;
use crate::{CodegenError, CodegenErrorKind};

impl Codegen<'_> {
    /// Emit `.data` definitions for every global declaration and register
    /// the globals at scope level 0, then switch to `.text`.
    pub(super) fn emit_data_segment(&mut self, program: &Program) -> Result<(), CodegenError> {
        debug!("emitting data segment");
        self.em.raw(".data");
        for decl in &program.decls {
            if let Decl::Var(v) = decl {
                for id in &v.ids {
                    self.emit_global(id)?;
                }
            }
        }
        self.em.raw(".text");
        Ok(())
    }

    fn emit_global(&mut self, id: &IdDecl) -> Result<(), CodegenError> {
        match &id.kind {
            IdDeclKind::Scalar => {
                match id.ty {
                    DataType::Int => self.em.raw(format!("_{}: .word 0", id.name)),
                    DataType::Float => self.em.raw(format!("_{}: .float 0.0", id.name)),
                    _ => {
                        return Err(CodegenError::new(
                            CodegenErrorKind::UnsupportedOperandTypes,
                            id.line,
                            format!("global '{}' has no storable type", id.name),
                        ))
                    }
                }
                self.scopes
                    .insert_symbol(&id.name, SymbolSig::Scalar(id.ty));
            }
            IdDeclKind::Array { dims } => {
                let count = fold_dims(dims, id)?;
                self.em.raw(format!("_{}: .space {}", id.name, 4 * count));
                self.scopes.insert_symbol(
                    &id.name,
                    SymbolSig::Array {
                        elem: id.ty,
                        elem_count: count,
                    },
                );
            }
            IdDeclKind::ScalarInit { init } => {
                let def = match (id.ty, init) {
                    (DataType::Int, InitValue::IntConst(n) | InitValue::FoldedInt(n)) => {
                        format!("_{}: .word {}", id.name, n)
                    }
                    (DataType::Float, InitValue::FloatConst(x) | InitValue::FoldedFloat(x)) => {
                        format!("_{}: .float {:?}", id.name, x)
                    }
                    // An int literal may initialize a float global.
                    (DataType::Float, InitValue::IntConst(n) | InitValue::FoldedInt(n)) => {
                        format!("_{}: .float {:?}", id.name, *n as f32)
                    }
                    _ => {
                        return Err(CodegenError::new(
                            CodegenErrorKind::InvalidCoercion,
                            id.line,
                            format!("initializer does not fit the type of '{}'", id.name),
                        ))
                    }
                };
                self.em.raw(def);
                self.scopes
                    .insert_symbol(&id.name, SymbolSig::Scalar(id.ty));
            }
        }
        Ok(())
    }
}

/// Multiply out the dimension list. Every dimension must already be a
/// constant, literal or folded.
pub(super) fn fold_dims(dims: &[Dimension], id: &IdDecl) -> Result<i32, CodegenError> {
    let mut count = 1i32;
    for d in dims {
        match d.value() {
            Some(n) => count *= n,
            None => {
                return Err(CodegenError::new(
                    CodegenErrorKind::NonConstantDimension,
                    id.line,
                    format!("array '{}' has a non-constant dimension", id.name),
                ))
            }
        }
    }
    Ok(count)
}
