//! MIPS backend: lowers the resolved AST to SPIM assembly text.
//!
//! Module layout:
//! - `abi`: register names and syscall codes
//! - `emitter`: line buffer, label ids, operand-stack helpers
//! - `data`: data segment for global declarations
//! - `expr`: expression lowering onto the operand stack
//! - `stmt`: statement lowering
//! - `frame`: activation records and prologue/epilogue synthesis
//! - `intrinsics`: read/fread/write syscall lowering

pub mod abi;
pub mod emitter;

mod data;
mod expr;
mod frame;
mod intrinsics;
mod stmt;

use crate::ast::{Decl, Program};
use crate::symtab::{ScopeStack, SymbolTable};
use crate::CodegenError;
use emitter::Emitter;
use frame::FuncCx;

/// Assembly output as individual lines.
#[derive(Debug, Clone)]
pub struct MipsAsm {
    pub lines: Vec<String>,
}

impl MipsAsm {
    pub fn join(&self) -> String {
        self.lines.join("\n")
    }
}

/// Compile a resolved program to MIPS assembly text.
pub fn compile_to_mips(program: &Program) -> Result<String, CodegenError> {
    Ok(compile_to_mips_lines(program)?.join())
}

/// Compile a resolved program, keeping the line-buffer form.
pub fn compile_to_mips_lines(program: &Program) -> Result<MipsAsm, CodegenError> {
    let mut scopes = SymbolTable::new();
    compile_with_scope_stack(program, &mut scopes)
}

/// Compile against a caller-supplied scope stack.
pub fn compile_with_scope_stack(
    program: &Program,
    scopes: &mut dyn ScopeStack,
) -> Result<MipsAsm, CodegenError> {
    let mut cg = Codegen::new(scopes);
    cg.emit_data_segment(program)?;
    for decl in &program.decls {
        if let Decl::Func(f) = decl {
            cg.lower_function(f)?;
        }
    }
    Ok(cg.finish())
}

/// Lowering state: the output buffer, the scope handle, and the context of
/// the function currently being lowered (if any).
struct Codegen<'s> {
    em: Emitter,
    scopes: &'s mut dyn ScopeStack,
    fn_cx: Option<FuncCx>,
}

impl<'s> Codegen<'s> {
    fn new(scopes: &'s mut dyn ScopeStack) -> Self {
        Self {
            em: Emitter::new(),
            scopes,
            fn_cx: None,
        }
    }

    fn finish(self) -> MipsAsm {
        MipsAsm {
            lines: self.em.finish(),
        }
    }
}
