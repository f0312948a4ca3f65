use log::debug;

use super::abi::{FReg, Reg, SYS_EXIT};
use super::data::fold_dims;
use super::Codegen;
use crate::ast::{DataType, FuncDecl, IdDecl, IdDeclKind, InitValue, Param, VarDecl};
use crate::symtab::SymbolSig;
use crate::{CodegenError, CodegenErrorKind};

/// First frame-cursor value. `0($fp)` holds the saved frame pointer and
/// `4($fp)` the return address, so the first local lands just below.
pub(super) const FRAME_CURSOR_START: i32 = -4;

/// Context of the function currently being lowered.
pub(super) struct FuncCx {
    pub name: String,
    pub return_ty: DataType,
    pub cursor: i32,
}

impl FuncCx {
    /// Hand out the current slot and advance the cursor downward.
    fn alloc(&mut self, bytes: i32) -> i32 {
        let offset = self.cursor;
        self.cursor -= bytes;
        offset
    }
}

impl Codegen<'_> {
    pub(super) fn lower_function(&mut self, f: &FuncDecl) -> Result<(), CodegenError> {
        debug!("lowering function '{}'", f.name);
        // registered before the body walk so calls and returns resolve
        self.scopes.insert_symbol(
            &f.name,
            SymbolSig::Function {
                params: f.params.iter().map(|p| p.ty).collect(),
                return_ty: f.return_ty,
            },
        );
        let is_entry = f.name == "main";

        self.em.raw(".text");
        if is_entry {
            self.em.raw(".globl main");
        }
        self.em.label(&f.name);
        self.em.ins("sw", format!("{}, 0({})", Reg::Ra, Reg::Sp));
        self.em.ins("sw", format!("{}, -4({})", Reg::Fp, Reg::Sp));
        self.em.ins("add", format!("{}, {}, -4", Reg::Fp, Reg::Sp));
        self.em.ins("add", format!("{}, {}, -8", Reg::Sp, Reg::Sp));
        self.em.label(&format!("_begin_{}", f.name));

        self.fn_cx = Some(FuncCx {
            name: f.name.clone(),
            return_ty: f.return_ty,
            cursor: FRAME_CURSOR_START,
        });

        self.scopes.open_scope();
        for p in &f.params {
            self.lower_param(p);
        }
        self.lower_block(&f.body)?;
        self.scopes.close_scope();

        let final_cursor = self
            .fn_cx
            .take()
            .map(|fx| fx.cursor)
            .unwrap_or(FRAME_CURSOR_START);

        self.em.label(&format!("_end_{}", f.name));
        self.em.ins("lw", format!("{}, 4({})", Reg::Ra, Reg::Fp));
        self.em.ins("add", format!("{}, {}, 4", Reg::Sp, Reg::Fp));
        self.em.ins("lw", format!("{}, 0({})", Reg::Fp, Reg::Fp));
        if is_entry {
            self.em.ins("li", format!("{}, {}", Reg::V0, SYS_EXIT));
            self.em.ins("syscall", "");
        } else {
            self.em.ins("jr", Reg::Ra.as_str());
        }

        // local bytes exactly, no alignment padding
        let frame_bytes = -final_cursor - 4;
        self.em.raw(".data");
        self.em
            .raw(format!("_framesize_of_{}: .word {}", f.name, frame_bytes));
        self.em.raw(".text");
        Ok(())
    }

    /// Parameters take frame slots exactly like scalar locals.
    fn lower_param(&mut self, p: &Param) {
        let id = self.scopes.insert_symbol(&p.name, SymbolSig::Scalar(p.ty));
        let offset = self.alloc_frame(4);
        self.scopes.set_offset(id, offset);
        self.em.ins("sub", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
    }

    pub(super) fn lower_local_decls(&mut self, d: &VarDecl) -> Result<(), CodegenError> {
        for id in &d.ids {
            self.lower_local(id)?;
        }
        Ok(())
    }

    fn lower_local(&mut self, id: &IdDecl) -> Result<(), CodegenError> {
        match &id.kind {
            IdDeclKind::Scalar => {
                let sym = self.scopes.insert_symbol(&id.name, SymbolSig::Scalar(id.ty));
                let offset = self.alloc_frame(4);
                self.scopes.set_offset(sym, offset);
                self.em.ins("sub", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
                Ok(())
            }
            IdDeclKind::Array { dims } => {
                let count = fold_dims(dims, id)?;
                let bytes = 4 * count;
                let sym = self.scopes.insert_symbol(
                    &id.name,
                    SymbolSig::Array {
                        elem: id.ty,
                        elem_count: count,
                    },
                );
                let offset = self.alloc_frame(bytes);
                self.scopes.set_offset(sym, offset);
                self.em
                    .ins("sub", format!("{}, {}, {}", Reg::Sp, Reg::Sp, bytes));
                Ok(())
            }
            IdDeclKind::ScalarInit { init } => {
                let sym = self.scopes.insert_symbol(&id.name, SymbolSig::Scalar(id.ty));
                let offset = self.alloc_frame(4);
                self.scopes.set_offset(sym, offset);
                self.em.ins("sub", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
                self.store_init(id, *init, offset)
            }
        }
    }

    /// Materialize a constant initializer and store it into the fresh slot.
    fn store_init(
        &mut self,
        id: &IdDecl,
        init: InitValue,
        offset: i32,
    ) -> Result<(), CodegenError> {
        let cell = format!("{}({})", offset, Reg::Fp);
        match (id.ty, init) {
            (DataType::Int, InitValue::IntConst(n) | InitValue::FoldedInt(n)) => {
                self.em.ins("li", format!("{}, {}", Reg::T0, n));
                self.em.ins("sw", format!("{}, {}", Reg::T0, cell));
                Ok(())
            }
            (DataType::Float, InitValue::FloatConst(x) | InitValue::FoldedFloat(x)) => {
                self.em.ins("li.s", format!("{}, {:?}", FReg::F0, x));
                self.em.ins("swc1", format!("{}, {}", FReg::F0, cell));
                Ok(())
            }
            (DataType::Float, InitValue::IntConst(n) | InitValue::FoldedInt(n)) => {
                self.em.ins("li", format!("{}, {}", Reg::T0, n));
                self.promote_to_float(Reg::T0, FReg::F0);
                self.em.ins("swc1", format!("{}, {}", FReg::F0, cell));
                Ok(())
            }
            _ => Err(CodegenError::new(
                CodegenErrorKind::InvalidCoercion,
                id.line,
                format!("initializer does not fit the type of '{}'", id.name),
            )),
        }
    }

    fn alloc_frame(&mut self, bytes: i32) -> i32 {
        match self.fn_cx.as_mut() {
            Some(fx) => fx.alloc(bytes),
            None => FRAME_CURSOR_START,
        }
    }
}
