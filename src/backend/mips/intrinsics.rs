use log::debug;

use super::abi::{
    FReg, Reg, SYS_PRINT_FLOAT, SYS_PRINT_INT, SYS_PRINT_STRING, SYS_READ_FLOAT, SYS_READ_INT,
};
use super::Codegen;
use crate::ast::{CallExpr, DataType, Expr};
use crate::{CodegenError, CodegenErrorKind};

impl Codegen<'_> {
    /// `read()`: int from stdin into `$v0`, pushed.
    pub(super) fn lower_read(&mut self) {
        debug!("intrinsic read");
        self.em.ins("li", format!("{}, {}", Reg::V0, SYS_READ_INT));
        self.em.ins("syscall", "");
        self.em.push(Reg::V0);
    }

    /// `fread()`: float from stdin into `$f0`, pushed.
    pub(super) fn lower_fread(&mut self) {
        debug!("intrinsic fread");
        self.em
            .ins("li", format!("{}, {}", Reg::V0, SYS_READ_FLOAT));
        self.em.ins("syscall", "");
        self.em.push_f(FReg::F0);
    }

    /// `write(arg)`: print syscall selected by the argument's type. Never
    /// a `jal`; nothing is pushed.
    pub(super) fn lower_write(&mut self, c: &CallExpr) -> Result<(), CodegenError> {
        debug!("intrinsic write");
        let arg = match c.args.as_slice() {
            [arg] => arg,
            _ => {
                return Err(CodegenError::new(
                    CodegenErrorKind::UnsupportedWriteArgument,
                    c.line,
                    format!("write takes exactly one argument, got {}", c.args.len()),
                ))
            }
        };

        if let Expr::StringConst { value, .. } = arg {
            // string pool entry inline in the text region
            let n = self.em.fresh_id();
            let label = format!("_str{}", n);
            self.em.raw(".data");
            self.em.raw(format!("{}: .asciiz \"{}\"", label, value));
            self.em.raw(".text");
            self.em.ins("la", format!("{}, {}", Reg::A0, label));
            self.em
                .ins("li", format!("{}, {}", Reg::V0, SYS_PRINT_STRING));
            self.em.ins("syscall", "");
            return Ok(());
        }

        match self.expr_ty(arg)? {
            DataType::Int => {
                self.lower_expr(arg)?;
                self.em.pop(Reg::A0);
                self.em.ins("li", format!("{}, {}", Reg::V0, SYS_PRINT_INT));
                self.em.ins("syscall", "");
                Ok(())
            }
            DataType::Float => {
                self.lower_expr(arg)?;
                self.em.pop_f(FReg::F12);
                self.em
                    .ins("li", format!("{}, {}", Reg::V0, SYS_PRINT_FLOAT));
                self.em.ins("syscall", "");
                Ok(())
            }
            other => Err(CodegenError::new(
                CodegenErrorKind::UnsupportedWriteArgument,
                arg.line(),
                format!("write cannot print a {:?} value", other),
            )),
        }
    }
}
