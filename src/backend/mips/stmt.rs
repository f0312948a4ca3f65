use super::abi::{FReg, Reg};
use super::Codegen;
use crate::ast::{Block, CallExpr, DataType, ElseBranch, Expr, IdentRef, IfStmt, Stmt};
use crate::symtab::SymbolSig;
use crate::{CodegenError, CodegenErrorKind};

impl Codegen<'_> {
    pub(super) fn lower_stmt(&mut self, s: &Stmt) -> Result<(), CodegenError> {
        match s {
            Stmt::Assign {
                target,
                value,
                line,
            } => {
                self.em.comment_at(*line, "assignment");
                self.lower_assign(target, value)
            }
            Stmt::If(ifs) => {
                self.em.comment_at(ifs.line, "if statement");
                self.lower_if(ifs)
            }
            Stmt::While { cond, body, line } => {
                self.em.comment_at(*line, "while statement");
                self.lower_while(cond, body)
            }
            Stmt::For { line } => Err(CodegenError::new(
                CodegenErrorKind::UnsupportedConstruct,
                *line,
                "for loops are not lowered by this backend",
            )),
            Stmt::Return { value, line } => {
                self.em.comment_at(*line, "return");
                self.lower_return(value.as_ref(), *line)
            }
            Stmt::Call(c) => {
                self.em.comment_at(c.line, "call");
                let pushed = self.lower_call(c)?;
                if pushed {
                    // the statement discards the value
                    self.em
                        .ins("addiu", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
                }
                Ok(())
            }
            Stmt::Block(b) => self.lower_block(b),
        }
    }

    /// Open a scope, lower local declarations then statements, close the
    /// scope again.
    pub(super) fn lower_block(&mut self, b: &Block) -> Result<(), CodegenError> {
        self.scopes.open_scope();
        for d in &b.decls {
            self.lower_local_decls(d)?;
        }
        for s in &b.stmts {
            self.lower_stmt(s)?;
        }
        self.scopes.close_scope();
        Ok(())
    }

    fn lower_assign(&mut self, target: &IdentRef, value: &Expr) -> Result<(), CodegenError> {
        let (target_ty, cell) = self.resolve_scalar(target)?;
        let value_ty = self.expr_ty(value)?;
        self.lower_expr(value)?;
        match (target_ty, value_ty) {
            (DataType::Int, DataType::Int) => {
                self.em.pop(Reg::T0);
                self.em.ins("sw", format!("{}, {}", Reg::T0, cell));
                Ok(())
            }
            (DataType::Float, DataType::Float) => {
                self.em.pop_f(FReg::F0);
                self.em.ins("swc1", format!("{}, {}", FReg::F0, cell));
                Ok(())
            }
            (DataType::Float, DataType::Int) => {
                self.em.pop(Reg::T0);
                self.promote_to_float(Reg::T0, FReg::F0);
                self.em.ins("swc1", format!("{}, {}", FReg::F0, cell));
                Ok(())
            }
            (DataType::Int, DataType::Float) => Err(CodegenError::new(
                CodegenErrorKind::InvalidCoercion,
                target.line,
                format!("cannot narrow a float value into int '{}'", target.name),
            )),
            _ => Err(CodegenError::new(
                CodegenErrorKind::InvalidCoercion,
                target.line,
                format!("cannot store a {:?} value into '{}'", value_ty, target.name),
            )),
        }
    }

    fn lower_if(&mut self, ifs: &IfStmt) -> Result<(), CodegenError> {
        let n = self.em.fresh_id();
        let else_l = format!("_if{}_else", n);
        let exit_l = format!("_if{}_exit", n);

        self.lower_expr(&ifs.cond)?;
        self.em.pop(Reg::T0);
        self.em.ins("beqz", format!("{}, {}", Reg::T0, else_l));
        self.lower_block(&ifs.then_block)?;
        self.em.ins("j", &exit_l);
        self.em.label(&else_l);
        match &ifs.else_branch {
            Some(ElseBranch::ElseIf(inner)) => self.lower_if(inner)?,
            Some(ElseBranch::Else(b)) => self.lower_block(b)?,
            None => {}
        }
        self.em.label(&exit_l);
        Ok(())
    }

    fn lower_while(&mut self, cond: &Expr, body: &Block) -> Result<(), CodegenError> {
        let n = self.em.fresh_id();
        let top_l = format!("_while{}", n);
        let exit_l = format!("_while{}_exit", n);

        // the condition reloads from memory on every iteration
        self.em.label(&top_l);
        self.lower_expr(cond)?;
        self.em.pop(Reg::T0);
        self.em.ins("beqz", format!("{}, {}", Reg::T0, exit_l));
        self.lower_block(body)?;
        self.em.ins("j", &top_l);
        self.em.label(&exit_l);
        Ok(())
    }

    fn lower_return(&mut self, value: Option<&Expr>, line: usize) -> Result<(), CodegenError> {
        let (fname, ret_ty) = match &self.fn_cx {
            Some(fx) => (fx.name.clone(), fx.return_ty),
            None => {
                return Err(CodegenError::new(
                    CodegenErrorKind::ReturnOutsideFunction,
                    line,
                    "return lowered with no enclosing function",
                ))
            }
        };

        if let Some(v) = value {
            let vty = self.expr_ty(v)?;
            self.lower_expr(v)?;
            match (ret_ty, vty) {
                (DataType::Int, DataType::Int) => self.em.pop(Reg::V0),
                (DataType::Float, DataType::Float) => self.em.pop_f(FReg::F0),
                (DataType::Float, DataType::Int) => {
                    self.em.pop(Reg::T0);
                    self.promote_to_float(Reg::T0, FReg::F0);
                }
                _ => {
                    return Err(CodegenError::new(
                        CodegenErrorKind::InvalidCoercion,
                        line,
                        format!("cannot return a {:?} value from '{}'", vty, fname),
                    ))
                }
            }
        }
        self.em.ins("j", format!("_end_{}", fname));
        Ok(())
    }

    /// Lower a call. Returns whether a result value was pushed onto the
    /// operand stack.
    pub(super) fn lower_call(&mut self, c: &CallExpr) -> Result<bool, CodegenError> {
        match c.callee.as_str() {
            "read" => {
                self.lower_read();
                Ok(true)
            }
            "fread" => {
                self.lower_fread();
                Ok(true)
            }
            "write" => {
                self.lower_write(c)?;
                Ok(false)
            }
            _ => {
                let ret_ty = self.callee_return_ty(c)?;
                self.em.ins("jal", &c.callee);
                match ret_ty {
                    DataType::Int => {
                        self.em.push(Reg::V0);
                        Ok(true)
                    }
                    DataType::Float => {
                        self.em.push_f(FReg::F0);
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    /// Return type of a callee: the intrinsics have fixed signatures,
    /// everything else resolves through the scope stack.
    pub(super) fn callee_return_ty(&self, c: &CallExpr) -> Result<DataType, CodegenError> {
        match c.callee.as_str() {
            "read" => Ok(DataType::Int),
            "fread" => Ok(DataType::Float),
            "write" => Ok(DataType::Void),
            _ => match self.scopes.lookup(&c.callee) {
                Some(entry) => match &entry.sig {
                    SymbolSig::Function { return_ty, .. } => Ok(*return_ty),
                    _ => Err(CodegenError::new(
                        CodegenErrorKind::UnboundIdentifier,
                        c.line,
                        format!("'{}' is not a function", c.callee),
                    )),
                },
                None => Err(CodegenError::new(
                    CodegenErrorKind::UnboundIdentifier,
                    c.line,
                    format!("function '{}' is not bound", c.callee),
                )),
            },
        }
    }
}
