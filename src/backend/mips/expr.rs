use super::abi::{FReg, Reg};
use super::Codegen;
use crate::ast::{BinaryOp, DataType, Expr, IdentRef, UnaryOp};
use crate::symtab::SymbolSig;
use crate::{CodegenError, CodegenErrorKind};

impl Codegen<'_> {
    /// Lower an expression. Exactly one 4-byte operand-stack push remains
    /// when this returns; consumers pop it.
    pub(super) fn lower_expr(&mut self, e: &Expr) -> Result<(), CodegenError> {
        match e {
            Expr::IntConst { value, .. } => {
                self.em.ins("li", format!("{}, {}", Reg::T0, value));
                self.em.push(Reg::T0);
                Ok(())
            }
            Expr::FloatConst { value, .. } => {
                self.em.ins("li.s", format!("{}, {:?}", FReg::F0, value));
                self.em.push_f(FReg::F0);
                Ok(())
            }
            Expr::StringConst { line, .. } => Err(CodegenError::new(
                CodegenErrorKind::UnsupportedOperandTypes,
                *line,
                "string constant used as a value",
            )),
            Expr::Ident(r) => {
                let (ty, cell) = self.resolve_scalar(r)?;
                match ty {
                    DataType::Int => {
                        self.em.ins("lw", format!("{}, {}", Reg::T0, cell));
                        self.em.push(Reg::T0);
                        Ok(())
                    }
                    DataType::Float => {
                        self.em.ins("lwc1", format!("{}, {}", FReg::F0, cell));
                        self.em.push_f(FReg::F0);
                        Ok(())
                    }
                    _ => Err(CodegenError::new(
                        CodegenErrorKind::UnsupportedOperandTypes,
                        r.line,
                        format!("'{}' has no loadable type", r.name),
                    )),
                }
            }
            Expr::Unary {
                op, operand, line, ..
            } => self.lower_unary(*op, operand, *line),
            Expr::Binary {
                op, lhs, rhs, line, ..
            } => self.lower_binary(*op, lhs, rhs, *line),
            Expr::Call(c) => {
                let pushed = self.lower_call(c)?;
                if pushed {
                    Ok(())
                } else {
                    Err(CodegenError::new(
                        CodegenErrorKind::UnsupportedOperandTypes,
                        c.line,
                        format!("void call to '{}' used as a value", c.callee),
                    ))
                }
            }
        }
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        line: usize,
    ) -> Result<(), CodegenError> {
        match op {
            // Unary plus contributes no instruction; the operand's push is
            // the result.
            UnaryOp::Pos => self.lower_expr(operand),
            UnaryOp::Neg => {
                let ty = self.expr_ty(operand)?;
                if !is_leaf(operand) {
                    self.lower_expr(operand)?;
                }
                match ty {
                    DataType::Int => {
                        self.fetch_int_into(operand, Reg::T0)?;
                        self.em.ins("neg", format!("{}, {}", Reg::T0, Reg::T0));
                        self.em.push(Reg::T0);
                        Ok(())
                    }
                    DataType::Float => {
                        self.fetch_float_into(operand, ty, Reg::T0, FReg::F0)?;
                        self.em.ins("neg.s", format!("{}, {}", FReg::F0, FReg::F0));
                        self.em.push_f(FReg::F0);
                        Ok(())
                    }
                    _ => Err(CodegenError::new(
                        CodegenErrorKind::UnsupportedOperandTypes,
                        line,
                        "negation of a non-numeric value",
                    )),
                }
            }
            UnaryOp::Not => {
                let ty = self.expr_ty(operand)?;
                match ty {
                    DataType::Int => {
                        if !is_leaf(operand) {
                            self.lower_expr(operand)?;
                        }
                        self.fetch_int_into(operand, Reg::T0)?;
                        self.em
                            .ins("nor", format!("{}, {}, {}", Reg::T0, Reg::T0, Reg::Zero));
                        self.em.push(Reg::T0);
                        Ok(())
                    }
                    DataType::Float => Err(CodegenError::new(
                        CodegenErrorKind::UnsupportedConstruct,
                        line,
                        "logical negation of a float value",
                    )),
                    _ => Err(CodegenError::new(
                        CodegenErrorKind::UnsupportedOperandTypes,
                        line,
                        "logical negation of a non-numeric value",
                    )),
                }
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        line: usize,
    ) -> Result<(), CodegenError> {
        let lty = self.expr_ty(lhs)?;
        let rty = self.expr_ty(rhs)?;
        if !numeric(lty) || !numeric(rty) {
            return Err(CodegenError::new(
                CodegenErrorKind::UnsupportedOperandTypes,
                line,
                format!("operator cannot combine {:?} and {:?} operands", lty, rty),
            ));
        }

        // Complex operands lower themselves first, lhs before rhs, so the
        // rhs value sits on top and is popped first.
        if !is_leaf(lhs) {
            self.lower_expr(lhs)?;
        }
        if !is_leaf(rhs) {
            self.lower_expr(rhs)?;
        }

        if lty == DataType::Float || rty == DataType::Float {
            self.fetch_float_into(rhs, rty, Reg::T1, FReg::F1)?;
            self.fetch_float_into(lhs, lty, Reg::T0, FReg::F0)?;
            self.emit_float_op(op, line)
        } else {
            self.fetch_int_into(rhs, Reg::T1)?;
            self.fetch_int_into(lhs, Reg::T0)?;
            self.emit_int_op(op);
            Ok(())
        }
    }

    /// Fetch an int operand into `dst`: constants and scalar identifiers
    /// load directly, anything else was already lowered and is popped.
    fn fetch_int_into(&mut self, e: &Expr, dst: Reg) -> Result<(), CodegenError> {
        match e {
            Expr::IntConst { value, .. } => {
                self.em.ins("li", format!("{}, {}", dst, value));
            }
            Expr::Ident(r) => {
                let (_, cell) = self.resolve_scalar(r)?;
                self.em.ins("lw", format!("{}, {}", dst, cell));
            }
            _ => self.em.pop(dst),
        }
        Ok(())
    }

    /// Float-path operand fetch into `dst`. An int operand goes through
    /// `tmp` and is promoted right after the fetch.
    fn fetch_float_into(
        &mut self,
        e: &Expr,
        ty: DataType,
        tmp: Reg,
        dst: FReg,
    ) -> Result<(), CodegenError> {
        match e {
            Expr::FloatConst { value, .. } => {
                self.em.ins("li.s", format!("{}, {:?}", dst, value));
            }
            Expr::IntConst { value, .. } => {
                self.em.ins("li", format!("{}, {}", tmp, value));
                self.promote_to_float(tmp, dst);
            }
            Expr::Ident(r) => {
                let (_, cell) = self.resolve_scalar(r)?;
                if ty == DataType::Float {
                    self.em.ins("lwc1", format!("{}, {}", dst, cell));
                } else {
                    self.em.ins("lw", format!("{}, {}", tmp, cell));
                    self.promote_to_float(tmp, dst);
                }
            }
            _ => {
                if ty == DataType::Float {
                    self.em.pop_f(dst);
                } else {
                    self.em.pop(tmp);
                    self.promote_to_float(tmp, dst);
                }
            }
        }
        Ok(())
    }

    /// Word-to-single conversion in place.
    pub(super) fn promote_to_float(&mut self, src: Reg, dst: FReg) {
        self.em.ins("mtc1", format!("{}, {}", src, dst));
        // the convert must not read the coprocessor register in the move's
        // delay slot
        self.em.ins("nop", "");
        self.em.ins("cvt.s.w", format!("{}, {}", dst, dst));
    }

    /// Integer operation on `$t0` (lhs) and `$t1` (rhs); result pushed
    /// from `$t0`.
    fn emit_int_op(&mut self, op: BinaryOp) {
        let (t0, t1) = (Reg::T0, Reg::T1);
        match op {
            BinaryOp::Add => self.em.ins("add", format!("{}, {}, {}", t0, t0, t1)),
            BinaryOp::Sub => self.em.ins("sub", format!("{}, {}, {}", t0, t0, t1)),
            BinaryOp::Mul => {
                self.em.ins("mult", format!("{}, {}", t0, t1));
                self.em.ins("mflo", t0.as_str());
            }
            BinaryOp::Div => {
                self.em.ins("div", format!("{}, {}", t0, t1));
                self.em.ins("mflo", t0.as_str());
            }
            BinaryOp::And => self.em.ins("and", format!("{}, {}, {}", t0, t0, t1)),
            BinaryOp::Or => self.em.ins("or", format!("{}, {}, {}", t0, t0, t1)),
            BinaryOp::Lt => self.em.ins("slt", format!("{}, {}, {}", t0, t0, t1)),
            BinaryOp::Gt => self.em.ins("slt", format!("{}, {}, {}", t0, t1, t0)),
            BinaryOp::Ge => {
                self.em.ins("slt", format!("{}, {}, {}", t0, t0, t1));
                self.em.ins("xori", format!("{}, {}, 1", t0, t0));
            }
            BinaryOp::Le => {
                self.em.ins("slt", format!("{}, {}, {}", t0, t1, t0));
                self.em.ins("xori", format!("{}, {}, 1", t0, t0));
            }
            BinaryOp::Eq => self.int_cmp("beq"),
            BinaryOp::Ne => self.int_cmp("bne"),
        }
        self.em.push(Reg::T0);
    }

    /// Float operation on `$f0` (lhs) and `$f1` (rhs). Arithmetic pushes
    /// `$f0`; relationals synthesize 1/0 into `$t0` and push that.
    fn emit_float_op(&mut self, op: BinaryOp, line: usize) -> Result<(), CodegenError> {
        let (f0, f1) = (FReg::F0, FReg::F1);
        match op {
            BinaryOp::Add => {
                self.em.ins("add.s", format!("{}, {}, {}", f0, f0, f1));
                self.em.push_f(f0);
            }
            BinaryOp::Sub => {
                self.em.ins("sub.s", format!("{}, {}, {}", f0, f0, f1));
                self.em.push_f(f0);
            }
            BinaryOp::Mul => {
                self.em.ins("mul.s", format!("{}, {}, {}", f0, f0, f1));
                self.em.push_f(f0);
            }
            BinaryOp::Div => {
                self.em.ins("div.s", format!("{}, {}, {}", f0, f0, f1));
                self.em.push_f(f0);
            }
            BinaryOp::Lt => self.float_cmp("c.lt.s", "bc1t"),
            BinaryOp::Le => self.float_cmp("c.le.s", "bc1t"),
            BinaryOp::Gt => self.float_cmp("c.le.s", "bc1f"),
            BinaryOp::Ge => self.float_cmp("c.lt.s", "bc1f"),
            BinaryOp::Eq => self.float_cmp("c.eq.s", "bc1t"),
            BinaryOp::Ne => self.float_cmp("c.eq.s", "bc1f"),
            BinaryOp::And | BinaryOp::Or => {
                return Err(CodegenError::new(
                    CodegenErrorKind::UnsupportedOperator,
                    line,
                    "logical operator on a float operand",
                ))
            }
        }
        Ok(())
    }

    /// `beq`/`bne` over a fresh label pair, leaving 1 or 0 in `$t0`.
    fn int_cmp(&mut self, branch: &str) {
        let n = self.em.fresh_id();
        let true_l = format!("_cmp{}_true", n);
        let end_l = format!("_cmp{}_end", n);
        self.em
            .ins(branch, format!("{}, {}, {}", Reg::T0, Reg::T1, true_l));
        self.cmp_tail(&true_l, &end_l);
    }

    /// Coprocessor compare plus `bc1t`/`bc1f`, leaving 1 or 0 in `$t0`.
    fn float_cmp(&mut self, compare: &str, branch: &str) {
        self.em
            .ins(compare, format!("{}, {}", FReg::F0, FReg::F1));
        let n = self.em.fresh_id();
        let true_l = format!("_cmp{}_true", n);
        let end_l = format!("_cmp{}_end", n);
        self.em.ins(branch, &true_l);
        self.cmp_tail(&true_l, &end_l);
    }

    fn cmp_tail(&mut self, true_l: &str, end_l: &str) {
        self.em.ins("li", format!("{}, 0", Reg::T0));
        self.em.ins("j", end_l);
        self.em.label(true_l);
        self.em.ins("li", format!("{}, 1", Reg::T0));
        self.em.label(end_l);
        self.em.push(Reg::T0);
    }

    /// Resolved type of an expression. Operator nodes carry theirs;
    /// identifiers and calls resolve through the scope stack.
    pub(super) fn expr_ty(&self, e: &Expr) -> Result<DataType, CodegenError> {
        match e {
            Expr::IntConst { .. } => Ok(DataType::Int),
            Expr::FloatConst { .. } => Ok(DataType::Float),
            Expr::StringConst { .. } => Ok(DataType::ConstString),
            Expr::Ident(r) => self.resolve_scalar(r).map(|(ty, _)| ty),
            Expr::Unary { ty, .. } => Ok(*ty),
            Expr::Binary { ty, .. } => Ok(*ty),
            Expr::Call(c) => self.callee_return_ty(c),
        }
    }

    /// Resolve a scalar identifier to its declared type and memory cell:
    /// `_name` at level 0, `offset($fp)` inside a frame.
    pub(super) fn resolve_scalar(&self, r: &IdentRef) -> Result<(DataType, String), CodegenError> {
        let entry = self.scopes.lookup(&r.name).ok_or_else(|| {
            CodegenError::new(
                CodegenErrorKind::UnboundIdentifier,
                r.line,
                format!("identifier '{}' is not bound", r.name),
            )
        })?;
        match &entry.sig {
            SymbolSig::Scalar(ty) => {
                let cell = if entry.level == 0 {
                    format!("_{}", entry.name)
                } else {
                    format!("{}({})", entry.offset, Reg::Fp)
                };
                Ok((*ty, cell))
            }
            SymbolSig::Array { .. } => Err(CodegenError::new(
                CodegenErrorKind::UnsupportedOperandTypes,
                r.line,
                format!("array '{}' used as a scalar", r.name),
            )),
            SymbolSig::Function { .. } => Err(CodegenError::new(
                CodegenErrorKind::UnsupportedOperandTypes,
                r.line,
                format!("function '{}' used as a value", r.name),
            )),
        }
    }
}

fn is_leaf(e: &Expr) -> bool {
    matches!(
        e,
        Expr::IntConst { .. } | Expr::FloatConst { .. } | Expr::Ident(_)
    )
}

fn numeric(ty: DataType) -> bool {
    matches!(ty, DataType::Int | DataType::Float)
}
