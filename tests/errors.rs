use cmm_codegen::ast::*;
use cmm_codegen::{compile_to_mips, CodegenError, CodegenErrorKind};

// ── AST builders ─────────────────────────────────────────────────────────

fn int(v: i32) -> Expr {
    Expr::IntConst { value: v, line: 1 }
}

fn flt(v: f32) -> Expr {
    Expr::FloatConst { value: v, line: 1 }
}

fn var(name: &str) -> Expr {
    Expr::Ident(IdentRef {
        name: name.to_string(),
        line: 1,
    })
}

fn var_at(name: &str, line: usize) -> Expr {
    Expr::Ident(IdentRef {
        name: name.to_string(),
        line,
    })
}

fn bin(op: BinaryOp, ty: DataType, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        ty,
        line: 1,
    }
}

fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: IdentRef {
            name: name.to_string(),
            line: 1,
        },
        value,
        line: 1,
    }
}

fn call(callee: &str, args: Vec<Expr>) -> CallExpr {
    CallExpr {
        callee: callee.to_string(),
        args,
        line: 1,
    }
}

fn block(decls: Vec<VarDecl>, stmts: Vec<Stmt>) -> Block {
    Block {
        decls,
        stmts,
        line: 1,
    }
}

fn scalar(name: &str, ty: DataType) -> VarDecl {
    VarDecl {
        ids: vec![IdDecl {
            name: name.to_string(),
            ty,
            kind: IdDeclKind::Scalar,
            line: 1,
        }],
        line: 1,
    }
}

fn array(name: &str, ty: DataType, dims: Vec<Dimension>, line: usize) -> VarDecl {
    VarDecl {
        ids: vec![IdDecl {
            name: name.to_string(),
            ty,
            kind: IdDeclKind::Array { dims },
            line,
        }],
        line,
    }
}

fn func(name: &str, return_ty: DataType, params: Vec<Param>, body: Block) -> Decl {
    Decl::Func(FuncDecl {
        name: name.to_string(),
        return_ty,
        params,
        body,
        line: 1,
    })
}

fn main_fn(body: Block) -> Decl {
    func("main", DataType::Void, vec![], body)
}

fn program(decls: Vec<Decl>) -> Program {
    Program { decls }
}

// ── Fatal lowering errors ────────────────────────────────────────────────
// Each test verifies that an invalid program produces the correct error
// kind. Lowering stops at the first fault.

#[test]
fn unbound_identifier_in_expression() {
    let p = program(vec![
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(vec![], vec![assign("x", var("nowhere"))])),
    ]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::UnboundIdentifier);
}

#[test]
fn unbound_assignment_target() {
    let p = program(vec![main_fn(block(vec![], vec![assign("ghost", int(1))]))]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::UnboundIdentifier);
}

#[test]
fn unbound_callee() {
    let p = program(vec![main_fn(block(
        vec![],
        vec![Stmt::Call(call("missing", vec![]))],
    ))]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::UnboundIdentifier);
}

#[test]
fn non_constant_global_dimension() {
    let p = program(vec![Decl::Var(array(
        "a",
        DataType::Int,
        vec![Dimension::Expr(Box::new(var("n")))],
        1,
    ))]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::NonConstantDimension);
}

#[test]
fn non_constant_local_dimension() {
    let p = program(vec![main_fn(block(
        vec![array(
            "a",
            DataType::Int,
            vec![Dimension::Const(2), Dimension::Expr(Box::new(int(3)))],
            1,
        )],
        vec![],
    ))]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::NonConstantDimension);
}

#[test]
fn logical_operator_on_floats() {
    let p = program(vec![
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(
            vec![],
            vec![assign("x", bin(BinaryOp::And, DataType::Int, flt(1.0), flt(2.0)))],
        )),
    ]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::UnsupportedOperator);
}

#[test]
fn string_operand_in_arithmetic() {
    let s = Expr::StringConst {
        value: "oops".to_string(),
        line: 1,
    };
    let p = program(vec![
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(
            vec![],
            vec![assign("x", bin(BinaryOp::Add, DataType::Int, int(1), s))],
        )),
    ]);
    assert_codegen_error(
        compile_to_mips(&p),
        CodegenErrorKind::UnsupportedOperandTypes,
    );
}

#[test]
fn array_used_as_scalar() {
    let p = program(vec![
        Decl::Var(array("a", DataType::Int, vec![Dimension::Const(4)], 1)),
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(vec![], vec![assign("x", var("a"))])),
    ]);
    assert_codegen_error(
        compile_to_mips(&p),
        CodegenErrorKind::UnsupportedOperandTypes,
    );
}

#[test]
fn write_with_no_argument() {
    let p = program(vec![main_fn(block(
        vec![],
        vec![Stmt::Call(call("write", vec![]))],
    ))]);
    assert_codegen_error(
        compile_to_mips(&p),
        CodegenErrorKind::UnsupportedWriteArgument,
    );
}

#[test]
fn write_of_a_void_call() {
    let p = program(vec![
        func("noise", DataType::Void, vec![], block(vec![], vec![])),
        main_fn(block(
            vec![],
            vec![Stmt::Call(call(
                "write",
                vec![Expr::Call(call("noise", vec![]))],
            ))],
        )),
    ]);
    assert_codegen_error(
        compile_to_mips(&p),
        CodegenErrorKind::UnsupportedWriteArgument,
    );
}

#[test]
fn float_narrowed_into_int_variable() {
    let p = program(vec![
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(vec![], vec![assign("x", flt(2.5))])),
    ]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::InvalidCoercion);
}

#[test]
fn float_returned_from_int_function() {
    let p = program(vec![func(
        "f",
        DataType::Int,
        vec![],
        block(
            vec![],
            vec![Stmt::Return {
                value: Some(flt(1.0)),
                line: 1,
            }],
        ),
    )]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::InvalidCoercion);
}

#[test]
fn float_initializer_on_int_local() {
    let p = program(vec![main_fn(block(
        vec![VarDecl {
            ids: vec![IdDecl {
                name: "x".to_string(),
                ty: DataType::Int,
                kind: IdDeclKind::ScalarInit {
                    init: InitValue::FloatConst(1.5),
                },
                line: 1,
            }],
            line: 1,
        }],
        vec![],
    ))]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::InvalidCoercion);
}

#[test]
fn for_statement_is_rejected() {
    let p = program(vec![main_fn(block(vec![], vec![Stmt::For { line: 1 }]))]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::UnsupportedConstruct);
}

#[test]
fn logical_not_of_a_float() {
    let p = program(vec![
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(
            vec![],
            vec![assign(
                "x",
                Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(flt(0.0)),
                    ty: DataType::Int,
                    line: 1,
                },
            )],
        )),
    ]);
    assert_codegen_error(compile_to_mips(&p), CodegenErrorKind::UnsupportedConstruct);
}

// ── Error location accuracy ──────────────────────────────────────────────

#[test]
fn error_carries_the_faulting_line() {
    let p = program(vec![
        Decl::Var(scalar("x", DataType::Int)),
        main_fn(block(vec![], vec![assign("x", var_at("nowhere", 7))])),
    ]);
    let err = compile_to_mips(&p).unwrap_err();
    assert_eq!(err.line, 7, "error should point at line 7, got {}", err.line);
}

#[test]
fn dimension_error_points_at_the_declaration() {
    let p = program(vec![Decl::Var(array(
        "a",
        DataType::Int,
        vec![Dimension::Expr(Box::new(int(3)))],
        12,
    ))]);
    let err = compile_to_mips(&p).unwrap_err();
    assert_eq!(err.kind, CodegenErrorKind::NonConstantDimension);
    assert_eq!(err.line, 12);
}

#[test]
fn display_format_names_kind_and_line() {
    let p = program(vec![main_fn(block(
        vec![],
        vec![assign("ghost", int(1))],
    ))]);
    let err = compile_to_mips(&p).unwrap_err();
    let text = err.to_string();
    assert!(
        text.starts_with("CodegenError:UnboundIdentifier (line 1)"),
        "unexpected rendering: {}",
        text
    );
}

// ── Helper ───────────────────────────────────────────────────────────────

fn assert_codegen_error(result: Result<String, CodegenError>, expected: CodegenErrorKind) {
    match result {
        Ok(_) => panic!("expected {:?} error, but lowering succeeded", expected),
        Err(e) => assert_eq!(
            e.kind, expected,
            "expected {:?}, got: {}",
            expected, e
        ),
    }
}
