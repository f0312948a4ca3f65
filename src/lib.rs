pub mod ast;
pub mod backend;
pub mod symtab;

use thiserror::Error;

pub use backend::mips::{
    compile_to_mips, compile_to_mips_lines, compile_with_scope_stack, MipsAsm,
};
pub use symtab::{ScopeStack, SymbolEntry, SymbolId, SymbolSig, SymbolTable};

#[derive(Error, Debug)]
#[error("CodegenError:{kind} (line {line}) - {message}")]
pub struct CodegenError {
    pub kind: CodegenErrorKind,
    pub line: usize,
    pub message: String,
}

impl CodegenError {
    pub fn new(kind: CodegenErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenErrorKind {
    UnboundIdentifier,
    NonConstantDimension,
    ReturnOutsideFunction,
    UnsupportedOperator,
    UnsupportedOperandTypes,
    UnsupportedWriteArgument,
    InvalidCoercion,
    UnsupportedConstruct,
}

impl std::fmt::Display for CodegenErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodegenErrorKind::UnboundIdentifier => write!(f, "UnboundIdentifier"),
            CodegenErrorKind::NonConstantDimension => write!(f, "NonConstantDimension"),
            CodegenErrorKind::ReturnOutsideFunction => write!(f, "ReturnOutsideFunction"),
            CodegenErrorKind::UnsupportedOperator => write!(f, "UnsupportedOperator"),
            CodegenErrorKind::UnsupportedOperandTypes => write!(f, "UnsupportedOperandTypes"),
            CodegenErrorKind::UnsupportedWriteArgument => write!(f, "UnsupportedWriteArgument"),
            CodegenErrorKind::InvalidCoercion => write!(f, "InvalidCoercion"),
            CodegenErrorKind::UnsupportedConstruct => write!(f, "UnsupportedConstruct"),
        }
    }
}
