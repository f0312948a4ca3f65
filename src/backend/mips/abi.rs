use std::fmt;

/// Integer registers the generated code touches. `$t0`/`$t1` are the only
/// scratch registers; expression values live on the operand stack between
/// instructions, never in a register allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    T0,
    T1,
    V0,
    A0,
    Sp,
    Fp,
    Ra,
    Zero,
}

impl Reg {
    pub const SCRATCH: [Reg; 2] = [Reg::T0, Reg::T1];
    pub const RET: Reg = Reg::V0;
    pub const WRITE_ARG: Reg = Reg::A0;

    pub fn as_str(&self) -> &'static str {
        match self {
            Reg::T0 => "$t0",
            Reg::T1 => "$t1",
            Reg::V0 => "$v0",
            Reg::A0 => "$a0",
            Reg::Sp => "$sp",
            Reg::Fp => "$fp",
            Reg::Ra => "$ra",
            Reg::Zero => "$0",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-precision coprocessor registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FReg {
    F0,
    F1,
    F12,
}

impl FReg {
    pub const SCRATCH: [FReg; 2] = [FReg::F0, FReg::F1];
    pub const RET: FReg = FReg::F0;
    pub const WRITE_ARG: FReg = FReg::F12;

    pub fn as_str(&self) -> &'static str {
        match self {
            FReg::F0 => "$f0",
            FReg::F1 => "$f1",
            FReg::F12 => "$f12",
        }
    }
}

impl fmt::Display for FReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// SPIM service codes, loaded into $v0 before `syscall`.
pub const SYS_PRINT_INT: i32 = 1;
pub const SYS_PRINT_FLOAT: i32 = 2;
pub const SYS_PRINT_STRING: i32 = 4;
pub const SYS_READ_INT: i32 = 5;
pub const SYS_READ_FLOAT: i32 = 6;
pub const SYS_EXIT: i32 = 10;
