use super::abi::{FReg, Reg};

/// Line buffer for the assembly artifact, plus the shared label counter.
///
/// Every generated label embeds an id from one monotone counter, so two
/// lexically identical constructs can never collide. Instruction lines put
/// the mnemonic in a fixed-width field so operands line up in one column.
pub struct Emitter {
    out: Vec<String>,
    label_count: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            label_count: 0,
        }
    }

    /// Emit one instruction. The mnemonic field is 8 columns wide.
    pub fn ins<S: AsRef<str>>(&mut self, mnemonic: &str, operands: S) {
        let operands = operands.as_ref();
        if operands.is_empty() {
            self.out.push(mnemonic.to_string());
        } else {
            self.out.push(format!("{:<8}{}", mnemonic, operands));
        }
    }

    /// Emit a line verbatim (directives, data definitions).
    pub fn raw<S: Into<String>>(&mut self, s: S) {
        self.out.push(s.into());
    }

    pub fn label(&mut self, name: &str) {
        self.out.push(format!("{}:", name));
    }

    /// Source-line trail carried into the artifact.
    pub fn comment_at(&mut self, line: usize, what: &str) {
        self.out.push(format!("# [At: {}]: {}", line, what));
    }

    pub fn fresh_id(&mut self) -> usize {
        let id = self.label_count;
        self.label_count += 1;
        id
    }

    /// Push a word from an integer register onto the operand stack.
    pub fn push(&mut self, reg: Reg) {
        self.ins("sub", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
        self.ins("sw", format!("{}, ({})", reg, Reg::Sp));
    }

    /// Pop the top operand-stack word into an integer register.
    pub fn pop(&mut self, reg: Reg) {
        self.ins("lw", format!("{}, ({})", reg, Reg::Sp));
        self.ins("addiu", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
    }

    pub fn push_f(&mut self, reg: FReg) {
        self.ins("sub", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
        self.ins("swc1", format!("{}, ({})", reg, Reg::Sp));
    }

    pub fn pop_f(&mut self, reg: FReg) {
        self.ins("lwc1", format!("{}, ({})", reg, Reg::Sp));
        self.ins("addiu", format!("{}, {}, 4", Reg::Sp, Reg::Sp));
    }

    pub fn finish(self) -> Vec<String> {
        self.out
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
