//! Pseudo-code rendering of kernels, for logs and snapshot-style tests.

use std::fmt::{self, Write};

use crate::expr::{IndexExpr, Predicate, ScalarExpr};
use crate::kernel::{BufferKind, Kernel};
use crate::stmt::Stmt;

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<String> = self
            .buffers()
            .filter(|(_, b)| b.kind == BufferKind::Input)
            .map(|(_, b)| format!("{}: {}", b.name, b.ty))
            .collect();
        let outputs: Vec<String> = self
            .outputs()
            .iter()
            .map(|id| self.buffer_name(*id).to_string())
            .collect();
        writeln!(
            f,
            "kernel {}({}) -> ({}) {{",
            self.name(),
            inputs.join(", "),
            outputs.join(", ")
        )?;
        for (_, b) in self.buffers().filter(|(_, b)| b.kind == BufferKind::Alloc) {
            writeln!(f, "  alloc {}: {}", b.name, b.ty)?;
        }
        let printer = Printer { kernel: self };
        for stmt in self.body() {
            printer.stmt(f, stmt, 1)?;
        }
        writeln!(f, "}}")
    }
}

struct Printer<'a> {
    kernel: &'a Kernel,
}

impl Printer<'_> {
    fn stmt(&self, f: &mut fmt::Formatter<'_>, stmt: &Stmt, level: usize) -> fmt::Result {
        let pad = "  ".repeat(level);
        match stmt {
            Stmt::Loop {
                var,
                lower,
                upper,
                body,
            } => {
                writeln!(
                    f,
                    "{}for {} in {}..{} {{",
                    pad,
                    self.kernel.loop_name(*var),
                    self.index(lower),
                    self.index(upper)
                )?;
                for s in body {
                    self.stmt(f, s, level + 1)?;
                }
                writeln!(f, "{}}}", pad)
            }
            Stmt::Let { local, dtype, init } => writeln!(
                f,
                "{}let {}: {} = {};",
                pad,
                self.kernel.local_name(*local),
                dtype,
                self.scalar(init)
            ),
            Stmt::Assign { local, value } => writeln!(
                f,
                "{}{} = {};",
                pad,
                self.kernel.local_name(*local),
                self.scalar(value)
            ),
            Stmt::Store {
                buffer,
                indices,
                value,
            } => writeln!(
                f,
                "{}{}[{}] = {};",
                pad,
                self.kernel.buffer_name(*buffer),
                self.indices(indices),
                self.scalar(value)
            ),
            Stmt::Check { cond, message } => writeln!(
                f,
                "{}check {}, {:?};",
                pad,
                self.predicate(cond),
                message
            ),
        }
    }

    fn predicate(&self, p: &Predicate) -> String {
        match p {
            Predicate::Gt(a, b) => format!("{} > {}", self.index(a), self.index(b)),
            Predicate::Eq(a, b) => format!("{} == {}", self.index(a), self.index(b)),
            Predicate::Or(a, b) => format!("({} || {})", self.predicate(a), self.predicate(b)),
        }
    }

    fn indices(&self, indices: &[IndexExpr]) -> String {
        indices
            .iter()
            .map(|i| self.index(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn index(&self, e: &IndexExpr) -> String {
        match e {
            IndexExpr::Const(v) => v.to_string(),
            IndexExpr::Loop(var) => self.kernel.loop_name(*var).to_string(),
            IndexExpr::Symbol(name) => name.clone(),
            IndexExpr::Select {
                cond,
                on_true,
                on_false,
            } => format!(
                "select({}, {}, {})",
                self.predicate(cond),
                self.index(on_true),
                self.index(on_false)
            ),
        }
    }

    fn scalar(&self, e: &ScalarExpr) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_scalar(&mut out, e);
        out
    }

    fn write_scalar(&self, out: &mut String, e: &ScalarExpr) -> fmt::Result {
        match e {
            ScalarExpr::Const { value, .. } => write!(out, "{}", value),
            ScalarExpr::Load { buffer, indices } => write!(
                out,
                "{}[{}]",
                self.kernel.buffer_name(*buffer),
                self.indices(indices)
            ),
            ScalarExpr::Local(local) => write!(out, "{}", self.kernel.local_name(*local)),
            ScalarExpr::Add(a, b) => {
                self.write_scalar(out, a)?;
                out.push_str(" + ");
                self.write_scalar(out, b)
            }
            ScalarExpr::Mul(a, b) => {
                self.write_operand(out, a)?;
                out.push_str(" * ");
                self.write_operand(out, b)
            }
        }
    }

    /// Operands of `*` get parentheses when they are sums.
    fn write_operand(&self, out: &mut String, e: &ScalarExpr) -> fmt::Result {
        if matches!(e, ScalarExpr::Add(..)) {
            out.push('(');
            self.write_scalar(out, e)?;
            out.push(')');
            Ok(())
        } else {
            self.write_scalar(out, e)
        }
    }
}
