//! Contains code for generating assembly code from a sprig abstract syntax
//! tree. Generation is a single recursive pass over the tree - no intermediate
//! representation is built. For the x86-64 generator itself, see submodule
//! `genx64`; for compile-time evaluation of constant subtrees, see submodule
//! `eval`.

pub mod genx64;

mod eval;

use std::fmt;

/// Represents the ways in which code generation can fail. Generation is a
/// deterministic pure function of the input tree, so none of these are ever
/// retried - the only remedy is correcting the input program.
#[derive(Debug, PartialEq)]
pub enum Failure {
    /// A constant expression was found to divide by zero while being folded.
    /// Reported at compile time rather than emitting a faulting instruction.
    ConstantDivisionByZero,
    /// The condition of an `if` or `while` construct was not a relational
    /// comparison. Detected before any code for the construct is emitted.
    MalformedCondition { construct: &'static str, encountered: &'static str }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Failure::ConstantDivisionByZero =>
                write!(f, "Constant expression divides by zero"),
            Failure::MalformedCondition { construct, encountered } =>
                write!(f, "Condition of {} construct must be a relational comparison yet encountered {}", construct, encountered)
        }
    }
}

pub type Result<T> = std::result::Result<T, Failure>;

/// Generate assembly code from an abstract syntax tree trait.
///
/// Every implementation follows the accumulator convention: each `generate`
/// call emits the instructions for one node's effect and leaves that node's
/// resulting scalar value, if it has one, in a single designated accumulator
/// register for the enclosing node to consume. This is a convention rather
/// than anything enforced by the types, so implementations must uphold it at
/// every recursive step.
trait Generator {
    const TARGET_NAME: &'static str;

    /// Convert the given program tree into assembly code. Consumes the
    /// generator, so each instance performs exactly one generation pass and
    /// separate passes can never interfere with one another.
    fn execute(mut self, program: &crate::ast::Node) -> Result<String> where Self: Sized {
        log::info!("Generating {} assembly", Self::TARGET_NAME);

        self.generate(program)?;

        Ok(self.construct_output())
    }

    fn generate(&mut self, node: &crate::ast::Node) -> Result<()>;

    fn construct_output(self) -> String;
}
