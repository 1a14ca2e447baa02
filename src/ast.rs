//! Contains structures and enumerations that allow for the representation of
//! a sprig abstract syntax tree. Trees of this form are produced by an
//! external parser and are assumed validated - the code generator performs no
//! syntax or type checking of its own and never mutates a tree it is given.

use std::fmt;

/// Binary operator symbols recognised by the language. The arithmetic
/// operators may appear anywhere in an expression, while the relational
/// operators may only appear as the condition of an `If` or `While` node (the
/// code generator defines no boolean value representation).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add, // +
    Subtract, // -
    Multiply, // *
    Divide, // /
    LessThan, // <
    Equal, // =
    GreaterThan // >
}

impl Op {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Op::Add | Op::Subtract | Op::Multiply | Op::Divide)
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, Op::LessThan | Op::Equal | Op::GreaterThan)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Op::Add => '+',
            Op::Subtract => '-',
            Op::Multiply => '*',
            Op::Divide => '/',
            Op::LessThan => '<',
            Op::Equal => '=',
            Op::GreaterThan => '>'
        };
        write!(f, "{}", symbol)
    }
}

/// Represents a single node of a parsed sprig program. Statement execution
/// order within a `Sequence` is list order. Variables are restricted to the
/// single uppercase letters 'A' to 'Z', each naming one of 26 fixed storage
/// slots in the program's stack frame.
#[derive(Debug, PartialEq)]
pub enum Node {
    Number(u64),
    Sequence(Vec<Node>),
    Print(Box<Node>),

    BinaryOp {
        op: Op,
        left: Box<Node>,
        right: Box<Node>
    },

    Variable(char),

    Let {
        var: char,
        value: Box<Node>
    },

    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>
    },

    While {
        condition: Box<Node>,
        body: Box<Node>
    }
}

impl Node {
    /// Human-readable name of this node's kind, used when constructing error
    /// messages that are surfaced to the end user.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Number(_) => "number literal",
            Node::Sequence(_) => "statement sequence",
            Node::Print(_) => "print statement",
            Node::BinaryOp { .. } => "binary operation",
            Node::Variable(_) => "variable reference",
            Node::Let { .. } => "let binding",
            Node::If { .. } => "if statement",
            Node::While { .. } => "while loop"
        }
    }
}
