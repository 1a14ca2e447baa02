use super::{eval, Failure, Generator};
use crate::ast;

/// Generate x86-64 assembly (AT&T syntax, one instruction or label per line)
/// for the given program tree. Each call performs one independent generation
/// pass with fresh label counters, so generating the same tree twice yields
/// byte-identical output.
pub fn input(program: &ast::Node) -> super::Result<String> {
    GenerateX64::new().execute(program)
}

/// The accumulator register every `generate` call leaves its value in. This
/// is also the first-argument register of the System V calling convention,
/// so the emitted `call print_int` needs no preceding move.
const ACCUMULATOR: &str = "%rdi";

/// Scratch register the saved right operand of a binary operation is restored
/// into before the combining instruction.
const SCRATCH: &str = "%r8";

/// Well-known name of the external runtime routine that prints the value
/// currently held in the accumulator register.
const PRINT_ROUTINE: &str = "print_int";

struct GenerateX64 {
    text: String,
    if_counter: usize,
    while_counter: usize
}

impl GenerateX64 {
    fn new() -> Self {
        GenerateX64 {
            text: String::new(),
            if_counter: 0,
            while_counter: 0
        }
    }

    fn emit(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Byte offset of a variable's stack slot relative to the frame base
    /// pointer. The 26 slots are laid out in alphabetical order, 8 bytes
    /// each, in a frame the caller is assumed to have established already.
    fn slot_offset(var: char) -> u32 {
        8 * (var as u32 - 'A' as u32 + 1)
    }

    /// Mnemonic of the conditional jump whose sense is the logical negation
    /// of the given relational operator. The `if`/`while` lowering emits the
    /// fall-through path first, so the jump taken when the condition holds
    /// must test the negated sense.
    fn negated_jump(op: ast::Op) -> &'static str {
        match op {
            ast::Op::LessThan => "jnl",
            ast::Op::Equal => "jne",
            ast::Op::GreaterThan => "jng",
            _ => unreachable!("negated jump requested for arithmetic operator")
        }
    }

    /// Ensure an `if`/`while` condition node is a relational comparison,
    /// yielding its operator. Anything else is rejected before any code for
    /// the enclosing construct has been emitted.
    fn relational_condition(construct: &'static str, condition: &ast::Node) -> super::Result<ast::Op> {
        match condition {
            ast::Node::BinaryOp { op, .. } if op.is_relational() => Ok(*op),

            other => Err(Failure::MalformedCondition {
                construct,
                encountered: other.kind_name()
            })
        }
    }

    fn generate_binary_op(&mut self, op: ast::Op, left: &ast::Node, right: &ast::Node) -> super::Result<()> {
        // Strength reduction: a multiplication by a constant power of two
        // becomes a shift of the left operand. A right operand folding to 1
        // shares the exponent sentinel 0 and so falls through to the generic
        // multiply instead (see `eval::power_of_two_exponent`).
        if op == ast::Op::Multiply && eval::is_constant(right) {
            let exponent = eval::power_of_two_exponent(eval::evaluate_constant(right)?);

            if exponent != 0 {
                log::trace!("Reducing multiplication by 2^{} to a left shift", exponent);

                self.generate(left)?;
                self.emit(&format!("salq ${}, {}", exponent, ACCUMULATOR));
                return Ok(());
            }
        }

        // Generic two-register protocol: the right operand is generated first
        // and saved on the machine stack while the left operand takes its
        // turn in the accumulator.
        self.generate(right)?;
        self.emit(&format!("pushq {}", ACCUMULATOR));
        self.generate(left)?;
        self.emit(&format!("popq {}", SCRATCH));

        match op {
            ast::Op::Add => self.emit(&format!("addq {}, {}", SCRATCH, ACCUMULATOR)),
            ast::Op::Subtract => self.emit(&format!("subq {}, {}", SCRATCH, ACCUMULATOR)),
            ast::Op::Multiply => self.emit(&format!("imulq {}, {}", SCRATCH, ACCUMULATOR)),

            ast::Op::Divide => {
                // Signed division dividend lives in rdx:rax.
                self.emit(&format!("movq {}, %rax", ACCUMULATOR));
                self.emit("cqto");
                self.emit(&format!("idivq {}", SCRATCH));
                self.emit(&format!("movq %rax, {}", ACCUMULATOR));
            }

            // Relational operators only set the flags - the branch decision
            // is made by the enclosing if/while, not here.
            ast::Op::LessThan | ast::Op::Equal | ast::Op::GreaterThan =>
                self.emit(&format!("cmpq {}, {}", SCRATCH, ACCUMULATOR))
        }

        Ok(())
    }

    fn generate_if(&mut self, condition: &ast::Node, then_branch: &ast::Node, else_branch: Option<&ast::Node>) -> super::Result<()> {
        let op = Self::relational_condition("if", condition)?;

        self.if_counter += 1;
        let id = self.if_counter;

        log::trace!("Lowering if construct with label id {}", id);

        // The else path is laid out in straight-line order, so the jump to
        // the then label is taken on the negation of the source operator.
        self.generate(condition)?;
        self.emit(&format!("{} IF_{}", Self::negated_jump(op), id));

        self.emit(&format!("ELSE_{}:", id));
        if let Some(branch) = else_branch {
            self.generate(branch)?;
        }
        self.emit(&format!("jmp ENDIF_{}", id));

        self.emit(&format!("IF_{}:", id));
        self.generate(then_branch)?;
        self.emit(&format!("jmp ENDIF_{}", id));

        self.emit(&format!("ENDIF_{}:", id));

        Ok(())
    }

    fn generate_while(&mut self, condition: &ast::Node, body: &ast::Node) -> super::Result<()> {
        let op = Self::relational_condition("while", condition)?;

        self.while_counter += 1;
        let id = self.while_counter;

        log::trace!("Lowering while construct with label id {}", id);

        self.emit(&format!("WHILE_{}:", id));
        self.generate(condition)?;
        self.emit(&format!("{} WHILE_END_{}", Self::negated_jump(op), id));

        self.generate(body)?;
        self.emit(&format!("jmp WHILE_{}", id));

        self.emit(&format!("WHILE_END_{}:", id));

        Ok(())
    }
}

impl Generator for GenerateX64 {
    const TARGET_NAME: &'static str = "x86-64";

    fn generate(&mut self, node: &ast::Node) -> super::Result<()> {
        log::trace!("Generating code for {}", node.kind_name());

        match node {
            ast::Node::Number(value) => {
                self.emit(&format!("movq ${}, {}", value, ACCUMULATOR));
            }

            ast::Node::Sequence(statements) => {
                for statement in statements {
                    self.generate(statement)?;
                }
            }

            ast::Node::Print(expr) => {
                self.generate(expr)?;
                self.emit(&format!("call {}", PRINT_ROUTINE));
            }

            ast::Node::BinaryOp { op, left, right } => {
                // Fold fully-constant subtrees to a single immediate load.
                // `is_constant` applies at every nesting depth, so this also
                // catches constant operands deep inside larger expressions.
                if eval::is_constant(node) {
                    let value = eval::evaluate_constant(node)?;

                    log::trace!("Folded constant expression to immediate value {}", value);

                    self.emit(&format!("movq ${}, {}", value, ACCUMULATOR));
                }
                else {
                    self.generate_binary_op(*op, left, right)?;
                }
            }

            ast::Node::Variable(var) => {
                self.emit(&format!("movq -{}(%rbp), {}", Self::slot_offset(*var), ACCUMULATOR));
            }

            ast::Node::Let { var, value } => {
                self.generate(value)?;
                self.emit(&format!("movq {}, -{}(%rbp)", ACCUMULATOR, Self::slot_offset(*var)));
            }

            ast::Node::If { condition, then_branch, else_branch } => {
                self.generate_if(condition, then_branch, else_branch.as_deref())?;
            }

            ast::Node::While { condition, body } => {
                self.generate_while(condition, body)?;
            }
        }

        Ok(())
    }

    fn construct_output(self) -> String {
        self.text
    }
}
