//! Code generation backend for the sprig toy language.
//!
//! This crate takes an already-parsed, fully-resolved abstract syntax tree of
//! a sprig program (see module `ast`) and lowers it in a single recursive pass
//! to textual x86-64 assembly (see module `codegen`). Lexing and parsing are
//! the responsibility of the front end; assembling and linking the emitted
//! text are the responsibility of the surrounding toolchain.

pub mod ast;
pub mod codegen;
