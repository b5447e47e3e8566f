//! Class-file decoding
//!
//! Turns the bytes of a `.class` file into a [`ClassRecord`]: header names,
//! fields, methods, annotations, inner-class entries and the type-bearing
//! parts of every `Code` attribute. Only what can name another type is kept;
//! constant values, stack maps and line numbers are skipped by length.

mod code;
mod model;
mod parser;
mod reader;

use thiserror::Error;

pub use model::{
    internal_to_binary, Annotation, AnnotationElement, ClassRecord, Code, ElementValue,
    ExceptionHandler, FieldInfo, InnerClass, Instruction, LocalVariable, MethodInfo, Node,
    TypeConstant,
};
pub use parser::parse_class;

pub use code::opcodes;

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header {found:#010x}")]
    InvalidMagic { found: u32 },
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("unknown opcode {opcode:#04x} at bytecode offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },
    #[error("invalid annotation element tag '{tag}'")]
    InvalidElementTag { tag: char },
    #[error("annotation values nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}
