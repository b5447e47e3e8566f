//! Field and method descriptors
//!
//! Descriptors are the erased type strings of the class-file format:
//! `I`, `Ljava/lang/String;`, `[[J`, `(ILjava/util/List;)V`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("empty descriptor")]
    Empty,
    #[error("unexpected character '{found}' at position {position} in `{input}`")]
    Unexpected {
        input: String,
        position: usize,
        found: char,
    },
    #[error("unexpected end of `{0}`")]
    UnexpectedEnd(String),
    #[error("trailing characters in `{0}`")]
    Trailing(String),
    #[error("array type with more than {} dimensions in `{input}`", MAX_ARRAY_DIMENSIONS)]
    TooManyDimensions { input: String },
    #[error("type arguments nested deeper than {} levels in `{input}`", MAX_SIGNATURE_DEPTH)]
    TooDeep { input: String },
}

/// Largest number of array dimensions the class-file format allows.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Nesting limit for type arguments in generic signatures.
pub const MAX_SIGNATURE_DEPTH: usize = 64;

/// Erased field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// One of `B C D F I J S Z`.
    Base(char),
    /// Internal name of a class or interface.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut cursor = Cursor::new(descriptor);
        if cursor.is_at_end() {
            return Err(DescriptorError::Empty);
        }
        let ty = cursor.field_type()?;
        cursor.finish()?;
        Ok(ty)
    }

    /// Strips every array dimension: `[[Ljava/lang/String;` → `Ljava/lang/String;`.
    pub fn element_type(&self) -> &FieldType {
        let mut ty = self;
        while let FieldType::Array(component) = ty {
            ty = component;
        }
        ty
    }

    /// Internal name of the element class, `None` for primitives and primitive arrays.
    pub fn class_name(&self) -> Option<&str> {
        match self.element_type() {
            FieldType::Object(name) => Some(name),
            _ => None,
        }
    }
}

/// Erased method type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut cursor = Cursor::new(descriptor);
        if cursor.is_at_end() {
            return Err(DescriptorError::Empty);
        }
        cursor.expect(b'(')?;
        let mut parameters = Vec::new();
        while cursor.peek() != Some(b')') {
            parameters.push(cursor.field_type()?);
        }
        cursor.expect(b')')?;
        let return_type = if cursor.peek() == Some(b'V') {
            cursor.bump();
            None
        } else {
            Some(cursor.field_type()?)
        };
        cursor.finish()?;
        Ok(Self {
            parameters,
            return_type,
        })
    }

    /// Parameter types followed by the return type.
    pub fn types(&self) -> impl Iterator<Item = &FieldType> {
        self.parameters.iter().chain(self.return_type.iter())
    }
}

/// Return descriptor as used by annotation class values: a field
/// descriptor or `V`.
pub fn parse_return_descriptor(descriptor: &str) -> Result<Option<FieldType>, DescriptorError> {
    if descriptor == "V" {
        return Ok(None);
    }
    FieldType::parse(descriptor).map(Some)
}

/// Byte cursor shared by the descriptor and signature grammars.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn input(&self) -> &'a str {
        self.input
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn next(&mut self) -> Result<u8, DescriptorError> {
        let byte = self
            .peek()
            .ok_or_else(|| DescriptorError::UnexpectedEnd(self.input.to_string()))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn expect(&mut self, expected: u8) -> Result<(), DescriptorError> {
        let position = self.pos;
        let found = self.next()?;
        if found != expected {
            return Err(self.unexpected_at(position));
        }
        Ok(())
    }

    pub(crate) fn unexpected_at(&self, position: usize) -> DescriptorError {
        let found = self
            .input
            .get(position..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        DescriptorError::Unexpected {
            input: self.input.to_string(),
            position,
            found,
        }
    }

    pub(crate) fn finish(&self) -> Result<(), DescriptorError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(DescriptorError::Trailing(self.input.to_string()))
        }
    }

    /// Consumes bytes up to (not including) the first of `stops`; the
    /// identifier must be non-empty.
    pub(crate) fn identifier(&mut self, stops: &[u8]) -> Result<&'a str, DescriptorError> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if stops.contains(&byte) {
                break;
            }
            self.pos += 1;
        }
        if self.is_at_end() {
            return Err(DescriptorError::UnexpectedEnd(self.input.to_string()));
        }
        if self.pos == start {
            return Err(self.unexpected_at(start));
        }
        // Stops are ASCII, so both ends fall on char boundaries.
        Ok(&self.input[start..self.pos])
    }

    /// Counts leading `[` without recursing.
    pub(crate) fn array_dimensions(&mut self) -> Result<usize, DescriptorError> {
        let mut dimensions = 0;
        while self.peek() == Some(b'[') {
            self.bump();
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(DescriptorError::TooManyDimensions {
                    input: self.input.to_string(),
                });
            }
        }
        Ok(dimensions)
    }

    pub(crate) fn field_type(&mut self) -> Result<FieldType, DescriptorError> {
        let dimensions = self.array_dimensions()?;
        let position = self.pos;
        let element = match self.next()? {
            tag @ (b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                FieldType::Base(tag as char)
            }
            b'L' => {
                let name = self.identifier(b";")?;
                self.bump();
                FieldType::Object(name.to_string())
            }
            _ => return Err(self.unexpected_at(position)),
        };
        Ok((0..dimensions).fold(element, |ty, _| FieldType::Array(Box::new(ty))))
    }
}
