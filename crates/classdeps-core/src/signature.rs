//! Generic signatures
//!
//! Parses the `Signature` attribute grammar of class files into a tree:
//!
//! ```text
//! <K:Ljava/lang/Object;V::Ljava/lang/Comparable<-TV;>;>Ljava/util/AbstractMap<TK;TV;>;
//! (Ljava/util/List<+Lcom/foo/Bar;>;[TT;)Lcom/foo/Outer<TT;>.Inner;^Ljava/io/IOException;
//! Ljava/util/Map$Entry<Ljava/lang/String;*>;
//! ```
//!
//! Class, method and reference-type signatures share one entry point,
//! [`Signature::parse`].

use crate::descriptor::{Cursor, DescriptorError, MAX_SIGNATURE_DEPTH};

/// Any signature found in a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Class(ClassSignature),
    Method(MethodSignature),
    /// Field and local-variable signatures.
    Type(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub result: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(char),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// `Lpkg/Outer<args>.Inner<args>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Package-qualified internal name of the outermost class.
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
    pub inner: Vec<InnerClassType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassType {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    /// `+T`
    Extends(TypeSignature),
    /// `-T`
    Super(TypeSignature),
    Exact(TypeSignature),
}

impl TypeArgument {
    pub fn bound(&self) -> Option<&TypeSignature> {
        match self {
            TypeArgument::Any => None,
            TypeArgument::Extends(ty) | TypeArgument::Super(ty) | TypeArgument::Exact(ty) => {
                Some(ty)
            }
        }
    }
}

impl ClassTypeSignature {
    /// Internal names of the outer class and of each nested class, the latter
    /// joined to their enclosing class with `$`:
    /// `Lcom/foo/Outer<TT;>.Inner.Deep;` → `com/foo/Outer`, `com/foo/Outer$Inner`,
    /// `com/foo/Outer$Inner$Deep`.
    pub fn class_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.inner.len());
        let mut current = self.name.clone();
        names.push(current.clone());
        for inner in &self.inner {
            current = format!("{}${}", current, inner.name);
            names.push(current.clone());
        }
        names
    }

    /// Type arguments of the outer class and of every nested class.
    pub fn all_type_arguments(&self) -> impl Iterator<Item = &TypeArgument> {
        self.type_arguments
            .iter()
            .chain(self.inner.iter().flat_map(|inner| inner.type_arguments.iter()))
    }
}

impl Signature {
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        let mut parser = SignatureParser {
            cursor: Cursor::new(input),
            depth: 0,
        };
        if parser.cursor.is_at_end() {
            return Err(DescriptorError::Empty);
        }
        let signature = parser.signature()?;
        parser.cursor.finish()?;
        Ok(signature)
    }
}

struct SignatureParser<'a> {
    cursor: Cursor<'a>,
    /// Open `<` type-argument lists.
    depth: usize,
}

impl SignatureParser<'_> {
    fn signature(&mut self) -> Result<Signature, DescriptorError> {
        let type_parameters = if self.cursor.peek() == Some(b'<') {
            self.type_parameters()?
        } else {
            Vec::new()
        };

        if self.cursor.peek() == Some(b'(') {
            return self.method_signature(type_parameters).map(Signature::Method);
        }

        if type_parameters.is_empty() {
            let first = self.reference_type()?;
            if self.cursor.is_at_end() {
                return Ok(Signature::Type(first));
            }
            // More input after one type: a class signature without type parameters.
            return match first {
                TypeSignature::Class(superclass) => self
                    .class_signature_rest(Vec::new(), superclass)
                    .map(Signature::Class),
                _ => Err(DescriptorError::Trailing(self.cursor.input().to_string())),
            };
        }

        let superclass = self.class_type()?;
        self.class_signature_rest(type_parameters, superclass)
            .map(Signature::Class)
    }

    fn class_signature_rest(
        &mut self,
        type_parameters: Vec<TypeParameter>,
        superclass: ClassTypeSignature,
    ) -> Result<ClassSignature, DescriptorError> {
        let mut interfaces = Vec::new();
        while !self.cursor.is_at_end() {
            interfaces.push(self.class_type()?);
        }
        Ok(ClassSignature {
            type_parameters,
            superclass,
            interfaces,
        })
    }

    fn method_signature(
        &mut self,
        type_parameters: Vec<TypeParameter>,
    ) -> Result<MethodSignature, DescriptorError> {
        self.cursor.expect(b'(')?;
        let mut parameters = Vec::new();
        while self.cursor.peek() != Some(b')') {
            parameters.push(self.java_type()?);
        }
        self.cursor.expect(b')')?;

        let result = if self.cursor.peek() == Some(b'V') {
            self.cursor.bump();
            None
        } else {
            Some(self.java_type()?)
        };

        let mut throws = Vec::new();
        while self.cursor.peek() == Some(b'^') {
            self.cursor.bump();
            let position = self.cursor.position();
            match self.reference_type()? {
                thrown @ (TypeSignature::Class(_) | TypeSignature::TypeVariable(_)) => {
                    throws.push(thrown)
                }
                TypeSignature::Array(_) | TypeSignature::Base(_) => {
                    return Err(self.cursor.unexpected_at(position))
                }
            }
        }

        Ok(MethodSignature {
            type_parameters,
            parameters,
            result,
            throws,
        })
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>, DescriptorError> {
        self.cursor.expect(b'<')?;
        let mut parameters = Vec::new();
        loop {
            let name = self.cursor.identifier(b":")?.to_string();
            self.cursor.expect(b':')?;
            let class_bound = match self.cursor.peek() {
                Some(b':') | Some(b'>') => None,
                _ => Some(self.reference_type()?),
            };
            let mut interface_bounds = Vec::new();
            while self.cursor.peek() == Some(b':') {
                self.cursor.bump();
                interface_bounds.push(self.reference_type()?);
            }
            parameters.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
            if self.cursor.peek() == Some(b'>') {
                self.cursor.bump();
                return Ok(parameters);
            }
        }
    }

    fn java_type(&mut self) -> Result<TypeSignature, DescriptorError> {
        match self.cursor.peek() {
            Some(tag @ (b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z')) => {
                self.cursor.bump();
                Ok(TypeSignature::Base(tag as char))
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<TypeSignature, DescriptorError> {
        let position = self.cursor.position();
        match self.cursor.peek() {
            Some(b'L') => self.class_type().map(TypeSignature::Class),
            Some(b'T') => {
                self.cursor.bump();
                let name = self.cursor.identifier(b";")?.to_string();
                self.cursor.bump();
                Ok(TypeSignature::TypeVariable(name))
            }
            Some(b'[') => {
                let dimensions = self.cursor.array_dimensions()?;
                let component = self.java_type()?;
                Ok((0..dimensions).fold(component, |ty, _| TypeSignature::Array(Box::new(ty))))
            }
            Some(_) => Err(self.cursor.unexpected_at(position)),
            None => Err(DescriptorError::UnexpectedEnd(self.cursor.input().to_string())),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature, DescriptorError> {
        self.cursor.expect(b'L')?;
        let name = self.cursor.identifier(b"<.;")?.to_string();
        let type_arguments = self.type_arguments()?;

        let mut inner = Vec::new();
        while self.cursor.peek() == Some(b'.') {
            self.cursor.bump();
            let name = self.cursor.identifier(b"<.;")?.to_string();
            let type_arguments = self.type_arguments()?;
            inner.push(InnerClassType {
                name,
                type_arguments,
            });
        }
        self.cursor.expect(b';')?;

        Ok(ClassTypeSignature {
            name,
            type_arguments,
            inner,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>, DescriptorError> {
        if self.cursor.peek() != Some(b'<') {
            return Ok(Vec::new());
        }
        self.cursor.bump();
        self.depth += 1;
        if self.depth > MAX_SIGNATURE_DEPTH {
            return Err(DescriptorError::TooDeep {
                input: self.cursor.input().to_string(),
            });
        }
        let mut arguments = Vec::new();
        loop {
            let argument = match self.cursor.peek() {
                Some(b'*') => {
                    self.cursor.bump();
                    TypeArgument::Any
                }
                Some(b'+') => {
                    self.cursor.bump();
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some(b'-') => {
                    self.cursor.bump();
                    TypeArgument::Super(self.reference_type()?)
                }
                _ => TypeArgument::Exact(self.reference_type()?),
            };
            arguments.push(argument);
            if self.cursor.peek() == Some(b'>') {
                self.cursor.bump();
                self.depth -= 1;
                return Ok(arguments);
            }
        }
    }
}
