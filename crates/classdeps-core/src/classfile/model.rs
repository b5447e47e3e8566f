//! Structured class records and the node view the reference walker consumes

/// A decoded class file.
///
/// Header names (`name`, `super_name`, `interfaces`) are binary names
/// (`a.b.C$D`). Everything below the header keeps the spelling of the class
/// file itself: internal names (`a/b/C$D`), raw descriptors and raw generic
/// signatures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassRecord {
    pub name: String,
    /// `None` only for `java.lang.Object` (and `module-info`).
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub access_flags: u16,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClass>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names from the `Exceptions` attribute.
    pub exceptions: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub parameter_annotations: Vec<Vec<Annotation>>,
    pub annotation_default: Option<ElementValue>,
    pub code: Option<Code>,
}

/// The parts of a `Code` attribute that can name a type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code {
    pub instructions: Vec<Instruction>,
    pub handlers: Vec<ExceptionHandler>,
    pub local_variables: Vec<LocalVariable>,
}

/// A bytecode instruction carrying a type-bearing constant operand.
/// Instructions without one are dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `new`, `anewarray`, `checkcast`, `instanceof`. The operand is an
    /// internal name or, for array classes, an array descriptor.
    Type { opcode: u8, class: String },
    /// `getstatic`, `putstatic`, `getfield`, `putfield`.
    Field {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    /// `invokevirtual`, `invokespecial`, `invokestatic`, `invokeinterface`.
    Method {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    InvokeDynamic { name: String, descriptor: String },
    MultiANewArray { descriptor: String, dimensions: u8 },
    /// `ldc` / `ldc_w` of a class or method-type constant.
    LoadConstant(TypeConstant),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeConstant {
    /// Internal name or array descriptor.
    Class(String),
    MethodType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `None` for catch-all handlers (`finally`).
    pub catch_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface, e.g. `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    pub elements: Vec<AnnotationElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationElement {
    pub name: String,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// Primitive constant, identified by its tag (`B`, `C`, `D`, `F`, `I`, `J`, `S`, `Z`).
    Primitive(char),
    String(String),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// Return descriptor of a class literal, e.g. `Ljava/lang/String;` or `V`.
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

/// One structural element of a class, as seen by the reference walker.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// Super class, interfaces, class signature and class annotations.
    Header(&'a ClassRecord),
    InnerClass(&'a InnerClass),
    Field(&'a FieldInfo),
    /// Descriptor, signature, exceptions and every annotation of a method.
    /// The method's code follows as separate nodes.
    Method(&'a MethodInfo),
    Instruction(&'a Instruction),
    Handler(&'a ExceptionHandler),
    LocalVariable(&'a LocalVariable),
}

impl ClassRecord {
    /// Walks every structural element in class-file order. Walking is
    /// repeatable and never touches the record.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        std::iter::once(Node::Header(self))
            .chain(self.inner_classes.iter().map(Node::InnerClass))
            .chain(self.fields.iter().map(Node::Field))
            .chain(self.methods.iter().flat_map(MethodInfo::nodes))
    }
}

impl MethodInfo {
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        std::iter::once(Node::Method(self)).chain(self.code.iter().flat_map(Code::nodes))
    }
}

impl Code {
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.instructions
            .iter()
            .map(Node::Instruction)
            .chain(self.handlers.iter().map(Node::Handler))
            .chain(self.local_variables.iter().map(Node::LocalVariable))
    }
}

/// `a/b/C$D` → `a.b.C$D`.
pub fn internal_to_binary(name: &str) -> String {
    name.replace('/', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_follow_class_file_order() {
        let record = ClassRecord {
            name: "a.B".to_string(),
            super_name: Some("java.lang.Object".to_string()),
            fields: vec![FieldInfo {
                name: "f".to_string(),
                descriptor: "I".to_string(),
                ..Default::default()
            }],
            methods: vec![MethodInfo {
                name: "m".to_string(),
                descriptor: "()V".to_string(),
                code: Some(Code {
                    instructions: vec![Instruction::Type {
                        opcode: 0xbb,
                        class: "a/C".to_string(),
                    }],
                    handlers: vec![ExceptionHandler {
                        start_pc: 0,
                        end_pc: 4,
                        handler_pc: 4,
                        catch_type: None,
                    }],
                    local_variables: Vec::new(),
                }),
                ..Default::default()
            }],
            ..Default::default()
        };

        let kinds: Vec<&str> = record
            .nodes()
            .map(|node| match node {
                Node::Header(_) => "header",
                Node::InnerClass(_) => "inner",
                Node::Field(_) => "field",
                Node::Method(_) => "method",
                Node::Instruction(_) => "insn",
                Node::Handler(_) => "handler",
                Node::LocalVariable(_) => "local",
            })
            .collect();
        assert_eq!(kinds, ["header", "field", "method", "insn", "handler"]);

        // Walking twice yields the same sequence.
        assert_eq!(record.nodes().count(), kinds.len());
    }

    #[test]
    fn test_internal_names() {
        assert_eq!(internal_to_binary("com/foo/Bar$Baz"), "com.foo.Bar$Baz");
        assert_eq!(internal_to_binary("Main"), "Main");
    }
}
