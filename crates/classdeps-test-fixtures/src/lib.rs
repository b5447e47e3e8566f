//! Test fixtures for classdeps
//!
//! Class files are assembled byte by byte with [`ClassFileBuilder`] and packed
//! into real JAR files with [`JarFixture`], so tests never depend on a JDK or
//! on checked-in binaries.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Opcodes used by the fixtures.
pub mod op {
    pub const ICONST_0: u8 = 0x03;
    pub const POP: u8 = 0x57;
    pub const IINC: u8 = 0x84;
    pub const ILOAD: u8 = 0x15;
    pub const RETURN: u8 = 0xb1;
    pub const GETSTATIC: u8 = 0xb2;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const NEW: u8 = 0xbb;
    pub const CHECKCAST: u8 = 0xc0;
    pub const WIDE: u8 = 0xc4;
}

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_SUPER: u16 = 0x0020;

/// Constant pool under construction. Identical entries are shared.
#[derive(Debug)]
pub struct ConstantPool {
    bytes: Vec<u8>,
    next: u16,
    entries: HashMap<Vec<u8>, u16>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            next: 1,
            entries: HashMap::new(),
        }
    }

    fn add(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(index) = self.entries.get(&entry) {
            return *index;
        }
        let index = self.next;
        self.next += slots;
        self.bytes.extend_from_slice(&entry);
        self.entries.insert(entry, index);
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        let encoded = encode_modified_utf8(value);
        let mut entry = vec![1];
        entry.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        entry.extend_from_slice(&encoded);
        self.add(entry, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut entry = vec![6];
        entry.extend_from_slice(&value.to_bits().to_be_bytes());
        self.add(entry, 2)
    }

    pub fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.indexed(7, &[name])
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let utf8 = self.utf8(value);
        self.indexed(8, &[utf8])
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.indexed(12, &[name, descriptor])
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(11, owner, name, descriptor)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.indexed(tag, &[class, name_and_type])
    }

    pub fn method_handle(&mut self, kind: u8, reference: u16) -> u16 {
        let mut entry = vec![15, kind];
        entry.extend_from_slice(&reference.to_be_bytes());
        self.add(entry, 1)
    }

    pub fn method_type(&mut self, descriptor: &str) -> u16 {
        let descriptor = self.utf8(descriptor);
        self.indexed(16, &[descriptor])
    }

    pub fn invoke_dynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.indexed(18, &[bootstrap, name_and_type])
    }

    pub fn module(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.indexed(19, &[name])
    }

    fn indexed(&mut self, tag: u8, indices: &[u16]) -> u16 {
        let mut entry = vec![tag];
        for index in indices {
            entry.extend_from_slice(&index.to_be_bytes());
        }
        self.add(entry, 1)
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.next.to_be_bytes());
        out.extend_from_slice(&self.bytes);
    }
}

/// Java's modified UTF-8: NUL takes two bytes, supplementary characters are
/// written as surrogate pairs.
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

/// Annotation element values.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Str(String),
    /// Type descriptor and constant name.
    Enum(String, String),
    /// Return descriptor of a class literal.
    Class(String),
    Annotation(AnnotationSpec),
    Array(Vec<Value>),
}

#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    pub type_descriptor: String,
    pub elements: Vec<(String, Value)>,
}

impl AnnotationSpec {
    pub fn new(type_descriptor: &str) -> Self {
        Self {
            type_descriptor: type_descriptor.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn element(mut self, name: &str, value: Value) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

fn write_annotations(pool: &mut ConstantPool, annotations: &[AnnotationSpec], out: &mut Vec<u8>) {
    out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for annotation in annotations {
        write_annotation(pool, annotation, out);
    }
}

fn write_annotation(pool: &mut ConstantPool, annotation: &AnnotationSpec, out: &mut Vec<u8>) {
    out.extend_from_slice(&pool.utf8(&annotation.type_descriptor).to_be_bytes());
    out.extend_from_slice(&(annotation.elements.len() as u16).to_be_bytes());
    for (name, value) in &annotation.elements {
        out.extend_from_slice(&pool.utf8(name).to_be_bytes());
        write_value(pool, value, out);
    }
}

fn write_value(pool: &mut ConstantPool, value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Int(value) => {
            out.push(b'I');
            out.extend_from_slice(&pool.integer(*value).to_be_bytes());
        }
        Value::Str(value) => {
            out.push(b's');
            out.extend_from_slice(&pool.utf8(value).to_be_bytes());
        }
        Value::Enum(type_descriptor, name) => {
            out.push(b'e');
            out.extend_from_slice(&pool.utf8(type_descriptor).to_be_bytes());
            out.extend_from_slice(&pool.utf8(name).to_be_bytes());
        }
        Value::Class(descriptor) => {
            out.push(b'c');
            out.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
        }
        Value::Annotation(annotation) => {
            out.push(b'@');
            write_annotation(pool, annotation, out);
        }
        Value::Array(values) => {
            out.push(b'[');
            out.extend_from_slice(&(values.len() as u16).to_be_bytes());
            for value in values {
                write_value(pool, value, out);
            }
        }
    }
}

/// Attribute table of a class, field, method or `Code` attribute.
#[derive(Debug, Default)]
struct Attributes {
    bytes: Vec<u8>,
    count: u16,
}

impl Attributes {
    fn push(&mut self, pool: &mut ConstantPool, name: &str, body: &[u8]) {
        self.bytes.extend_from_slice(&pool.utf8(name).to_be_bytes());
        self.bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(body);
        self.count += 1;
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count.to_be_bytes());
        out.extend_from_slice(&self.bytes);
    }
}

/// Assembles a complete class file.
#[derive(Debug)]
pub struct ClassFileBuilder {
    pool: ConstantPool,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<u8>,
    field_count: u16,
    methods: Vec<u8>,
    method_count: u16,
    attributes: Attributes,
    annotations: Vec<AnnotationSpec>,
    inner_classes: Vec<[u16; 4]>,
}

impl ClassFileBuilder {
    /// A public class extending `java/lang/Object`. Names are internal names.
    pub fn new(internal_name: &str) -> Self {
        let mut pool = ConstantPool::new();
        let this_class = pool.class(internal_name);
        let super_class = pool.class("java/lang/Object");
        Self {
            pool,
            access_flags: ACC_PUBLIC | ACC_SUPER,
            this_class,
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            field_count: 0,
            methods: Vec::new(),
            method_count: 0,
            attributes: Attributes::default(),
            annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_class = self.pool.class(super_name);
        self
    }

    /// Super class index 0, as in `java/lang/Object` itself.
    pub fn without_super(mut self) -> Self {
        self.super_class = 0;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        let index = self.pool.class(interface);
        self.interfaces.push(index);
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        let index = self.pool.utf8(signature).to_be_bytes();
        self.attributes.push(&mut self.pool, "Signature", &index);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn inner_class(mut self, inner: &str, outer: Option<&str>, name: Option<&str>) -> Self {
        let inner = self.pool.class(inner);
        let outer = outer.map(|outer| self.pool.class(outer)).unwrap_or(0);
        let name = name.map(|name| self.pool.utf8(name)).unwrap_or(0);
        self.inner_classes
            .push([inner, outer, name, ACC_PUBLIC | ACC_STATIC]);
        self
    }

    /// An attribute the decoder does not know, e.g. `SourceFile`.
    pub fn attribute(mut self, name: &str, body: &[u8]) -> Self {
        self.attributes.push(&mut self.pool, name, body);
        self
    }

    pub fn field(
        mut self,
        name: &str,
        descriptor: &str,
        configure: impl FnOnce(&mut MemberBuilder<'_>),
    ) -> Self {
        let bytes = {
            let mut member = MemberBuilder::new(&mut self.pool, ACC_PUBLIC, name, descriptor);
            configure(&mut member);
            member.finish()
        };
        self.fields.extend_from_slice(&bytes);
        self.field_count += 1;
        self
    }

    pub fn method(
        mut self,
        name: &str,
        descriptor: &str,
        configure: impl FnOnce(&mut MemberBuilder<'_>),
    ) -> Self {
        let bytes = {
            let mut member = MemberBuilder::new(&mut self.pool, ACC_PUBLIC, name, descriptor);
            configure(&mut member);
            member.finish()
        };
        self.methods.extend_from_slice(&bytes);
        self.method_count += 1;
        self
    }

    /// Direct access to the pool, for constants no instruction refers to.
    pub fn pool(&mut self) -> &mut ConstantPool {
        &mut self.pool
    }

    pub fn build(mut self) -> Vec<u8> {
        if !self.annotations.is_empty() {
            let mut body = Vec::new();
            write_annotations(&mut self.pool, &self.annotations, &mut body);
            self.attributes
                .push(&mut self.pool, "RuntimeVisibleAnnotations", &body);
        }
        if !self.inner_classes.is_empty() {
            let mut body = Vec::new();
            body.extend_from_slice(&(self.inner_classes.len() as u16).to_be_bytes());
            for entry in &self.inner_classes {
                for value in entry {
                    body.extend_from_slice(&value.to_be_bytes());
                }
            }
            self.attributes.push(&mut self.pool, "InnerClasses", &body);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&52u16.to_be_bytes()); // major, Java 8
        self.pool.write(&mut out);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }
        out.extend_from_slice(&self.field_count.to_be_bytes());
        out.extend_from_slice(&self.fields);
        out.extend_from_slice(&self.method_count.to_be_bytes());
        out.extend_from_slice(&self.methods);
        self.attributes.write(&mut out);
        out
    }
}

/// A field or method, written once the configuring closure returns.
pub struct MemberBuilder<'p> {
    pool: &'p mut ConstantPool,
    access_flags: u16,
    name: u16,
    descriptor: u16,
    attributes: Attributes,
    annotations: Vec<AnnotationSpec>,
}

impl<'p> MemberBuilder<'p> {
    fn new(pool: &'p mut ConstantPool, access_flags: u16, name: &str, descriptor: &str) -> Self {
        let name = pool.utf8(name);
        let descriptor = pool.utf8(descriptor);
        Self {
            pool,
            access_flags,
            name,
            descriptor,
            attributes: Attributes::default(),
            annotations: Vec::new(),
        }
    }

    pub fn access(&mut self, flags: u16) -> &mut Self {
        self.access_flags = flags;
        self
    }

    pub fn signature(&mut self, signature: &str) -> &mut Self {
        let index = self.pool.utf8(signature).to_be_bytes();
        self.attributes.push(self.pool, "Signature", &index);
        self
    }

    pub fn exceptions(&mut self, exceptions: &[&str]) -> &mut Self {
        let mut body = (exceptions.len() as u16).to_be_bytes().to_vec();
        for exception in exceptions {
            body.extend_from_slice(&self.pool.class(exception).to_be_bytes());
        }
        self.attributes.push(self.pool, "Exceptions", &body);
        self
    }

    pub fn annotation(&mut self, annotation: AnnotationSpec) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    /// `RuntimeInvisibleParameterAnnotations`, one list per parameter.
    pub fn parameter_annotations(&mut self, parameters: Vec<Vec<AnnotationSpec>>) -> &mut Self {
        let mut body = vec![parameters.len() as u8];
        for annotations in &parameters {
            write_annotations(self.pool, annotations, &mut body);
        }
        self.attributes
            .push(self.pool, "RuntimeInvisibleParameterAnnotations", &body);
        self
    }

    pub fn annotation_default(&mut self, value: Value) -> &mut Self {
        let mut body = Vec::new();
        write_value(self.pool, &value, &mut body);
        self.attributes.push(self.pool, "AnnotationDefault", &body);
        self
    }

    pub fn constant_value(&mut self, value: i32) -> &mut Self {
        let index = self.pool.integer(value).to_be_bytes();
        self.attributes.push(self.pool, "ConstantValue", &index);
        self
    }

    pub fn code(&mut self, configure: impl FnOnce(&mut CodeBuilder<'_>)) -> &mut Self {
        let body = {
            let mut code = CodeBuilder::new(self.pool);
            configure(&mut code);
            code.finish()
        };
        self.attributes.push(self.pool, "Code", &body);
        self
    }

    fn finish(self) -> Vec<u8> {
        let mut attributes = self.attributes;
        if !self.annotations.is_empty() {
            let mut body = Vec::new();
            write_annotations(self.pool, &self.annotations, &mut body);
            attributes.push(self.pool, "RuntimeVisibleAnnotations", &body);
        }
        let mut out = Vec::new();
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.name.to_be_bytes());
        out.extend_from_slice(&self.descriptor.to_be_bytes());
        attributes.write(&mut out);
        out
    }
}

/// Bytecode and the tables of a `Code` attribute.
pub struct CodeBuilder<'p> {
    pool: &'p mut ConstantPool,
    code: Vec<u8>,
    handlers: Vec<[u16; 4]>,
    locals: Vec<[u16; 5]>,
    local_types: Vec<[u16; 5]>,
    attributes: Attributes,
}

impl<'p> CodeBuilder<'p> {
    fn new(pool: &'p mut ConstantPool) -> Self {
        Self {
            pool,
            code: Vec::new(),
            handlers: Vec::new(),
            locals: Vec::new(),
            local_types: Vec::new(),
            attributes: Attributes::default(),
        }
    }

    /// Current bytecode offset.
    pub fn offset(&self) -> u16 {
        self.code.len() as u16
    }

    /// Raw bytes: opcodes without constant-pool operands.
    pub fn emit(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    fn emit_index(&mut self, opcode: u8, index: u16) {
        self.code.push(opcode);
        self.code.extend_from_slice(&index.to_be_bytes());
    }

    /// `new`, `anewarray`, `checkcast` or `instanceof`.
    pub fn type_insn(&mut self, opcode: u8, class: &str) -> &mut Self {
        let index = self.pool.class(class);
        self.emit_index(opcode, index);
        self
    }

    pub fn field_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> &mut Self {
        let index = self.pool.field_ref(owner, name, descriptor);
        self.emit_index(opcode, index);
        self
    }

    pub fn method_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> &mut Self {
        if opcode == op::INVOKEINTERFACE {
            let index = self.pool.interface_method_ref(owner, name, descriptor);
            self.emit_index(opcode, index);
            self.code.extend_from_slice(&[1, 0]);
        } else {
            let index = self.pool.method_ref(owner, name, descriptor);
            self.emit_index(opcode, index);
        }
        self
    }

    pub fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let index = self.pool.invoke_dynamic(0, name, descriptor);
        self.emit_index(0xba, index);
        self.code.extend_from_slice(&[0, 0]);
        self
    }

    pub fn multi_new_array(&mut self, descriptor: &str, dimensions: u8) -> &mut Self {
        let index = self.pool.class(descriptor);
        self.emit_index(0xc5, index);
        self.code.push(dimensions);
        self
    }

    /// `ldc` when the index fits in a byte, `ldc_w` otherwise.
    pub fn ldc(&mut self, index: u16) -> &mut Self {
        match u8::try_from(index) {
            Ok(short) => self.code.extend_from_slice(&[0x12, short]),
            Err(_) => self.emit_index(0x13, index),
        }
        self
    }

    pub fn ldc_class(&mut self, class: &str) -> &mut Self {
        let index = self.pool.class(class);
        self.ldc(index)
    }

    pub fn ldc_method_type(&mut self, descriptor: &str) -> &mut Self {
        let index = self.pool.method_type(descriptor);
        self.ldc(index)
    }

    pub fn ldc_string(&mut self, value: &str) -> &mut Self {
        let index = self.pool.string(value);
        self.ldc(index)
    }

    pub fn ldc2_long(&mut self, value: i64) -> &mut Self {
        let index = self.pool.long(value);
        self.emit_index(0x14, index);
        self
    }

    /// `tableswitch` over `low..=high`, every target at offset 0.
    pub fn table_switch(&mut self, low: i32, high: i32) -> &mut Self {
        self.code.push(0xaa);
        self.pad();
        self.code.extend_from_slice(&0i32.to_be_bytes());
        self.code.extend_from_slice(&low.to_be_bytes());
        self.code.extend_from_slice(&high.to_be_bytes());
        for _ in low..=high {
            self.code.extend_from_slice(&0i32.to_be_bytes());
        }
        self
    }

    /// `lookupswitch` over `keys`, every target at offset 0.
    pub fn lookup_switch(&mut self, keys: &[i32]) -> &mut Self {
        self.code.push(0xab);
        self.pad();
        self.code.extend_from_slice(&0i32.to_be_bytes());
        self.code.extend_from_slice(&(keys.len() as i32).to_be_bytes());
        for key in keys {
            self.code.extend_from_slice(&key.to_be_bytes());
            self.code.extend_from_slice(&0i32.to_be_bytes());
        }
        self
    }

    fn pad(&mut self) {
        while self.code.len() % 4 != 0 {
            self.code.push(0);
        }
    }

    /// Exception table entry; `None` is a catch-all handler.
    pub fn handler(
        &mut self,
        start: u16,
        end: u16,
        handler: u16,
        catch_type: Option<&str>,
    ) -> &mut Self {
        let catch_type = catch_type.map(|class| self.pool.class(class)).unwrap_or(0);
        self.handlers.push([start, end, handler, catch_type]);
        self
    }

    pub fn local(
        &mut self,
        start: u16,
        length: u16,
        name: &str,
        descriptor: &str,
        index: u16,
    ) -> &mut Self {
        let name = self.pool.utf8(name);
        let descriptor = self.pool.utf8(descriptor);
        self.locals.push([start, length, name, descriptor, index]);
        self
    }

    /// `LocalVariableTypeTable` entry; matched to a `local` by start, length and index.
    pub fn local_signature(
        &mut self,
        start: u16,
        length: u16,
        name: &str,
        signature: &str,
        index: u16,
    ) -> &mut Self {
        let name = self.pool.utf8(name);
        let signature = self.pool.utf8(signature);
        self.local_types.push([start, length, name, signature, index]);
        self
    }

    /// An attribute the decoder skips, e.g. `LineNumberTable`.
    pub fn attribute(&mut self, name: &str, body: &[u8]) -> &mut Self {
        self.attributes.push(self.pool, name, body);
        self
    }

    fn finish(self) -> Vec<u8> {
        let mut attributes = self.attributes;
        for (name, table) in [
            ("LocalVariableTable", &self.locals),
            ("LocalVariableTypeTable", &self.local_types),
        ] {
            if table.is_empty() {
                continue;
            }
            let mut body = (table.len() as u16).to_be_bytes().to_vec();
            for entry in table {
                for value in entry {
                    body.extend_from_slice(&value.to_be_bytes());
                }
            }
            attributes.push(self.pool, name, &body);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&8u16.to_be_bytes()); // max_stack
        out.extend_from_slice(&8u16.to_be_bytes()); // max_locals
        out.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.code);
        out.extend_from_slice(&(self.handlers.len() as u16).to_be_bytes());
        for handler in &self.handlers {
            for value in handler {
                out.extend_from_slice(&value.to_be_bytes());
            }
        }
        attributes.write(&mut out);
        out
    }
}

/// A temporary directory holding JAR files written by the tests.
pub struct JarFixture {
    dir: tempfile::TempDir,
}

impl Default for JarFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl JarFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Writes `file_name` with the given entries; names ending in `/` become
    /// directory entries.
    pub fn jar<S: AsRef<str>>(&self, file_name: &str, entries: &[(S, Vec<u8>)]) -> PathBuf {
        let path = self.dir.path().join(file_name);
        write_jar(&path, entries);
        path
    }

    /// Writes a file that is not a zip archive.
    pub fn garbage(&self, file_name: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, b"definitely not a zip archive").unwrap();
        path
    }
}

pub fn write_jar<S: AsRef<str>>(path: &Path, entries: &[(S, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, bytes) in entries {
        let name = name.as_ref();
        if name.ends_with('/') {
            zip.add_directory(name, options).unwrap();
        } else {
            zip.start_file(name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
    }
    zip.finish().unwrap();
}

/// `com/foo/Bar` → `com/foo/Bar.class` with a minimal class body.
pub fn simple_class_entry(internal_name: &str) -> (String, Vec<u8>) {
    (
        format!("{}.class", internal_name),
        ClassFileBuilder::new(internal_name).build(),
    )
}
