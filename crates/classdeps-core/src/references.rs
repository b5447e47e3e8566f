//! Type-reference extraction
//!
//! Walks the structural nodes of a [`ClassRecord`] and reports every class it
//! names, in binary form (`a.b.C$D`). Arrays report their element class,
//! primitives report nothing, and malformed descriptors or signatures are
//! skipped silently. The result is a multiset: a class referenced twice is
//! reported twice.

use crate::classfile::{
    internal_to_binary, Annotation, ClassRecord, ElementValue, Instruction, Node, TypeConstant,
};
use crate::descriptor::{parse_return_descriptor, FieldType, MethodDescriptor};
use crate::signature::{ClassTypeSignature, Signature, TypeParameter, TypeSignature};

/// Every class named anywhere in `record`, duplicates included.
pub fn extract_references(record: &ClassRecord) -> Vec<String> {
    let mut references = Vec::new();
    for node in record.nodes() {
        visit_node(node, &mut references);
    }
    references
}

/// References contributed by a single node.
pub fn node_references(node: Node<'_>) -> Vec<String> {
    let mut references = Vec::new();
    visit_node(node, &mut references);
    references
}

fn visit_node(node: Node<'_>, out: &mut Vec<String>) {
    match node {
        Node::Header(record) => {
            out.extend(record.super_name.iter().cloned());
            out.extend(record.interfaces.iter().cloned());
            visit_signature(record.signature.as_deref(), out);
            visit_annotations(&record.annotations, out);
        }
        Node::InnerClass(inner) => push_internal(&inner.inner_class, out),
        Node::Field(field) => {
            visit_field_descriptor(&field.descriptor, out);
            visit_signature(field.signature.as_deref(), out);
            visit_annotations(&field.annotations, out);
        }
        Node::Method(method) => {
            visit_method_descriptor(&method.descriptor, out);
            visit_signature(method.signature.as_deref(), out);
            for exception in &method.exceptions {
                push_internal(exception, out);
            }
            visit_annotations(&method.annotations, out);
            for parameter in &method.parameter_annotations {
                visit_annotations(parameter, out);
            }
            if let Some(default) = &method.annotation_default {
                visit_element_value(default, out);
            }
        }
        Node::Instruction(instruction) => visit_instruction(instruction, out),
        Node::Handler(handler) => {
            if let Some(catch_type) = &handler.catch_type {
                push_internal(catch_type, out);
            }
        }
        Node::LocalVariable(local) => {
            visit_field_descriptor(&local.descriptor, out);
            visit_signature(local.signature.as_deref(), out);
        }
    }
}

fn visit_instruction(instruction: &Instruction, out: &mut Vec<String>) {
    match instruction {
        Instruction::Type { class, .. } => visit_class_operand(class, out),
        Instruction::Field {
            owner, descriptor, ..
        } => {
            visit_class_operand(owner, out);
            visit_field_descriptor(descriptor, out);
        }
        Instruction::Method {
            owner, descriptor, ..
        } => {
            // Methods invoked on arrays (`[I.clone()`) have an array owner.
            visit_class_operand(owner, out);
            visit_method_descriptor(descriptor, out);
        }
        Instruction::InvokeDynamic { descriptor, .. } => visit_method_descriptor(descriptor, out),
        Instruction::MultiANewArray { descriptor, .. } => visit_class_operand(descriptor, out),
        Instruction::LoadConstant(TypeConstant::Class(class)) => visit_class_operand(class, out),
        Instruction::LoadConstant(TypeConstant::MethodType(descriptor)) => {
            visit_method_descriptor(descriptor, out)
        }
    }
}

/// A `CONSTANT_Class` operand: an internal name, or an array descriptor.
fn visit_class_operand(operand: &str, out: &mut Vec<String>) {
    if operand.starts_with('[') {
        visit_field_descriptor(operand, out);
    } else {
        push_internal(operand, out);
    }
}

fn visit_field_descriptor(descriptor: &str, out: &mut Vec<String>) {
    if let Ok(ty) = FieldType::parse(descriptor) {
        push_field_type(&ty, out);
    }
}

fn visit_method_descriptor(descriptor: &str, out: &mut Vec<String>) {
    if let Ok(method) = MethodDescriptor::parse(descriptor) {
        for ty in method.types() {
            push_field_type(ty, out);
        }
    }
}

fn push_field_type(ty: &FieldType, out: &mut Vec<String>) {
    if let Some(name) = ty.class_name() {
        push_internal(name, out);
    }
}

fn push_internal(name: &str, out: &mut Vec<String>) {
    if !name.is_empty() {
        out.push(internal_to_binary(name));
    }
}

fn visit_signature(signature: Option<&str>, out: &mut Vec<String>) {
    let Some(Ok(signature)) = signature.map(Signature::parse) else {
        return;
    };
    match signature {
        Signature::Class(class) => {
            visit_type_parameters(&class.type_parameters, out);
            visit_class_type(&class.superclass, out);
            for interface in &class.interfaces {
                visit_class_type(interface, out);
            }
        }
        Signature::Method(method) => {
            visit_type_parameters(&method.type_parameters, out);
            for ty in method
                .parameters
                .iter()
                .chain(method.result.iter())
                .chain(method.throws.iter())
            {
                visit_type(ty, out);
            }
        }
        Signature::Type(ty) => visit_type(&ty, out),
    }
}

fn visit_type_parameters(parameters: &[TypeParameter], out: &mut Vec<String>) {
    for parameter in parameters {
        for bound in parameter
            .class_bound
            .iter()
            .chain(parameter.interface_bounds.iter())
        {
            visit_type(bound, out);
        }
    }
}

fn visit_type(ty: &TypeSignature, out: &mut Vec<String>) {
    match ty {
        TypeSignature::Base(_) | TypeSignature::TypeVariable(_) => {}
        TypeSignature::Class(class) => visit_class_type(class, out),
        TypeSignature::Array(component) => visit_type(component, out),
    }
}

fn visit_class_type(class: &ClassTypeSignature, out: &mut Vec<String>) {
    for name in class.class_names() {
        push_internal(&name, out);
    }
    for argument in class.all_type_arguments() {
        if let Some(bound) = argument.bound() {
            visit_type(bound, out);
        }
    }
}

fn visit_annotations(annotations: &[Annotation], out: &mut Vec<String>) {
    for annotation in annotations {
        visit_annotation(annotation, out);
    }
}

fn visit_annotation(annotation: &Annotation, out: &mut Vec<String>) {
    visit_field_descriptor(&annotation.type_descriptor, out);
    for element in &annotation.elements {
        visit_element_value(&element.value, out);
    }
}

fn visit_element_value(value: &ElementValue, out: &mut Vec<String>) {
    match value {
        ElementValue::Primitive(_) | ElementValue::String(_) => {}
        ElementValue::Enum {
            type_descriptor, ..
        } => visit_field_descriptor(type_descriptor, out),
        ElementValue::Class(descriptor) => {
            if let Ok(Some(ty)) = parse_return_descriptor(descriptor) {
                push_field_type(&ty, out);
            }
        }
        ElementValue::Annotation(nested) => visit_annotation(nested, out),
        ElementValue::Array(values) => {
            for value in values {
                visit_element_value(value, out);
            }
        }
    }
}
