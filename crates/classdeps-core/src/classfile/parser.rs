//! Class-file decoding into [`ClassRecord`]

use super::code::decode_instructions;
use super::model::{
    internal_to_binary, Annotation, AnnotationElement, ClassRecord, Code, ElementValue,
    ExceptionHandler, FieldInfo, InnerClass, LocalVariable, MethodInfo,
};
use super::reader::{ByteReader, ConstantPool};
use super::ClassParseError;

/// Nesting limit for annotation element values (nested annotations and arrays).
pub(crate) const MAX_ELEMENT_DEPTH: usize = 64;

/// Decodes a complete class file.
pub fn parse_class(bytes: &[u8]) -> Result<ClassRecord, ClassParseError> {
    let mut reader = ByteReader::new(bytes);
    reader.expect_magic()?;
    let _minor_version = reader.read_u2()?;
    let _major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.read_u2()?;
    let this_class = reader.read_u2()?;
    let super_class = reader.read_u2()?;

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        interfaces.push(internal_to_binary(pool.class_name(reader.read_u2()?)?));
    }

    let fields_count = reader.read_u2()?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for _ in 0..fields_count {
        fields.push(parse_field(&mut reader, &pool)?);
    }

    let methods_count = reader.read_u2()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        methods.push(parse_method(&mut reader, &pool)?);
    }

    let mut record = ClassRecord {
        name: internal_to_binary(pool.class_name(this_class)?),
        super_name: pool.optional_class_name(super_class)?.map(internal_to_binary),
        interfaces,
        access_flags,
        fields,
        methods,
        ..Default::default()
    };

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let (name, body) = read_attribute(&mut reader, &pool)?;
        let mut attr = ByteReader::new(body);
        match name {
            "Signature" => record.signature = Some(read_utf8(&mut attr, &pool)?),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                record.annotations.extend(parse_annotations(&mut attr, &pool)?)
            }
            "InnerClasses" => record.inner_classes = parse_inner_classes(&mut attr, &pool)?,
            _ => {}
        }
    }

    Ok(record)
}

fn read_attribute<'a, 'p>(
    reader: &mut ByteReader<'a>,
    pool: &'p ConstantPool,
) -> Result<(&'p str, &'a [u8]), ClassParseError> {
    let name = pool.utf8(reader.read_u2()?)?;
    let length = reader.read_u4()? as usize;
    Ok((name, reader.read_slice(length)?))
}

fn read_utf8(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<String, ClassParseError> {
    Ok(pool.utf8(reader.read_u2()?)?.to_string())
}

fn parse_field(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<FieldInfo, ClassParseError> {
    let mut field = FieldInfo {
        access_flags: reader.read_u2()?,
        name: read_utf8(reader, pool)?,
        descriptor: read_utf8(reader, pool)?,
        ..Default::default()
    };

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let (name, body) = read_attribute(reader, pool)?;
        let mut attr = ByteReader::new(body);
        match name {
            "Signature" => field.signature = Some(read_utf8(&mut attr, pool)?),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                field.annotations.extend(parse_annotations(&mut attr, pool)?)
            }
            _ => {}
        }
    }

    Ok(field)
}

fn parse_method(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<MethodInfo, ClassParseError> {
    let mut method = MethodInfo {
        access_flags: reader.read_u2()?,
        name: read_utf8(reader, pool)?,
        descriptor: read_utf8(reader, pool)?,
        ..Default::default()
    };

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let (name, body) = read_attribute(reader, pool)?;
        let mut attr = ByteReader::new(body);
        match name {
            "Signature" => method.signature = Some(read_utf8(&mut attr, pool)?),
            "Exceptions" => {
                let count = attr.read_u2()?;
                for _ in 0..count {
                    method.exceptions.push(pool.class_name(attr.read_u2()?)?.to_string());
                }
            }
            "Code" => method.code = Some(parse_code(&mut attr, pool)?),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                method.annotations.extend(parse_annotations(&mut attr, pool)?)
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let parameters = attr.read_u1()? as usize;
                if method.parameter_annotations.len() < parameters {
                    method.parameter_annotations.resize(parameters, Vec::new());
                }
                for parameter in 0..parameters {
                    let annotations = parse_annotations(&mut attr, pool)?;
                    method.parameter_annotations[parameter].extend(annotations);
                }
            }
            "AnnotationDefault" => {
                method.annotation_default = Some(parse_element_value(&mut attr, pool, 0)?)
            }
            _ => {}
        }
    }

    Ok(method)
}

fn parse_code(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Code, ClassParseError> {
    let _max_stack = reader.read_u2()?;
    let _max_locals = reader.read_u2()?;
    let code_length = reader.read_u4()? as usize;
    let instructions = decode_instructions(reader.read_slice(code_length)?, pool)?;

    let handler_count = reader.read_u2()?;
    let mut handlers = Vec::with_capacity(handler_count as usize);
    for _ in 0..handler_count {
        handlers.push(ExceptionHandler {
            start_pc: reader.read_u2()?,
            end_pc: reader.read_u2()?,
            handler_pc: reader.read_u2()?,
            catch_type: pool.optional_class_name(reader.read_u2()?)?.map(str::to_string),
        });
    }

    // slots[i] is the (start_pc, length, index) key of local_variables[i]
    let mut local_variables: Vec<LocalVariable> = Vec::new();
    let mut slots: Vec<(u16, u16, u16)> = Vec::new();
    let mut signatures: Vec<((u16, u16, u16), String)> = Vec::new();

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let (name, body) = read_attribute(reader, pool)?;
        let mut attr = ByteReader::new(body);
        match name {
            "LocalVariableTable" => {
                let count = attr.read_u2()?;
                for _ in 0..count {
                    let start_pc = attr.read_u2()?;
                    let length = attr.read_u2()?;
                    let name = read_utf8(&mut attr, pool)?;
                    let descriptor = read_utf8(&mut attr, pool)?;
                    let index = attr.read_u2()?;
                    slots.push((start_pc, length, index));
                    local_variables.push(LocalVariable {
                        name,
                        descriptor,
                        signature: None,
                        index,
                    });
                }
            }
            "LocalVariableTypeTable" => {
                let count = attr.read_u2()?;
                for _ in 0..count {
                    let start_pc = attr.read_u2()?;
                    let length = attr.read_u2()?;
                    let _name = attr.read_u2()?;
                    let signature = read_utf8(&mut attr, pool)?;
                    let index = attr.read_u2()?;
                    signatures.push(((start_pc, length, index), signature));
                }
            }
            _ => {}
        }
    }

    // Type-table entries without a matching variable entry are dropped.
    for (slot, signature) in signatures {
        if let Some(position) = slots.iter().position(|candidate| *candidate == slot) {
            local_variables[position].signature = Some(signature);
        }
    }

    Ok(Code {
        instructions,
        handlers,
        local_variables,
    })
}

fn parse_inner_classes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<InnerClass>, ClassParseError> {
    let count = reader.read_u2()?;
    let mut inner_classes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        inner_classes.push(InnerClass {
            inner_class: pool.class_name(reader.read_u2()?)?.to_string(),
            outer_class: pool.optional_class_name(reader.read_u2()?)?.map(str::to_string),
            inner_name: pool.optional_utf8(reader.read_u2()?)?.map(str::to_string),
            access_flags: reader.read_u2()?,
        });
    }
    Ok(inner_classes)
}

fn parse_annotations(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Annotation>, ClassParseError> {
    let count = reader.read_u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(reader, pool, 0)?);
    }
    Ok(annotations)
}

fn parse_annotation(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    depth: usize,
) -> Result<Annotation, ClassParseError> {
    let type_descriptor = read_utf8(reader, pool)?;
    let pairs = reader.read_u2()?;
    let mut elements = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        elements.push(AnnotationElement {
            name: read_utf8(reader, pool)?,
            value: parse_element_value(reader, pool, depth + 1)?,
        });
    }
    Ok(Annotation {
        type_descriptor,
        elements,
    })
}

fn parse_element_value(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    depth: usize,
) -> Result<ElementValue, ClassParseError> {
    if depth > MAX_ELEMENT_DEPTH {
        return Err(ClassParseError::NestingTooDeep {
            limit: MAX_ELEMENT_DEPTH,
        });
    }
    let tag = reader.read_u1()?;
    let value = match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
            reader.read_u2()?;
            ElementValue::Primitive(tag as char)
        }
        b's' => ElementValue::String(read_utf8(reader, pool)?),
        b'e' => ElementValue::Enum {
            type_descriptor: read_utf8(reader, pool)?,
            const_name: read_utf8(reader, pool)?,
        },
        b'c' => ElementValue::Class(read_utf8(reader, pool)?),
        b'@' => ElementValue::Annotation(parse_annotation(reader, pool, depth)?),
        b'[' => {
            let count = reader.read_u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(reader, pool, depth + 1)?);
            }
            ElementValue::Array(values)
        }
        other => return Err(ClassParseError::InvalidElementTag { tag: other as char }),
    };
    Ok(value)
}
