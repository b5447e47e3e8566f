//! Bytecode scanning for the `Code` attribute

use super::model::Instruction;
use super::reader::{ByteReader, ConstantPool};
use super::ClassParseError;

/// Opcode values referenced by [`Instruction`] variants.
pub mod opcodes {
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const LDC2_W: u8 = 0x14;
    pub const IINC: u8 = 0x84;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const LOOKUPSWITCH: u8 = 0xab;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const INVOKEDYNAMIC: u8 = 0xba;
    pub const NEW: u8 = 0xbb;
    pub const NEWARRAY: u8 = 0xbc;
    pub const ANEWARRAY: u8 = 0xbd;
    pub const CHECKCAST: u8 = 0xc0;
    pub const INSTANCEOF: u8 = 0xc1;
    pub const WIDE: u8 = 0xc4;
    pub const MULTIANEWARRAY: u8 = 0xc5;
    pub const GOTO_W: u8 = 0xc8;
    pub const JSR_W: u8 = 0xc9;
}

use opcodes::*;

/// Scans `code` and returns the instructions that carry a type operand.
pub(crate) fn decode_instructions(
    code: &[u8],
    pool: &ConstantPool,
) -> Result<Vec<Instruction>, ClassParseError> {
    let mut reader = ByteReader::new(code);
    let mut instructions = Vec::new();

    while reader.remaining() > 0 {
        let offset = reader.position();
        let opcode = reader.read_u1()?;
        match opcode {
            LDC => {
                let index = reader.read_u1()? as u16;
                if let Some(constant) = pool.loadable_type(index)? {
                    instructions.push(Instruction::LoadConstant(constant));
                }
            }
            LDC_W => {
                let index = reader.read_u2()?;
                if let Some(constant) = pool.loadable_type(index)? {
                    instructions.push(Instruction::LoadConstant(constant));
                }
            }
            GETSTATIC | PUTSTATIC | GETFIELD | PUTFIELD => {
                let member = pool.member_ref(reader.read_u2()?)?;
                instructions.push(Instruction::Field {
                    opcode,
                    owner: member.owner.to_string(),
                    name: member.name.to_string(),
                    descriptor: member.descriptor.to_string(),
                });
            }
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC | INVOKEINTERFACE => {
                let member = pool.member_ref(reader.read_u2()?)?;
                if opcode == INVOKEINTERFACE {
                    reader.skip(2)?; // count, 0
                }
                instructions.push(Instruction::Method {
                    opcode,
                    owner: member.owner.to_string(),
                    name: member.name.to_string(),
                    descriptor: member.descriptor.to_string(),
                });
            }
            INVOKEDYNAMIC => {
                let (name, descriptor) = pool.invoke_dynamic(reader.read_u2()?)?;
                reader.skip(2)?;
                instructions.push(Instruction::InvokeDynamic {
                    name: name.to_string(),
                    descriptor: descriptor.to_string(),
                });
            }
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
                let class = pool.class_name(reader.read_u2()?)?;
                instructions.push(Instruction::Type {
                    opcode,
                    class: class.to_string(),
                });
            }
            MULTIANEWARRAY => {
                let descriptor = pool.class_name(reader.read_u2()?)?;
                let dimensions = reader.read_u1()?;
                instructions.push(Instruction::MultiANewArray {
                    descriptor: descriptor.to_string(),
                    dimensions,
                });
            }
            TABLESWITCH => {
                skip_padding(&mut reader)?;
                reader.skip(4)?; // default
                let low = reader.read_i4()?;
                let high = reader.read_i4()?;
                let count = (high as i64 - low as i64 + 1).max(0) as usize;
                reader.skip(count.saturating_mul(4))?;
            }
            LOOKUPSWITCH => {
                skip_padding(&mut reader)?;
                reader.skip(4)?; // default
                let pairs = reader.read_i4()?.max(0) as usize;
                reader.skip(pairs.saturating_mul(8))?;
            }
            WIDE => {
                let widened = reader.read_u1()?;
                reader.skip(if widened == IINC { 4 } else { 2 })?;
            }
            other => {
                let length = operand_length(other).ok_or(ClassParseError::UnknownOpcode {
                    opcode: other,
                    offset,
                })?;
                reader.skip(length)?;
            }
        }
    }

    Ok(instructions)
}

/// Switch operands start on a four-byte boundary relative to the code start.
fn skip_padding(reader: &mut ByteReader<'_>) -> Result<(), ClassParseError> {
    let padding = (4 - reader.position() % 4) % 4;
    reader.skip(padding)
}

/// Operand byte count of the fixed-length opcodes not handled above.
fn operand_length(opcode: u8) -> Option<usize> {
    match opcode {
        0x00..=0x0f => Some(0),
        0x10 => Some(1),          // bipush
        0x11 => Some(2),          // sipush
        LDC2_W => Some(2),
        0x15..=0x19 => Some(1),   // iload..aload
        0x1a..=0x35 => Some(0),
        0x36..=0x3a => Some(1),   // istore..astore
        0x3b..=0x83 => Some(0),
        IINC => Some(2),
        0x85..=0x98 => Some(0),
        0x99..=0xa8 => Some(2),   // if*, goto, jsr
        0xa9 => Some(1),          // ret
        0xac..=0xb1 => Some(0),   // returns
        NEWARRAY => Some(1),
        0xbe | 0xbf => Some(0),   // arraylength, athrow
        0xc2 | 0xc3 => Some(0),   // monitorenter, monitorexit
        0xc6 | 0xc7 => Some(2),   // ifnull, ifnonnull
        GOTO_W | JSR_W => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_pool() -> ConstantPool {
        let bytes = [0x00, 0x01];
        ConstantPool::parse(&mut ByteReader::new(&bytes)).expect("empty pool")
    }

    #[test]
    fn test_skips_plain_instructions() {
        // iconst_0, istore_1, iinc 1 1, bipush 7, goto +0, return
        let code = [0x03, 0x3c, 0x84, 0x01, 0x01, 0x10, 0x07, 0xa7, 0x00, 0x00, 0xb1];
        let instructions = decode_instructions(&code, &empty_pool()).expect("decodes");
        assert!(instructions.is_empty());
    }

    #[test]
    fn test_tableswitch_padding() {
        // nop, tableswitch at offset 1 -> two padding bytes to reach offset 4
        let mut code = vec![0x00, TABLESWITCH, 0x00, 0x00];
        code.extend_from_slice(&0i32.to_be_bytes()); // default
        code.extend_from_slice(&1i32.to_be_bytes()); // low
        code.extend_from_slice(&2i32.to_be_bytes()); // high
        code.extend_from_slice(&[0; 8]); // two offsets
        code.push(0xb1);
        assert!(decode_instructions(&code, &empty_pool()).is_ok());
    }

    #[test]
    fn test_lookupswitch_and_wide() {
        // lookupswitch at offset 0 -> three padding bytes
        let mut code = vec![LOOKUPSWITCH, 0x00, 0x00, 0x00];
        code.extend_from_slice(&0i32.to_be_bytes()); // default
        code.extend_from_slice(&1i32.to_be_bytes()); // npairs
        code.extend_from_slice(&[0; 8]);
        // wide iinc, wide iload
        code.extend_from_slice(&[WIDE, IINC, 0x01, 0x00, 0x00, 0x01]);
        code.extend_from_slice(&[WIDE, 0x15, 0x01, 0x00]);
        code.push(0xb1);
        assert!(decode_instructions(&code, &empty_pool()).is_ok());
    }

    #[test]
    fn test_unknown_opcode() {
        let code = [0x00, 0xfe];
        assert!(matches!(
            decode_instructions(&code, &empty_pool()),
            Err(ClassParseError::UnknownOpcode {
                opcode: 0xfe,
                offset: 1
            })
        ));
    }

    #[test]
    fn test_truncated_operand() {
        let code = [NEW, 0x00];
        assert!(matches!(
            decode_instructions(&code, &empty_pool()),
            Err(ClassParseError::UnexpectedEof)
        ));
    }
}
