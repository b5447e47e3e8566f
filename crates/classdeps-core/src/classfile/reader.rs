//! Big-endian byte cursor and constant pool for class-file decoding

use super::model::TypeConstant;
use super::ClassParseError;

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub(crate) fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        const MAGIC: u32 = 0xCAFE_BABE;
        let magic = self.read_u4()?;
        if magic != MAGIC {
            return Err(ClassParseError::InvalidMagic { found: magic });
        }
        Ok(())
    }

    pub(crate) fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        let value = *self
            .data
            .get(self.pos)
            .ok_or(ClassParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(value)
    }

    pub(crate) fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_i4(&mut self) -> Result<i32, ClassParseError> {
        Ok(self.read_u4()? as i32)
    }

    pub(crate) fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }
}

#[derive(Debug, Clone)]
enum Constant {
    Unusable,
    Utf8(String),
    Numeric,
    Class { name_index: u16 },
    String,
    MemberRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle,
    MethodType { descriptor_index: u16 },
    Dynamic,
    InvokeDynamic { name_and_type_index: u16 },
    Module,
    Package,
}

/// Resolved field or method reference.
pub(crate) struct MemberRef<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}

pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.read_slice(length)?))
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Numeric
                }
                5 | 6 => {
                    // Eight-byte constants take two pool slots.
                    reader.skip(8)?;
                    entries.push(Constant::Numeric);
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 => {
                    reader.read_u2()?;
                    Constant::String
                }
                9..=11 => Constant::MemberRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                12 => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                15 => {
                    reader.skip(3)?;
                    Constant::MethodHandle
                }
                16 => Constant::MethodType {
                    descriptor_index: reader.read_u2()?,
                },
                17 => {
                    reader.skip(4)?;
                    Constant::Dynamic
                }
                18 => {
                    reader.read_u2()?; // bootstrap method attr index
                    Constant::InvokeDynamic {
                        name_and_type_index: reader.read_u2()?,
                    }
                }
                19 => {
                    reader.read_u2()?;
                    Constant::Module
                }
                20 => {
                    reader.read_u2()?;
                    Constant::Package
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Internal name (or array descriptor) of a `CONSTANT_Class` entry.
    pub(crate) fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Like [`ConstantPool::class_name`], with index 0 meaning "none".
    pub(crate) fn optional_class_name(&self, index: u16) -> Result<Option<&str>, ClassParseError> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    pub(crate) fn optional_utf8(&self, index: u16) -> Result<Option<&str>, ClassParseError> {
        if index == 0 {
            return Ok(None);
        }
        self.utf8(index).map(Some)
    }

    fn name_and_type(&self, index: u16) -> Result<(&str, &str), ClassParseError> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    pub(crate) fn member_ref(&self, index: u16) -> Result<MemberRef<'_>, ClassParseError> {
        match self.get(index)? {
            Constant::MemberRef {
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok(MemberRef {
                    owner,
                    name,
                    descriptor,
                })
            }
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Name and descriptor of an `invokedynamic` call site.
    pub(crate) fn invoke_dynamic(&self, index: u16) -> Result<(&str, &str), ClassParseError> {
        match self.get(index)? {
            Constant::InvokeDynamic {
                name_and_type_index,
            } => self.name_and_type(*name_and_type_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// The type denoted by an `ldc` operand, if it denotes one at all.
    pub(crate) fn loadable_type(
        &self,
        index: u16,
    ) -> Result<Option<TypeConstant>, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => {
                Ok(Some(TypeConstant::Class(self.utf8(*name_index)?.to_string())))
            }
            Constant::MethodType { descriptor_index } => Ok(Some(TypeConstant::MethodType(
                self.utf8(*descriptor_index)?.to_string(),
            ))),
            Constant::Numeric | Constant::String | Constant::MethodHandle | Constant::Dynamic => {
                Ok(None)
            }
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }
}

/// Decodes the JVM's modified UTF-8: NUL is encoded on two bytes and
/// supplementary characters as surrogate pairs. Malformed sequences are
/// replaced rather than rejected.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    if let Ok(plain) = std::str::from_utf8(bytes) {
        return plain.to_string();
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        if b0 & 0x80 == 0 {
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            let b1 = bytes[i + 1] as u16;
            units.push(((b0 & 0x1F) << 6) | (b1 & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            let b1 = bytes[i + 1] as u16;
            let b2 = bytes[i + 2] as u16;
            units.push(((b0 & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F));
            i += 3;
        } else {
            units.push(char::REPLACEMENT_CHARACTER as u16);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reports_eof() {
        let mut reader = ByteReader::new(&[0x01]);
        assert!(matches!(reader.read_u2(), Err(ClassParseError::UnexpectedEof)));
        assert_eq!(reader.read_u1().ok(), Some(0x01));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut reader = ByteReader::new(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(
            reader.expect_magic(),
            Err(ClassParseError::InvalidMagic { found: 0xDEAD_BEEF })
        ));
    }

    #[test]
    fn test_modified_utf8_nul_and_surrogates() {
        // "a\0b" with a two-byte NUL
        assert_eq!(decode_modified_utf8(&[0x61, 0xC0, 0x80, 0x62]), "a\0b");
        // U+1F600 encoded as a surrogate pair (ED A0 BD ED B8 80)
        assert_eq!(
            decode_modified_utf8(&[0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]),
            "\u{1F600}"
        );
        assert_eq!(decode_modified_utf8(b"java/lang/Object"), "java/lang/Object");
    }

    #[test]
    fn test_wide_constants_take_two_slots() -> Result<(), ClassParseError> {
        // count = 4: #1 Long (occupies #1 and #2), #3 Utf8 "x"
        let bytes = [
            0x00, 0x04, // count
            0x05, 0, 0, 0, 0, 0, 0, 0, 42, // Long
            0x01, 0x00, 0x01, b'x', // Utf8
        ];
        let mut reader = ByteReader::new(&bytes);
        let pool = ConstantPool::parse(&mut reader)?;
        assert_eq!(pool.utf8(3)?, "x");
        assert!(pool.utf8(2).is_err());
        assert!(pool.utf8(9).is_err());
        Ok(())
    }
}
