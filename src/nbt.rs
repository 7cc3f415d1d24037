//! Narrow adapter between raw NBT bytes and the named fields a schematic is built from.
//!
//! The schematic parser only ever sees a [`FieldMap`], so it can be driven by synthetic maps
//! in tests and by any decoder implementing [`TagDecoder`] in production.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use quartz_nbt::io::Flavor;
use quartz_nbt::{NbtCompound, NbtList, NbtTag};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Cause attached to a failed decode.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level fields of a decoded document, by name.
pub type FieldMap = HashMap<String, NbtValue>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NbtValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Byte(i8),
    Short(i16),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    ByteArray(Vec<i8>),
    List(Vec<NbtValue>),
    Compound(HashMap<String, NbtValue>),
}

impl NbtValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            NbtValue::String(_) => "String",
            NbtValue::Int(_) => "Int",
            NbtValue::Long(_) => "Long",
            NbtValue::Float(_) => "Float",
            NbtValue::Double(_) => "Double",
            NbtValue::Byte(_) => "Byte",
            NbtValue::Short(_) => "Short",
            NbtValue::IntArray(_) => "IntArray",
            NbtValue::LongArray(_) => "LongArray",
            NbtValue::ByteArray(_) => "ByteArray",
            NbtValue::List(_) => "List",
            NbtValue::Compound(_) => "Compound",
        }
    }

    /// Widened value of any integral tag.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NbtValue::Byte(b) => Some(*b as i64),
            NbtValue::Short(s) => Some(*s as i64),
            NbtValue::Int(i) => Some(*i as i64),
            NbtValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NbtValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Byte arrays are signed on the wire; block ids and metadata are unsigned.
    pub fn to_unsigned_bytes(&self) -> Option<Vec<u8>> {
        match self {
            NbtValue::ByteArray(arr) => Some(arr.iter().map(|&b| b as u8).collect()),
            _ => None,
        }
    }

    pub fn from_unsigned_bytes(bytes: &[u8]) -> Self {
        NbtValue::ByteArray(bytes.iter().map(|&b| b as i8).collect())
    }

    pub fn from_tag(tag: &NbtTag) -> Self {
        match tag {
            NbtTag::String(s) => NbtValue::String(s.clone()),
            NbtTag::Int(i) => NbtValue::Int(*i),
            NbtTag::Long(l) => NbtValue::Long(*l),
            NbtTag::Float(f) => NbtValue::Float(*f),
            NbtTag::Double(d) => NbtValue::Double(*d),
            NbtTag::Byte(b) => NbtValue::Byte(*b),
            NbtTag::Short(s) => NbtValue::Short(*s),
            NbtTag::IntArray(arr) => NbtValue::IntArray(arr.clone()),
            NbtTag::LongArray(arr) => NbtValue::LongArray(arr.clone()),
            NbtTag::ByteArray(arr) => NbtValue::ByteArray(arr.clone()),
            NbtTag::List(list) => NbtValue::List(list.iter().map(Self::from_tag).collect()),
            NbtTag::Compound(compound) => NbtValue::Compound(fields_of(compound)),
        }
    }

    pub fn to_tag(&self) -> NbtTag {
        match self {
            NbtValue::String(s) => NbtTag::String(s.clone()),
            NbtValue::Int(i) => NbtTag::Int(*i),
            NbtValue::Long(l) => NbtTag::Long(*l),
            NbtValue::Float(f) => NbtTag::Float(*f),
            NbtValue::Double(d) => NbtTag::Double(*d),
            NbtValue::Byte(b) => NbtTag::Byte(*b),
            NbtValue::Short(s) => NbtTag::Short(*s),
            NbtValue::IntArray(arr) => NbtTag::IntArray(arr.clone()),
            NbtValue::LongArray(arr) => NbtTag::LongArray(arr.clone()),
            NbtValue::ByteArray(arr) => NbtTag::ByteArray(arr.clone()),
            NbtValue::List(list) => {
                let tags: Vec<NbtTag> = list.iter().map(NbtValue::to_tag).collect();
                NbtTag::List(NbtList::from(tags))
            }
            NbtValue::Compound(map) => NbtTag::Compound(compound_of(map)),
        }
    }
}

fn fields_of(compound: &NbtCompound) -> FieldMap {
    compound
        .inner()
        .iter()
        .map(|(key, value)| (key.clone(), NbtValue::from_tag(value)))
        .collect()
}

fn compound_of(fields: &FieldMap) -> NbtCompound {
    let mut compound = NbtCompound::new();
    for (key, value) in fields {
        compound.insert(key.clone(), value.to_tag());
    }
    compound
}

/// Turns a byte stream into the root compound's fields.
pub trait TagDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<FieldMap, DecodeError>;
}

/// NBT decoder backed by `quartz_nbt`. Accepts gzip-compressed or raw input.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuartzDecoder;

impl TagDecoder for QuartzDecoder {
    fn decode(&self, data: &[u8]) -> Result<FieldMap, DecodeError> {
        let (root, _) = if data.starts_with(&GZIP_MAGIC) {
            let mut gz = GzDecoder::new(data);
            quartz_nbt::io::read_nbt(&mut gz, Flavor::Uncompressed)?
        } else {
            let mut reader: &[u8] = data;
            quartz_nbt::io::read_nbt(&mut reader, Flavor::Uncompressed)?
        };
        Ok(fields_of(&root))
    }
}

/// Writes `fields` as a gzip-compressed root compound named `root_name`.
pub fn encode_fields(fields: &FieldMap, root_name: &str) -> Result<Vec<u8>, DecodeError> {
    let root = compound_of(fields);
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    quartz_nbt::io::write_nbt(&mut encoder, Some(root_name), &root, Flavor::Uncompressed)?;
    Ok(encoder.finish()?)
}

/// Reads every byte from `reader` and decodes it with `decoder`.
pub fn decode_reader<R: Read>(
    decoder: &dyn TagDecoder,
    mut reader: R,
) -> Result<FieldMap, DecodeError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decoder.decode(&data)
}
