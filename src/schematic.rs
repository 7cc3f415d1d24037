//! MCEdit `.schematic` documents.
//!
//! A document is built from the decoded root fields in two steps: every recognized field is
//! pulled out, then the whole set is validated. Nothing is returned unless validation passes,
//! so a caller never holds a document with only some of its fields populated.

use crate::block_state::BlockState;
use crate::error::ValidationError;
use crate::nbt::{FieldMap, NbtValue};
use crate::volume::Dimensions;
use serde::{Deserialize, Serialize};

pub const WIDTH: &str = "Width";
pub const HEIGHT: &str = "Height";
pub const LENGTH: &str = "Length";
pub const MATERIALS: &str = "Materials";
pub const BLOCKS: &str = "Blocks";
pub const DATA: &str = "Data";
pub const ENTITIES: &str = "Entities";
pub const TILE_ENTITIES: &str = "TileEntities";

/// Root compound name written by MCEdit.
pub const ROOT_NAME: &str = "Schematic";

/// Dimensions and level dialect of a schematic, without its block arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicHeader {
    pub name: String,
    pub dimensions: Dimensions,
    /// Level format the ids refer to, `Alpha` or `Classic`.
    pub materials: String,
}

impl SchematicHeader {
    pub fn from_fields(name: impl Into<String>, fields: &FieldMap) -> Result<Self, ValidationError> {
        let raw = RawFields::extract(fields, true)?;
        raw.into_header(name.into())
    }

    pub fn volume(&self) -> usize {
        self.dimensions.volume()
    }
}

/// A fully validated schematic: both arrays hold exactly `width * height * length` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicDocument {
    header: SchematicHeader,
    blocks: Vec<u8>,
    data: Vec<u8>,
}

impl SchematicDocument {
    pub fn new(
        name: impl Into<String>,
        dimensions: Dimensions,
        materials: impl Into<String>,
        blocks: Vec<u8>,
        data: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let raw = RawFields {
            width: Some(dimensions.width as i64),
            height: Some(dimensions.height as i64),
            length: Some(dimensions.length as i64),
            materials: Some(materials.into()),
            blocks: Some(blocks),
            data: Some(data),
        };
        raw.into_document(name.into())
    }

    pub fn from_fields(name: impl Into<String>, fields: &FieldMap) -> Result<Self, ValidationError> {
        let raw = RawFields::extract(fields, false)?;
        raw.into_document(name.into())
    }

    pub fn header(&self) -> &SchematicHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn dimensions(&self) -> Dimensions {
        self.header.dimensions
    }

    pub fn materials(&self) -> &str {
        &self.header.materials
    }

    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn volume(&self) -> usize {
        self.blocks.len()
    }

    #[inline(always)]
    pub fn block_at_index(&self, index: usize) -> BlockState {
        BlockState {
            id: self.blocks[index],
            meta: self.data[index],
        }
    }

    /// Block at a local offset, `None` outside the volume.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockState> {
        let dims = self.header.dimensions;
        let inside = (0..dims.width).contains(&x)
            && (0..dims.height).contains(&y)
            && (0..dims.length).contains(&z);
        inside.then(|| self.block_at_index(dims.index(x, y, z)))
    }

    /// Root fields in MCEdit layout, ready for [`crate::nbt::encode_fields`].
    pub fn to_fields(&self) -> FieldMap {
        let dims = self.header.dimensions;
        let mut fields = FieldMap::new();
        fields.insert(WIDTH.to_string(), dimension_tag(dims.width));
        fields.insert(HEIGHT.to_string(), dimension_tag(dims.height));
        fields.insert(LENGTH.to_string(), dimension_tag(dims.length));
        fields.insert(
            MATERIALS.to_string(),
            NbtValue::String(self.header.materials.clone()),
        );
        fields.insert(BLOCKS.to_string(), NbtValue::from_unsigned_bytes(&self.blocks));
        fields.insert(DATA.to_string(), NbtValue::from_unsigned_bytes(&self.data));
        fields.insert(ENTITIES.to_string(), NbtValue::List(Vec::new()));
        fields.insert(TILE_ENTITIES.to_string(), NbtValue::List(Vec::new()));
        fields
    }
}

#[derive(Default)]
struct RawFields {
    width: Option<i64>,
    height: Option<i64>,
    length: Option<i64>,
    materials: Option<String>,
    blocks: Option<Vec<u8>>,
    data: Option<Vec<u8>>,
}

impl RawFields {
    fn extract(fields: &FieldMap, header_only: bool) -> Result<Self, ValidationError> {
        let mut raw = RawFields::default();
        for (key, value) in fields {
            match key.as_str() {
                WIDTH => raw.width = Some(integer(WIDTH, value)?),
                HEIGHT => raw.height = Some(integer(HEIGHT, value)?),
                LENGTH => raw.length = Some(integer(LENGTH, value)?),
                MATERIALS => raw.materials = Some(string(MATERIALS, value)?),
                BLOCKS if !header_only => raw.blocks = Some(bytes(BLOCKS, value)?),
                DATA if !header_only => raw.data = Some(bytes(DATA, value)?),
                // Entities are not placed.
                ENTITIES | TILE_ENTITIES => {}
                _ => {}
            }
        }
        Ok(raw)
    }

    fn into_header(self, name: String) -> Result<SchematicHeader, ValidationError> {
        let width = dimension(WIDTH, self.width)?;
        let height = dimension(HEIGHT, self.height)?;
        let length = dimension(LENGTH, self.length)?;
        let materials = match self.materials {
            Some(m) if !m.is_empty() => m,
            _ => return Err(ValidationError::MissingField(MATERIALS)),
        };
        let dimensions = Dimensions::new(width, height, length);
        if dimensions.checked_volume().is_none() {
            return Err(ValidationError::VolumeOverflow {
                width,
                height,
                length,
            });
        }
        Ok(SchematicHeader {
            name,
            dimensions,
            materials,
        })
    }

    fn into_document(mut self, name: String) -> Result<SchematicDocument, ValidationError> {
        let blocks = self.blocks.take();
        let data = self.data.take();
        let header = self.into_header(name)?;
        let volume = header.volume();
        let blocks = sized(BLOCKS, blocks, volume)?;
        let data = sized(DATA, data, volume)?;
        Ok(SchematicDocument {
            header,
            blocks,
            data,
        })
    }
}

fn integer(field: &'static str, value: &NbtValue) -> Result<i64, ValidationError> {
    value.as_integer().ok_or(ValidationError::WrongType {
        field,
        expected: "integer",
        found: value.type_name(),
    })
}

fn string(field: &'static str, value: &NbtValue) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(ValidationError::WrongType {
            field,
            expected: "String",
            found: value.type_name(),
        })
}

fn bytes(field: &'static str, value: &NbtValue) -> Result<Vec<u8>, ValidationError> {
    value.to_unsigned_bytes().ok_or(ValidationError::WrongType {
        field,
        expected: "ByteArray",
        found: value.type_name(),
    })
}

fn dimension(field: &'static str, value: Option<i64>) -> Result<i32, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if value <= 0 {
        return Err(ValidationError::OutOfRange { field, value });
    }
    i32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

/// MCEdit stores extents as shorts; larger volumes fall back to ints.
fn dimension_tag(value: i32) -> NbtValue {
    i16::try_from(value)
        .map(NbtValue::Short)
        .unwrap_or(NbtValue::Int(value))
}

fn sized(field: &'static str, array: Option<Vec<u8>>, expected: usize) -> Result<Vec<u8>, ValidationError> {
    let array = array.ok_or(ValidationError::MissingField(field))?;
    if array.len() != expected {
        return Err(ValidationError::LengthMismatch {
            field,
            expected,
            actual: array.len(),
        });
    }
    Ok(array)
}
