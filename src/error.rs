use crate::block_position::BlockPosition;
use crate::nbt::DecodeError;

/// Why a decoded field set was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be between 1 and {}, got {value}", i32::MAX)]
    OutOfRange { field: &'static str, value: i64 },
    #[error("field `{field}` has type {found}, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field `{field}` holds {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("volume {width} x {height} x {length} is too large")]
    VolumeOverflow { width: i32, height: i32, length: i32 },
}

/// Failure to obtain a schematic by name.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("schematic `{name}` not found")]
    NotFound { name: String },
    #[error("`{name}` is not a valid schematic name")]
    InvalidName { name: String },
    #[error("error loading schematic file {name}")]
    CorruptFormat {
        name: String,
        #[source]
        source: DecodeError,
    },
    #[error("schematic `{name}` is invalid: {reason}")]
    Invalid {
        name: String,
        #[source]
        reason: ValidationError,
    },
    #[error("could not read schematic `{name}`")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn name(&self) -> &str {
        match self {
            LoadError::NotFound { name }
            | LoadError::InvalidName { name }
            | LoadError::CorruptFormat { name, .. }
            | LoadError::Invalid { name, .. }
            | LoadError::Io { name, .. } => name,
        }
    }
}

/// The destination was not fully loaded, so nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error(
        "region at {origin} spanning {signed_width} x {height} x {signed_length} is not resident"
    )]
    RegionNotReady {
        origin: BlockPosition,
        signed_width: i32,
        height: i32,
        signed_length: i32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("Schematics not found")]
    Empty,
    #[error("page {requested} is out of range (1..={total})")]
    PageOutOfRange { requested: u32, total: u32 },
    #[error("could not list schematics")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced to the player by the command layer. `Display` is the chat message.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Schematic file is not found: {0}")]
    NotFound(String),
    #[error("Can not load schematic file")]
    Load(#[source] LoadError),
    #[error("{}", list_message(.0))]
    List(#[source] ListError),
    #[error("The schematic is too big - required chunks are not loaded/created yet")]
    PlaceRegionNotReady(#[source] PlaceError),
    #[error("Can not revert the changes - required chunks are not loaded")]
    UndoRegionNotReady(#[source] PlaceError),
    #[error("No changes were made by you")]
    NoPendingAction,
    #[error("Unknown rotation: {0} (expected x, z or xz)")]
    UnknownRotation(String),
}

fn list_message(err: &ListError) -> String {
    match err {
        ListError::PageOutOfRange { total: 1, .. } => "Only page is available".to_string(),
        ListError::PageOutOfRange { total, .. } => {
            format!("Please specify the page number between 1 and {}", total)
        }
        ListError::Empty | ListError::Io(_) => "Schematics not found".to_string(),
    }
}

impl From<LoadError> for CommandError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound { name } => CommandError::NotFound(name),
            other => CommandError::Load(other),
        }
    }
}

impl From<ListError> for CommandError {
    fn from(err: ListError) -> Self {
        CommandError::List(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
