//! Load MCEdit `.schematic` files and stamp them onto a chunk-partitioned world,
//! keeping enough of the overwritten state to undo the placement.

pub mod block_position;
pub mod block_state;
pub mod commands;
pub mod config;
pub mod error;
pub mod library;
pub mod nbt;
pub mod pending;
pub mod placement;
pub mod schematic;
pub mod volume;
pub mod world;

pub use block_position::{BlockPosition, ChunkPos};
pub use block_state::BlockState;
pub use commands::{CommandReply, Invocation, SchematicCommands};
pub use config::SchematicsConfig;
pub use error::{CommandError, ListError, LoadError, PlaceError, ValidationError};
pub use library::{Page, SchematicLibrary};
pub use nbt::{FieldMap, NbtValue, QuartzDecoder, TagDecoder};
pub use pending::{ActorId, PendingActions, SessionEnd};
pub use placement::{place, undo, PlacementSnapshot};
pub use schematic::{SchematicDocument, SchematicHeader};
pub use volume::{Dimensions, Rotation};
pub use world::{SparseWorld, WorldAccess};
