//! The `/schematic` command: `list`, `place`, `info` and `undo`.
//!
//! Input arrives already tokenized and permission-checked. Replies are structured; their
//! `Display` output is the chat text sent back to the player.

use crate::block_position::BlockPosition;
use crate::config::SchematicsConfig;
use crate::error::{CommandError, ListError, LoadError};
use crate::library::{Page, SchematicLibrary};
use crate::pending::{ActorId, PendingActions};
use crate::placement;
use crate::schematic::SchematicHeader;
use crate::volume::Rotation;
use crate::world::WorldAccess;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

pub const SUBCOMMANDS: [&str; 4] = ["list", "place", "info", "undo"];

const HELP: [&str; 4] = [
    "/schematic list [pageNumber] - display a list of available schematics",
    "/schematic place <schematic name> [x|z|xz] - place the specified schematic at current position and rotate it by X, Z or X & Z axis (optional)",
    "/schematic info <schematic name> - display the info about specified schematic",
    "/schematic undo - revert the changes made by the last schematic",
];

/// Who is running the command and where they stand.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub actor: &'a ActorId,
    pub position: BlockPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Help,
    Listing(Page),
    Placed { name: String, blocks: usize },
    Info(SchematicHeader),
    Reverted { blocks: usize },
}

impl CommandReply {
    pub fn lines(&self) -> Vec<String> {
        match self {
            CommandReply::Help => HELP.iter().map(|s| s.to_string()).collect(),
            CommandReply::Listing(page) => {
                let mut lines = Vec::with_capacity(page.entries.len() + 1);
                lines.push(format!("Schematics [{}/{}]:", page.number, page.total_pages));
                for (position, name) in &page.entries {
                    lines.push(format!("{}: {}", position, name));
                }
                lines
            }
            CommandReply::Placed { name, blocks } => {
                vec![format!("Schematic {} ({} blocks) has been placed", name, blocks)]
            }
            CommandReply::Info(header) => {
                let dims = header.dimensions;
                vec![format!(
                    "Width(X) x Height(Y) x Length(Z): {} x {} x {} ({} blocks)",
                    dims.width,
                    dims.height,
                    dims.length,
                    header.volume()
                )]
            }
            CommandReply::Reverted { blocks } => vec![format!(
                "Schematic placement has been successfully reverted ({} blocks)",
                blocks
            )],
        }
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

pub struct SchematicCommands {
    library: SchematicLibrary,
    pending: Arc<PendingActions>,
    page_size: usize,
}

impl SchematicCommands {
    pub fn new(library: SchematicLibrary, pending: Arc<PendingActions>, page_size: usize) -> Self {
        SchematicCommands {
            library,
            pending,
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(config: &SchematicsConfig, pending: Arc<PendingActions>) -> Self {
        SchematicCommands::new(
            SchematicLibrary::from_config(config),
            pending,
            config.page_size,
        )
    }

    pub fn library(&self) -> &SchematicLibrary {
        &self.library
    }

    pub fn pending(&self) -> &Arc<PendingActions> {
        &self.pending
    }

    pub fn help(&self) -> CommandReply {
        CommandReply::Help
    }

    /// Sub-commands starting with `partial`. Nothing is offered once an argument is being typed.
    pub fn autocomplete(&self, partial: &str) -> Vec<&'static str> {
        let trimmed = partial.trim();
        if trimmed.is_empty() {
            return SUBCOMMANDS.to_vec();
        }
        if partial.trim_start().contains(' ') {
            return Vec::new();
        }
        let lower = trimmed.to_ascii_lowercase();
        SUBCOMMANDS
            .iter()
            .copied()
            .filter(|cmd| cmd.starts_with(&lower))
            .collect()
    }

    /// Routes a tokenized `/schematic` invocation. Unknown or incomplete input yields the help text.
    pub fn dispatch<W: WorldAccess + ?Sized>(
        &self,
        invocation: &Invocation<'_>,
        tokens: &[&str],
        world: &mut W,
    ) -> Result<CommandReply, CommandError> {
        let Some(first) = tokens.first() else {
            return Ok(self.help());
        };
        match first.trim().to_ascii_lowercase().as_str() {
            "list" => {
                let page = tokens
                    .get(1)
                    .and_then(|t| t.trim().parse::<u32>().ok())
                    .unwrap_or(1);
                self.list(page)
            }
            "place" if tokens.len() >= 2 => {
                let rotation = match tokens.get(2) {
                    Some(token) => token
                        .parse::<Rotation>()
                        .map_err(|e| CommandError::UnknownRotation(e.0))?,
                    None => Rotation::None,
                };
                self.place(
                    invocation.actor,
                    tokens[1],
                    rotation,
                    invocation.position,
                    world,
                )
            }
            "info" if tokens.len() >= 2 => self.info(tokens[1]),
            "undo" => self.undo(invocation.actor, world),
            _ => Ok(self.help()),
        }
    }

    pub fn list(&self, page: u32) -> Result<CommandReply, CommandError> {
        let page = self.library.page(page, self.page_size).map_err(|err| {
            if matches!(err, ListError::Io(_)) {
                warn!(root = %self.library.root().display(), error = %error_chain(&err), "Error listing schematics");
            }
            CommandError::from(err)
        })?;
        Ok(CommandReply::Listing(page))
    }

    pub fn info(&self, name: &str) -> Result<CommandReply, CommandError> {
        let header = self.library.load_header(name).map_err(log_load_failure)?;
        Ok(CommandReply::Info(header))
    }

    /// Stamps `name` at `origin` and makes it the actor's pending undo.
    pub fn place<W: WorldAccess + ?Sized>(
        &self,
        actor: &ActorId,
        name: &str,
        rotation: Rotation,
        origin: BlockPosition,
        world: &mut W,
    ) -> Result<CommandReply, CommandError> {
        let document = self.library.load(name).map_err(log_load_failure)?;
        let snapshot = placement::place(&document, origin, rotation, world)
            .map_err(CommandError::PlaceRegionNotReady)?;
        let blocks = snapshot.volume();
        self.pending.put(actor.clone(), snapshot);

        info!(actor = %actor, schematic = name, origin = %origin, rotation = %rotation, blocks, "Schematic placed");
        Ok(CommandReply::Placed {
            name: document.name().to_string(),
            blocks,
        })
    }

    /// Reverts the actor's pending placement.
    ///
    /// The snapshot stays in the store until the revert has succeeded, so a failed undo leaves it
    /// pending and a session ending meanwhile still discards it.
    pub fn undo<W: WorldAccess + ?Sized>(
        &self,
        actor: &ActorId,
        world: &mut W,
    ) -> Result<CommandReply, CommandError> {
        let snapshot = self
            .pending
            .get(actor)
            .ok_or(CommandError::NoPendingAction)?;
        let blocks =
            placement::undo(&snapshot, world).map_err(CommandError::UndoRegionNotReady)?;
        self.pending.remove_if_current(actor, &snapshot);

        info!(actor = %actor, blocks, "Schematic placement reverted");
        Ok(CommandReply::Reverted { blocks })
    }
}

fn log_load_failure(err: LoadError) -> CommandError {
    if !matches!(err, LoadError::NotFound { .. }) {
        warn!(schematic = err.name(), error = %error_chain(&err), "Error loading schematic file");
    }
    err.into()
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
