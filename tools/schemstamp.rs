//! Operator tool: inspect a schematic directory and dry-run placements in an in-memory world.
//!
//! Usage:
//!   schemstamp [--config PATH] list [PAGE]
//!   schemstamp [--config PATH] info NAME
//!   schemstamp [--config PATH] place NAME [x|z|xz] [--at X Y Z] [--undo]

use schemstamp::{
    ActorId, BlockPosition, ChunkPos, Invocation, PendingActions, SchematicCommands, SchematicsConfig,
    SparseWorld, WorldAccess,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: schemstamp [--config PATH] <list [PAGE] | info NAME | place NAME [x|z|xz] [--at X Y Z] [--undo]>";

struct Args {
    config: Option<String>,
    origin: BlockPosition,
    undo: bool,
    tokens: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        origin: BlockPosition::new(0, 64, 0),
        undo: false,
        tokens: Vec::new(),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(iter.next().ok_or("--config needs a path")?);
            }
            "--at" => {
                let mut coord = || -> Result<i32, String> {
                    iter.next()
                        .ok_or("--at needs three coordinates")?
                        .parse::<i32>()
                        .map_err(|e| format!("bad coordinate: {}", e))
                };
                args.origin = BlockPosition::new(coord()?, coord()?, coord()?);
            }
            "--undo" => args.undo = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => args.tokens.push(arg),
        }
    }
    if args.tokens.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(args)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let config = match &args.config {
        Some(path) => match SchematicsConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(2);
            }
        },
        None => SchematicsConfig::default(),
    };

    let pending = Arc::new(PendingActions::new());
    let commands = SchematicCommands::from_config(&config, Arc::clone(&pending));

    // Load a generous area around the origin so most schematics fit.
    let mut world = SparseWorld::with_settings(&config.world);
    let center = world.chunk_of(args.origin);
    let reach = 8;
    world.load_area(
        ChunkPos::new(center.x - reach, center.z - reach),
        ChunkPos::new(center.x + reach, center.z + reach),
    );

    let actor = ActorId::from("console");
    let invocation = Invocation {
        actor: &actor,
        position: args.origin,
    };
    let tokens: Vec<&str> = args.tokens.iter().map(String::as_str).collect();

    let mut failed = false;
    match commands.dispatch(&invocation, &tokens, &mut world) {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            println!("{}", e);
            failed = true;
        }
    }

    if args.undo && !failed {
        match commands.undo(&actor, &mut world) {
            Ok(reply) => println!("{}", reply),
            Err(e) => {
                println!("{}", e);
                failed = true;
            }
        }
    }

    std::process::exit(if failed { 1 } else { 0 });
}
