use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roomweave_core::{
    DungeonContent, DungeonGenerator, GenerationConfig, HeadlessHost, HeadlessWorld, NoopObserver,
    RunSummary, auto_walk,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate and walk a dungeon run headlessly", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Generation tuning in TOML; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Layouts, rules and combat buckets in TOML; built-in content when omitted
    #[arg(long)]
    content: Option<PathBuf>,
    /// Seed for the random exit choices of the walker; defaults to the run seed
    #[arg(long)]
    walk_seed: Option<u64>,
    #[arg(long, default_value_t = 500)]
    max_crossings: u32,
    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
    /// Print the built-in content as TOML and exit
    #[arg(long)]
    dump_content: bool,
    /// Raise log verbosity; repeat for more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if args.dump_content {
        let text = toml::to_string_pretty(&DungeonContent::build_default())
            .context("Failed to serialize built-in content")?;
        println!("{text}");
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    let content = match &args.content {
        Some(path) => DungeonContent::load(path)
            .with_context(|| format!("Failed to load content: {}", path.display()))?,
        None => DungeonContent::build_default(),
    };

    tracing::debug!(seed = args.seed, walk_seed = ?args.walk_seed, "starting headless run");
    let mut generator = DungeonGenerator::new(args.seed, config, content)
        .context("Generation inputs are invalid")?;
    let mut world = HeadlessWorld::default();
    generator.generate_initial_room(&mut world).context("Start room could not be placed")?;

    let mut host = HeadlessHost::default();
    let report = auto_walk(
        &mut generator,
        &mut world,
        &mut host,
        &mut NoopObserver,
        args.walk_seed.unwrap_or(args.seed),
        args.max_crossings,
    );
    let summary = generator.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
        println!(
            "Walk: {} crossings, {} rooms placed, {} failed exits, {} enemies spawned",
            report.crossings,
            report.rooms_placed,
            report.failed_exits.len(),
            host.enemies_spawned
        );
    }

    generator.teardown(&mut world);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Seed: {}", summary.seed);
    println!("Target rooms: {}", summary.target_room_count);
    println!("Complete: {}", summary.complete);
    if let Some(slot) = summary.mandatory {
        println!(
            "Mandatory: {:?} planned at depth {} (placed: {})",
            slot.room_type, slot.depth, slot.placed
        );
    }
    for room in &summary.rooms {
        println!(
            "  [{:>2}] {:<9} {:<18} at ({:>6.1}, {:>6.1})  waves {} enemies {}",
            room.depth,
            format!("{:?}", room.room_type),
            room.layout,
            room.position.x,
            room.position.y,
            room.waves,
            room.enemies
        );
    }
    println!("Open exits: {}  Stuck exits: {}", summary.open_exits, summary.stuck_exits);
    println!("Fingerprint: {:016x}", summary.fingerprint);
}
