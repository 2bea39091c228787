use std::collections::BTreeSet;
use std::io;

use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use roomweave_core::{
    DungeonContent, DungeonGenerator, GenerationConfig, HeadlessHost, HeadlessWorld, NoopObserver,
    RoomType, auto_walk,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_config(rng: &mut ChaCha8Rng) -> GenerationConfig {
    let min_rooms = choose(rng, &[10, 11, 12, 14]);
    GenerationConfig {
        min_rooms,
        max_rooms: min_rooms + choose(rng, &[0, 2, 6]),
        room_spacing: choose(rng, &[0.0, 4.0, 8.0]),
        luck_bonus: choose(rng, &[0.0, 10.0, 40.0]),
        repetition_penalty: choose(rng, &[0.1, 0.5, 2.0]),
        ..GenerationConfig::default()
    }
}

/// Returns the first broken invariant of a finished walk, if any.
fn check_run(generator: &DungeonGenerator) -> Option<String> {
    let graph = generator.graph();
    let config = generator.config();
    let state = generator.state();

    for point in graph.exits() {
        let Some(other) = point.connected_to.and_then(|id| graph.exit(id)) else {
            continue;
        };
        if other.connected_to != Some(point.id) || other.direction != point.direction.opposite() {
            return Some(format!("asymmetric connection at {:?}", point.id));
        }
    }

    let rooms: Vec<_> = graph.rooms().collect();
    for (index, room) in rooms.iter().enumerate() {
        if room.depth as usize != index {
            return Some(format!("room {index} has depth {}", room.depth));
        }
        for other in &rooms[index + 1..] {
            let distance = room.position.distance(other.position);
            if distance < config.min_room_distance {
                return Some(format!("rooms {:?} and {:?} are {distance:.2} apart", room.id, other.id));
            }
        }
    }

    let mut once = BTreeSet::new();
    for room in &rooms {
        if let Some(index) = room.rule
            && generator.rules().rule(index).is_some_and(|rule| rule.generate_once)
            && !once.insert(index)
        {
            return Some(format!("one-shot rule {index:?} generated twice"));
        }
    }

    if state.terminal_placed {
        let bosses = rooms.iter().filter(|room| room.room_type == RoomType::Boss).count();
        if state.mandatory.is_some() && bosses != 1 {
            return Some(format!("completed run has {bosses} boss rooms"));
        }
        if rooms.len() as u32 != state.target_room_count + 1 {
            return Some(format!(
                "{} rooms for a target of {}",
                rooms.len(),
                state.target_room_count
            ));
        }
    }
    None
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    println!("Starting fuzz harness from seed {} for {} runs...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut failures = 0;
    let mut incomplete = 0;

    for run in 0..args.runs {
        let run_seed = rng.next_u64();
        let walk_seed = rng.next_u64();
        let config = random_config(&mut rng);
        let mut generator =
            DungeonGenerator::new(run_seed, config, DungeonContent::build_default())?;
        let mut world = HeadlessWorld::default();
        generator.generate_initial_room(&mut world)?;
        auto_walk(
            &mut generator,
            &mut world,
            &mut HeadlessHost::default(),
            &mut NoopObserver,
            walk_seed,
            1_000,
        );

        if !generator.state().terminal_placed {
            incomplete += 1;
            tracing::debug!(run, run_seed, walk_seed, "run ended before the terminal room");
        }
        if let Some(problem) = check_run(&generator) {
            failures += 1;
            println!("run {run} (seed {run_seed}, walk {walk_seed}): {problem}");
        }
        generator.teardown(&mut world);
        if world.live_instances() != 0 {
            failures += 1;
            println!("run {run} (seed {run_seed}): rooms left alive after teardown");
        }
    }

    println!("{} runs, {failures} invariant failures, {incomplete} incomplete", args.runs);
    if failures > 0 {
        bail!("{failures} runs broke an invariant");
    }
    Ok(())
}
