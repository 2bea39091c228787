//! Run orchestration: plans the run, places the start room, and grows the
//! graph one exit at a time as the player crosses armed exits.
//! This module exists to sequence selection, placement and commitment.
//! It does not own in-room pacing or how rooms are drawn.

use crate::catalog::RoomCatalog;
use crate::combat::CombatContentGenerator;
use crate::config::GenerationConfig;
use crate::content::{ContentParts, DungeonContent};
use crate::error::{ConfigError, GenerationError};
use crate::graph::{PlacementPlan, RoomGraph, RoomStamp};
use crate::progression::ProgressionRuleSet;
use crate::rng::{GenRng, mix_seed_stream};
use crate::selector::{Selection, SelectionContext, SelectionSource, WeightedSelector};
use crate::state::{GenerationState, MandatorySlot};
use crate::transition::{RoomTransition, TransitionSetup};
use crate::types::{ExitId, LayoutId, RoomId, RoomType};
use crate::world::{RoomWorld, RunObserver};

/// How far inside the entrance door the player is teleported.
const ARRIVAL_INSET: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorPhase {
    /// Planned, waiting for the start room.
    InitialRoom,
    Expanding,
    /// The terminal room is placed; no further rooms are generated.
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    AlreadyConnected,
    TriggerNotArmed,
    RunComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionOutcome {
    Placed { room: RoomId, room_type: RoomType, depth: u32, attempts: u32 },
    Terminal { room: RoomId, attempts: u32 },
    Ignored(IgnoreReason),
}

pub struct DungeonGenerator {
    seed: u64,
    config: GenerationConfig,
    catalog: RoomCatalog,
    start_layout: LayoutId,
    rules: ProgressionRuleSet,
    combat: CombatContentGenerator,
    graph: RoomGraph,
    state: GenerationState,
    rng: GenRng,
    phase: GeneratorPhase,
}

impl DungeonGenerator {
    /// Validates the inputs and plans the run: the target room count and the
    /// depth of the mandatory room are fixed here.
    pub fn new(
        seed: u64,
        config: GenerationConfig,
        content: DungeonContent,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        content.validate()?;
        let ContentParts { catalog, start_layout, rules, combat } = content.into_parts();
        let mut rng = GenRng::from_seed(seed);
        let state = plan_run(&config, &rules, &mut rng);
        tracing::info!(
            seed,
            target_rooms = state.target_room_count,
            mandatory = ?state.mandatory.map(|slot| (slot.room_type, slot.depth)),
            "run planned"
        );
        Ok(Self {
            seed,
            config,
            catalog,
            start_layout,
            rules,
            combat,
            graph: RoomGraph::new(),
            state,
            rng,
            phase: GeneratorPhase::InitialRoom,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &ProgressionRuleSet {
        &self.rules
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.phase
    }

    pub fn generate_initial_room(
        &mut self,
        world: &mut impl RoomWorld,
    ) -> Result<RoomId, GenerationError> {
        if self.phase != GeneratorPhase::InitialRoom {
            return Err(GenerationError::AlreadyStarted);
        }
        let layout = self
            .catalog
            .layout(self.start_layout)
            .ok_or(GenerationError::UnknownLayout(self.start_layout))?;
        let room = self.graph.place_start(layout, world);
        self.state.regular_rooms = 1;
        self.phase = GeneratorPhase::Expanding;
        tracing::info!(?room, layout = %layout.name, "start room placed");
        Ok(room)
    }

    /// Handles the player reaching `exit`. Only armed, unconnected exits
    /// expand; everything else is reported as ignored.
    pub fn on_player_crossed_exit(
        &mut self,
        exit: ExitId,
        world: &mut impl RoomWorld,
        observer: &mut impl RunObserver,
    ) -> Result<ExpansionOutcome, GenerationError> {
        match self.phase {
            GeneratorPhase::InitialRoom => return Err(GenerationError::NotStarted),
            GeneratorPhase::Complete => {
                tracing::debug!(?exit, "run complete; exit crossing ignored");
                return Ok(ExpansionOutcome::Ignored(IgnoreReason::RunComplete));
            }
            GeneratorPhase::Expanding => {}
        }

        let point = self.graph.exit(exit).ok_or(GenerationError::UnknownExit(exit))?;
        if point.is_connected() {
            return Ok(ExpansionOutcome::Ignored(IgnoreReason::AlreadyConnected));
        }
        if !point.armed {
            return Ok(ExpansionOutcome::Ignored(IgnoreReason::TriggerNotArmed));
        }

        let result = if self.state.target_reached() {
            self.place_terminal(exit, world)
        } else {
            self.expand(exit, world)
        };
        if let Err(error) = &result {
            tracing::error!(?exit, %error, "expansion failed; exit stays open");
            if !self.state.stuck_exits.contains(&exit) {
                self.state.stuck_exits.push(exit);
            }
            observer.expansion_failed(error);
        }
        result
    }

    /// Read-only preview of the room type behind `exit`. Connected exits
    /// report the actual neighbor. For open exits the draw runs on a copy of
    /// the random stream, so it matches the real expansion when that exit is
    /// the next one crossed.
    pub fn predict_next_room_type(&self, exit: ExitId) -> Option<RoomType> {
        let point = self.graph.exit(exit)?;
        if let Some(neighbor) = point.connected_to {
            let room = self.graph.exit(neighbor)?.room;
            return self.graph.room(room).map(|placed| placed.room_type);
        }
        if self.phase != GeneratorPhase::Expanding {
            return None;
        }
        if self.state.target_reached() {
            return Some(RoomType::Terminal);
        }
        let previous = self.graph.room(point.room)?.room_type;
        let mut rng = self.rng.clone();
        selector(&self.catalog, &self.rules, &self.state, &self.config)
            .pick_room_type(previous, self.state.next_depth(), &mut rng)
            .map(|pick| pick.room_type)
    }

    /// Builds the in-room sequence for `room`. Each room gets its own random
    /// stream derived from the run seed, so pacing never shifts generation.
    pub fn begin_transition(&self, room: RoomId) -> Result<RoomTransition, GenerationError> {
        let placed = self.graph.room(room).ok_or(GenerationError::UnknownRoom(room))?;
        let layout =
            self.catalog.layout(placed.layout).ok_or(GenerationError::UnknownLayout(placed.layout))?;
        let arrival = match (placed.entrance, placed.entered_from) {
            (Some(entrance), Some(side)) => self
                .graph
                .exit_world_position(entrance)
                .map(|door| door - side.unit() * ARRIVAL_INSET)
                .unwrap_or(placed.position),
            _ => placed.position,
        };
        let sequence = self.graph.rooms().position(|other| other.id == room).unwrap_or_default();
        let spawn_volumes = layout
            .spawn_volumes
            .iter()
            .map(|volume| {
                let mut world_volume = *volume;
                world_volume.center = placed.position + volume.center;
                world_volume
            })
            .collect();

        Ok(RoomTransition::new(TransitionSetup {
            room,
            room_type: placed.room_type,
            origin: placed.position,
            arrival,
            spawn_volumes,
            combat: placed.combat.clone(),
            timings: self.config.transition,
            rng: GenRng::from_seed(mix_seed_stream(self.seed, sequence as u64 + 1)),
        }))
    }

    /// Arms the room's remaining open exits once its sequence has finished.
    pub fn complete_room(&mut self, room: RoomId) -> Result<usize, GenerationError> {
        if self.graph.room(room).is_none() {
            return Err(GenerationError::UnknownRoom(room));
        }
        let armed = self.graph.arm_exits(room);
        tracing::debug!(?room, armed, "room completed; exits armed");
        Ok(armed)
    }

    /// Destroys every instantiated room and ends the run.
    pub fn teardown(self, world: &mut impl RoomWorld) {
        let handles = self.graph.room_handles();
        let rooms = handles.len();
        for handle in handles {
            world.destroy_room(handle);
        }
        tracing::info!(seed = self.seed, rooms, "run torn down");
    }

    fn expand(
        &mut self,
        exit: ExitId,
        world: &mut impl RoomWorld,
    ) -> Result<ExpansionOutcome, GenerationError> {
        let from_room = self.graph.exit(exit).ok_or(GenerationError::UnknownExit(exit))?.room;
        let previous =
            self.graph.room(from_room).ok_or(GenerationError::UnknownRoom(from_room))?.room_type;
        let depth = self.state.next_depth();
        let attempts = self.config.max_room_attempts;

        for attempt in 1..=attempts {
            let selection = selector(&self.catalog, &self.rules, &self.state, &self.config)
                .select_next(previous, depth, &mut self.rng);
            let Some(selection) = selection else {
                tracing::debug!(attempt, depth, ?previous, "no room type could be selected");
                continue;
            };
            match self.graph.plan_placement(
                &self.catalog,
                selection.layout,
                exit,
                self.config.room_spacing,
                self.config.min_room_distance,
                &mut self.rng,
            ) {
                Ok(plan) => {
                    let room = self.commit_selection(&plan, selection, depth, world)?;
                    return Ok(ExpansionOutcome::Placed {
                        room,
                        room_type: selection.room_type,
                        depth,
                        attempts: attempt,
                    });
                }
                Err(reason) => {
                    tracing::debug!(attempt, room_type = ?selection.room_type, %reason, "candidate rejected");
                }
            }
        }
        Err(GenerationError::AttemptsExhausted { exit, attempts })
    }

    /// Applies every side effect of a successful selection: weights, one-shot
    /// consumption, the mandatory slot, combat content and the room itself.
    fn commit_selection(
        &mut self,
        plan: &PlacementPlan,
        selection: Selection,
        depth: u32,
        world: &mut impl RoomWorld,
    ) -> Result<RoomId, GenerationError> {
        let rule = selection.rule.and_then(|index| self.rules.rule(index));
        let authored = rule.and_then(|rule| rule.embedded_combat());
        let combat = if authored.is_some() || self.config.is_combat_room(selection.room_type) {
            Some(self.combat.generate(depth, authored, &mut self.rng))
        } else {
            None
        };
        let once = rule.is_some_and(|rule| rule.generate_once);

        if selection.renormalize_pool {
            self.catalog.renormalize_pool(selection.room_type, self.config.weight_decay);
        }
        self.catalog.record_use(
            selection.layout,
            self.config.repetition_penalty,
            self.config.weight_decay,
        );

        let layout = self
            .catalog
            .layout(selection.layout)
            .ok_or(GenerationError::UnknownLayout(selection.layout))?;
        let stamp = RoomStamp { depth, is_terminal: false, rule: selection.rule, combat };
        let room = self.graph.commit(plan, layout, stamp, world);

        if once && let Some(index) = selection.rule {
            self.state.consumed_once.insert(index);
        }
        match selection.source {
            SelectionSource::Mandatory => {
                if let Some(slot) = self.state.mandatory.as_mut() {
                    slot.placed = true;
                }
            }
            SelectionSource::ProbableMandatory => self.state.probable_mandatory_generated = true,
            SelectionSource::Weighted | SelectionSource::UniformFallback => {}
        }
        self.state.regular_rooms += 1;

        tracing::info!(
            ?room,
            room_type = ?selection.room_type,
            depth,
            layout = %layout.name,
            source = ?selection.source,
            "room placed"
        );
        Ok(room)
    }

    fn place_terminal(
        &mut self,
        exit: ExitId,
        world: &mut impl RoomWorld,
    ) -> Result<ExpansionOutcome, GenerationError> {
        if let Some(slot) = self.state.mandatory.filter(|slot| !slot.placed) {
            tracing::warn!(
                room_type = ?slot.room_type,
                planned_depth = slot.depth,
                "placing the terminal room before the mandatory room"
            );
        }
        let depth = self.state.next_depth();
        let attempts = self.config.max_room_attempts;

        for attempt in 1..=attempts {
            let Some(&layout_id) = self.rng.choose(self.catalog.terminal_pool()) else {
                break;
            };
            match self.graph.plan_placement(
                &self.catalog,
                layout_id,
                exit,
                self.config.room_spacing,
                self.config.min_room_distance,
                &mut self.rng,
            ) {
                Ok(plan) => {
                    let layout = self
                        .catalog
                        .layout(layout_id)
                        .ok_or(GenerationError::UnknownLayout(layout_id))?;
                    let stamp = RoomStamp { depth, is_terminal: true, ..RoomStamp::default() };
                    let room = self.graph.commit(&plan, layout, stamp, world);
                    self.state.terminal_placed = true;
                    self.phase = GeneratorPhase::Complete;
                    tracing::info!(?room, depth, rooms = self.graph.len(), "terminal room placed");
                    return Ok(ExpansionOutcome::Terminal { room, attempts: attempt });
                }
                Err(reason) => {
                    tracing::debug!(attempt, %reason, "terminal candidate rejected");
                }
            }
        }
        Err(GenerationError::AttemptsExhausted { exit, attempts })
    }
}

fn selector<'a>(
    catalog: &'a RoomCatalog,
    rules: &'a ProgressionRuleSet,
    state: &'a GenerationState,
    config: &GenerationConfig,
) -> WeightedSelector<'a> {
    WeightedSelector::new(SelectionContext {
        catalog,
        rules,
        state,
        luck_bonus: config.luck_bonus,
        weight_decay: config.weight_decay,
    })
}

/// Draws the target size and pins the mandatory rule to one depth. The
/// mandatory window is clipped so the room always fits before the terminal.
fn plan_run(
    config: &GenerationConfig,
    rules: &ProgressionRuleSet,
    rng: &mut GenRng,
) -> GenerationState {
    let target = rng.range_inclusive(config.min_rooms, config.max_rooms);
    let mut state = GenerationState::new(target);

    if rules.mandatory_rule_count() > 1 {
        tracing::warn!(
            count = rules.mandatory_rule_count(),
            "several mandatory rules; only the first is honored"
        );
    }
    if let Some((index, rule)) = rules.mandatory_rule() {
        let deepest_regular = target.saturating_sub(1);
        let max_depth = rule.max_depth.min(deepest_regular);
        let min_depth = rule.min_depth.max(1);
        if min_depth > max_depth {
            tracing::warn!(
                room_type = ?rule.room_type,
                min_depth = rule.min_depth,
                target,
                "mandatory room cannot fit before the terminal room"
            );
        } else {
            state.mandatory = Some(MandatorySlot {
                rule: index,
                room_type: rule.room_type,
                depth: rng.range_inclusive(min_depth, max_depth),
                max_depth,
                placed: false,
            });
        }
    }
    for (_, rule) in rules.rules().filter(|(_, rule)| rule.probable_mandatory) {
        tracing::debug!(
            room_type = ?rule.room_type,
            min_depth = rule.min_depth,
            max_depth = rule.max_depth,
            probability = rule.probability,
            "probable room armed"
        );
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{CombatContent, EnemyWave};
    use crate::error::PlacementError;
    use crate::progression::RoomTypeProbability;
    use crate::test_support::{layout_def, procedural_bucket, rule};
    use crate::types::Direction;
    use crate::world::{HeadlessWorld, NoopObserver};

    fn small_content() -> DungeonContent {
        let mut boss = rule(RoomType::Boss, 3, 5);
        boss.mandatory = true;
        boss.combat = Some(CombatContent {
            waves: vec![EnemyWave { enemies: vec!["warden".to_string()] }],
            wave_delay_secs: 1.0,
        });
        DungeonContent {
            start_layout: layout_def("start", RoomType::Start, &Direction::ALL),
            layouts: vec![
                layout_def("cross", RoomType::Combat, &Direction::ALL),
                layout_def("hall", RoomType::Combat, &Direction::ALL),
                layout_def("store", RoomType::Shop, &Direction::ALL),
                layout_def("lair", RoomType::Boss, &Direction::ALL),
            ],
            terminal_layouts: vec![layout_def("exit", RoomType::Terminal, &Direction::ALL)],
            rules: vec![rule(RoomType::Combat, 1, 50), rule(RoomType::Shop, 1, 50), boss],
            probabilities: vec![
                RoomTypeProbability { room_type: RoomType::Combat, probability: 70.0, luck_affected: false },
                RoomTypeProbability { room_type: RoomType::Shop, probability: 30.0, luck_affected: false },
            ],
            adjacency: Default::default(),
            combat_buckets: vec![procedural_bucket(0, 50)],
        }
    }

    fn config(rooms: u32) -> GenerationConfig {
        GenerationConfig { min_rooms: rooms, max_rooms: rooms, ..GenerationConfig::default() }
    }

    fn started(seed: u64, rooms: u32) -> (DungeonGenerator, HeadlessWorld, RoomId) {
        let mut generator = DungeonGenerator::new(seed, config(rooms), small_content()).unwrap();
        let mut world = HeadlessWorld::default();
        let start = generator.generate_initial_room(&mut world).unwrap();
        (generator, world, start)
    }

    fn exit_facing(generator: &DungeonGenerator, room: RoomId, direction: Direction) -> ExitId {
        let graph = generator.graph();
        graph
            .room(room)
            .unwrap()
            .exits
            .iter()
            .copied()
            .find(|exit| graph.exit(*exit).map(|point| point.direction) == Some(direction))
            .unwrap()
    }

    /// Grows a straight line of rooms northwards.
    fn grow_north(
        generator: &mut DungeonGenerator,
        world: &mut HeadlessWorld,
        from: RoomId,
    ) -> ExpansionOutcome {
        let exit = exit_facing(generator, from, Direction::North);
        generator.on_player_crossed_exit(exit, world, &mut NoopObserver).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let bad = GenerationConfig { min_rooms: 5, max_rooms: 2, ..GenerationConfig::default() };
        assert!(matches!(
            DungeonGenerator::new(1, bad, small_content()),
            Err(ConfigError::InvalidRoomRange { .. })
        ));
    }

    #[test]
    fn crossing_before_start_or_starting_twice_is_an_error() {
        let mut generator = DungeonGenerator::new(3, config(6), small_content()).unwrap();
        let mut world = HeadlessWorld::default();
        let stray = ExitId::default();
        assert_eq!(
            generator.on_player_crossed_exit(stray, &mut world, &mut NoopObserver),
            Err(GenerationError::NotStarted)
        );
        generator.generate_initial_room(&mut world).unwrap();
        assert_eq!(generator.generate_initial_room(&mut world), Err(GenerationError::AlreadyStarted));
        assert_eq!(world.instances.len(), 1);
    }

    #[test]
    fn mandatory_depth_is_planned_inside_its_window() {
        for seed in 0..50 {
            let generator = DungeonGenerator::new(seed, config(8), small_content()).unwrap();
            let slot = generator.state().mandatory.unwrap();
            assert_eq!(slot.room_type, RoomType::Boss);
            assert!((3..=5).contains(&slot.depth));
        }
    }

    #[test]
    fn mandatory_window_is_clipped_to_the_run_length() {
        let generator = DungeonGenerator::new(9, config(4), small_content()).unwrap();
        let slot = generator.state().mandatory.unwrap();
        assert_eq!(slot.max_depth, 3);
        assert_eq!(slot.depth, 3);
    }

    #[test]
    fn expansion_links_rooms_and_arms_new_exits_only_after_completion() {
        let (mut generator, mut world, start) = started(11, 8);
        let outcome = grow_north(&mut generator, &mut world, start);
        let ExpansionOutcome::Placed { room, depth, attempts, .. } = outcome else {
            panic!("expected a placed room, got {outcome:?}");
        };
        assert_eq!(depth, 1);
        assert!(attempts >= 1);
        assert_eq!(generator.graph().len(), 2);

        let onward = exit_facing(&generator, room, Direction::North);
        assert_eq!(
            generator.on_player_crossed_exit(onward, &mut world, &mut NoopObserver),
            Ok(ExpansionOutcome::Ignored(IgnoreReason::TriggerNotArmed))
        );
        assert_eq!(generator.complete_room(room), Ok(3));
        assert!(matches!(
            generator.on_player_crossed_exit(onward, &mut world, &mut NoopObserver),
            Ok(ExpansionOutcome::Placed { depth: 2, .. })
        ));
    }

    #[test]
    fn connected_exit_is_ignored() {
        let (mut generator, mut world, start) = started(12, 8);
        grow_north(&mut generator, &mut world, start);
        assert_eq!(
            grow_north(&mut generator, &mut world, start),
            ExpansionOutcome::Ignored(IgnoreReason::AlreadyConnected)
        );
        assert_eq!(generator.graph().len(), 2);
    }

    #[test]
    fn terminal_follows_the_target_and_ends_the_run() {
        let (mut generator, mut world, start) = started(13, 3);
        let mut current = start;
        let mut terminal = None;
        for _ in 0..3 {
            match grow_north(&mut generator, &mut world, current) {
                ExpansionOutcome::Placed { room, .. } => {
                    generator.complete_room(room).unwrap();
                    current = room;
                }
                ExpansionOutcome::Terminal { room, .. } => {
                    terminal = Some(room);
                    break;
                }
                ExpansionOutcome::Ignored(reason) => panic!("unexpected {reason:?}"),
            }
        }
        let terminal = terminal.expect("terminal room should be placed");
        assert_eq!(generator.phase(), GeneratorPhase::Complete);
        assert_eq!(generator.graph().len(), 4);
        let placed = generator.graph().room(terminal).unwrap();
        assert!(placed.is_terminal);
        assert_eq!(placed.room_type, RoomType::Terminal);

        let spare = exit_facing(&generator, start, Direction::East);
        assert_eq!(
            generator.on_player_crossed_exit(spare, &mut world, &mut NoopObserver),
            Ok(ExpansionOutcome::Ignored(IgnoreReason::RunComplete))
        );
    }

    #[test]
    fn prediction_matches_the_next_expansion() {
        for seed in 0..30 {
            let (mut generator, mut world, start) = started(seed, 10);
            let exit = exit_facing(&generator, start, Direction::West);
            let predicted = generator.predict_next_room_type(exit);
            let outcome =
                generator.on_player_crossed_exit(exit, &mut world, &mut NoopObserver).unwrap();
            let ExpansionOutcome::Placed { room_type, .. } = outcome else {
                panic!("expected a placed room");
            };
            assert_eq!(predicted, Some(room_type), "seed {seed}");
            assert_eq!(generator.predict_next_room_type(exit), Some(room_type));
        }
    }

    #[test]
    fn prediction_reports_terminal_once_the_target_is_met() {
        let (generator, _world, start) = started(14, 1);
        let exit = exit_facing(&generator, start, Direction::South);
        assert_eq!(generator.predict_next_room_type(exit), Some(RoomType::Terminal));
    }

    #[derive(Default)]
    struct Failures(Vec<GenerationError>);

    impl RunObserver for Failures {
        fn expansion_failed(&mut self, error: &GenerationError) {
            self.0.push(error.clone());
        }
    }

    #[test]
    fn exhausted_attempts_leave_the_exit_open_and_notify() {
        let mut config = config(6);
        config.min_room_distance = 1_000.0;
        config.max_room_attempts = 4;
        let mut generator = DungeonGenerator::new(15, config, small_content()).unwrap();
        let mut world = HeadlessWorld::default();
        let start = generator.generate_initial_room(&mut world).unwrap();
        let exit = exit_facing(&generator, start, Direction::North);
        let mut observer = Failures::default();

        let result = generator.on_player_crossed_exit(exit, &mut world, &mut observer);
        let expected = GenerationError::AttemptsExhausted { exit, attempts: 4 };
        assert_eq!(result, Err(expected.clone()));
        assert_eq!(observer.0, vec![expected]);
        assert_eq!(generator.state().stuck_exits, vec![exit]);
        assert!(!generator.graph().exit(exit).unwrap().is_connected());
        assert_eq!(world.instances.len(), 1, "rejected candidates are never instantiated");
    }

    #[test]
    fn failed_placement_does_not_consume_weights() {
        let mut config = config(6);
        config.min_room_distance = 1_000.0;
        let mut generator = DungeonGenerator::new(16, config, small_content()).unwrap();
        let mut world = HeadlessWorld::default();
        let start = generator.generate_initial_room(&mut world).unwrap();
        let exit = exit_facing(&generator, start, Direction::North);
        let _ = generator.on_player_crossed_exit(exit, &mut world, &mut NoopObserver);
        assert!(generator.catalog().layouts().all(|layout| layout.repetition_count == 0));
        assert_eq!(generator.state().regular_rooms, 1);
    }

    #[test]
    fn combat_rooms_carry_waves_and_the_boss_uses_its_authored_encounter() {
        let (mut generator, mut world, start) = started(17, 10);
        let mut current = start;
        while !generator.state().mandatory.unwrap().placed {
            let ExpansionOutcome::Placed { room, .. } = grow_north(&mut generator, &mut world, current)
            else {
                panic!("run ended before the boss");
            };
            generator.complete_room(room).unwrap();
            current = room;
        }
        for room in generator.graph().rooms() {
            match room.room_type {
                RoomType::Combat => assert!(room.combat.as_ref().is_some_and(|c| !c.is_empty())),
                RoomType::Boss => {
                    let content = room.combat.as_ref().unwrap();
                    assert_eq!(content.waves[0].enemies, vec!["warden"]);
                }
                _ => assert!(room.combat.is_none()),
            }
        }
    }

    #[test]
    fn begin_transition_targets_a_point_inside_the_entrance() {
        let (mut generator, mut world, start) = started(18, 8);
        let ExpansionOutcome::Placed { room, .. } = grow_north(&mut generator, &mut world, start) else {
            panic!("expected a placed room");
        };
        let placed = generator.graph().room(room).unwrap().clone();
        let transition = generator.begin_transition(room).unwrap();
        assert_eq!(transition.room(), room);
        assert_eq!(transition.room_type(), placed.room_type);
        assert_eq!(
            generator.begin_transition(RoomId::default()).err(),
            Some(GenerationError::UnknownRoom(RoomId::default()))
        );
    }

    #[test]
    fn teardown_destroys_every_instantiated_room() {
        let (mut generator, mut world, start) = started(19, 8);
        grow_north(&mut generator, &mut world, start);
        generator.teardown(&mut world);
        assert_eq!(world.instances.len(), 2);
        assert_eq!(world.live_instances(), 0);
    }

    #[test]
    fn placement_errors_are_recoverable_values() {
        let err = PlacementError::TooClose { room: RoomId::default(), distance: 1.0, minimum: 2.0 };
        assert!(err.to_string().contains("minimum is 2.00"));
    }
}
