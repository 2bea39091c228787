use proptest::prelude::*;
use roomweave_core::{
    DungeonContent, DungeonGenerator, GenerationConfig, HeadlessHost, HeadlessWorld, NoopObserver,
    auto_walk,
};

fn walked(seed: u64, walk_seed: u64, config: GenerationConfig) -> DungeonGenerator {
    let mut generator = DungeonGenerator::new(seed, config, DungeonContent::build_default())
        .expect("built-in inputs are valid");
    let mut world = HeadlessWorld::default();
    generator.generate_initial_room(&mut world).expect("start room");
    auto_walk(&mut generator, &mut world, &mut HeadlessHost::default(), &mut NoopObserver, walk_seed, 400);
    generator
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn connections_are_symmetric_and_face_each_other(seed in any::<u64>(), walk_seed in any::<u64>()) {
        let generator = walked(seed, walk_seed, GenerationConfig::default());
        let graph = generator.graph();
        for point in graph.exits() {
            if let Some(other_id) = point.connected_to {
                let other = graph.exit(other_id).expect("linked exit exists");
                prop_assert_eq!(other.connected_to, Some(point.id));
                prop_assert_eq!(other.direction, point.direction.opposite());
                prop_assert_ne!(other.room, point.room);
            }
        }
    }

    #[test]
    fn linked_doors_sit_one_spacing_apart(seed in any::<u64>(), spacing in 0.0_f32..12.0) {
        let config = GenerationConfig { room_spacing: spacing, ..GenerationConfig::default() };
        let generator = walked(seed, seed.rotate_left(17), config);
        let graph = generator.graph();
        for point in graph.exits() {
            if let Some(other) = point.connected_to {
                let here = graph.exit_world_position(point.id).expect("placed");
                let there = graph.exit_world_position(other).expect("placed");
                prop_assert!((here.distance(there) - spacing).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn rooms_keep_their_minimum_distance(seed in any::<u64>(), minimum in 20.0_f32..40.0) {
        let config = GenerationConfig { min_room_distance: minimum, ..GenerationConfig::default() };
        let generator = walked(seed, !seed, config);
        let rooms: Vec<_> = generator.graph().rooms().collect();
        for (index, room) in rooms.iter().enumerate() {
            for other in &rooms[index + 1..] {
                prop_assert!(room.position.distance(other.position) >= minimum);
            }
        }
    }

    #[test]
    fn depth_counts_rooms_placed_before(seed in any::<u64>()) {
        let generator = walked(seed, seed, GenerationConfig::default());
        for (index, room) in generator.graph().rooms().enumerate() {
            prop_assert_eq!(room.depth as usize, index);
        }
        let state = generator.state();
        prop_assert!(state.regular_rooms <= state.target_room_count);
    }
}
