//! Placed rooms and their connection points, plus the placement planner that
//! joins a new layout to an open exit.

use slotmap::SlotMap;

use crate::catalog::{RoomCatalog, RoomLayout};
use crate::combat::CombatContent;
use crate::error::PlacementError;
use crate::rng::GenRng;
use crate::types::{Direction, ExitId, LayoutId, RoomHandle, RoomId, RoomType, RuleIndex, Vec2};
use crate::world::RoomWorld;

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionPoint {
    pub id: ExitId,
    pub room: RoomId,
    pub direction: Direction,
    pub local_offset: Vec2,
    pub connected_to: Option<ExitId>,
    /// Whether a player crossing may request expansion through this exit.
    pub armed: bool,
}

impl ConnectionPoint {
    pub fn is_connected(&self) -> bool {
        self.connected_to.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedRoom {
    pub id: RoomId,
    pub layout: LayoutId,
    pub room_type: RoomType,
    pub position: Vec2,
    /// Side of this room that faces the room it was grown from.
    pub entered_from: Option<Direction>,
    pub depth: u32,
    pub is_start: bool,
    pub is_terminal: bool,
    pub exits: Vec<ExitId>,
    pub entrance: Option<ExitId>,
    pub combat: Option<CombatContent>,
    pub rule: Option<RuleIndex>,
    pub handle: RoomHandle,
}

/// A validated candidate: where `layout` would go if committed.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPlan {
    pub layout: LayoutId,
    pub from_exit: ExitId,
    pub entrance_socket: usize,
    pub position: Vec2,
}

/// What to stamp on a room when a plan is committed.
#[derive(Clone, Debug, Default)]
pub struct RoomStamp {
    pub depth: u32,
    pub is_terminal: bool,
    pub rule: Option<RuleIndex>,
    pub combat: Option<CombatContent>,
}

#[derive(Clone, Debug, Default)]
pub struct RoomGraph {
    rooms: SlotMap<RoomId, PlacedRoom>,
    exits: SlotMap<ExitId, ConnectionPoint>,
    order: Vec<RoomId>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self, id: RoomId) -> Option<&PlacedRoom> {
        self.rooms.get(id)
    }

    pub fn exit(&self, id: ExitId) -> Option<&ConnectionPoint> {
        self.exits.get(id)
    }

    /// Rooms in placement order.
    pub fn rooms(&self) -> impl Iterator<Item = &PlacedRoom> {
        self.order.iter().filter_map(|id| self.rooms.get(*id))
    }

    pub fn exits(&self) -> impl Iterator<Item = &ConnectionPoint> {
        self.exits.values()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn start_room(&self) -> Option<&PlacedRoom> {
        self.rooms().find(|room| room.is_start)
    }

    pub fn terminal_room(&self) -> Option<&PlacedRoom> {
        self.rooms().find(|room| room.is_terminal)
    }

    pub fn open_exits(&self) -> impl Iterator<Item = &ConnectionPoint> {
        self.exits.values().filter(|exit| !exit.is_connected())
    }

    pub fn exit_world_position(&self, exit: ExitId) -> Option<Vec2> {
        let point = self.exits.get(exit)?;
        let room = self.rooms.get(point.room)?;
        Some(room.position + point.local_offset)
    }

    /// Places the start room at the origin with every exit armed.
    pub(crate) fn place_start(
        &mut self,
        layout: &RoomLayout,
        world: &mut impl RoomWorld,
    ) -> RoomId {
        let room = self.insert_room(layout, Vec2::ZERO, None, RoomStamp::default(), world);
        self.rooms[room].is_start = true;
        for exit in self.rooms[room].exits.clone() {
            self.attach_trigger(exit, world);
            self.exits[exit].armed = true;
        }
        room
    }

    /// Works out where `layout` would attach to `from_exit` and checks the
    /// spacing rule against every placed room. Nothing is mutated.
    pub fn plan_placement(
        &self,
        catalog: &RoomCatalog,
        layout: LayoutId,
        from_exit: ExitId,
        room_spacing: f32,
        min_room_distance: f32,
        rng: &mut GenRng,
    ) -> Result<PlacementPlan, PlacementError> {
        let from = self.exits.get(from_exit).ok_or(PlacementError::UnknownExit(from_exit))?;
        if from.is_connected() {
            return Err(PlacementError::ExitAlreadyConnected(from_exit));
        }
        let from_world = self
            .exit_world_position(from_exit)
            .ok_or(PlacementError::UnknownExit(from_exit))?;
        let required = from.direction.opposite();

        let candidate = catalog.layout(layout).ok_or(PlacementError::NoMatchingExit {
            layout,
            required,
        })?;
        let matching: Vec<usize> =
            candidate.exits_facing(required).map(|(index, _)| index).collect();
        let Some(&entrance_socket) = rng.choose(&matching) else {
            return Err(PlacementError::NoMatchingExit { layout, required });
        };

        let socket_world = from_world + from.direction.unit() * room_spacing;
        let position = socket_world - candidate.exits[entrance_socket].offset;

        if let Some((room, distance)) = self.nearest_room(position)
            && distance < min_room_distance
        {
            return Err(PlacementError::TooClose { room, distance, minimum: min_room_distance });
        }

        Ok(PlacementPlan { layout, from_exit, entrance_socket, position })
    }

    /// Joins the planned room to its parent exit. Every other socket of the
    /// new room becomes an open exit with a trigger attached but not armed.
    pub(crate) fn commit(
        &mut self,
        plan: &PlacementPlan,
        layout: &RoomLayout,
        stamp: RoomStamp,
        world: &mut impl RoomWorld,
    ) -> RoomId {
        let entered_from = layout.exits.get(plan.entrance_socket).map(|socket| socket.direction);
        let room = self.insert_room(layout, plan.position, entered_from, stamp, world);
        let entrance = self.rooms[room].exits[plan.entrance_socket];

        self.exits[entrance].connected_to = Some(plan.from_exit);
        self.exits[plan.from_exit].connected_to = Some(entrance);
        self.rooms[room].entrance = Some(entrance);

        for exit in self.rooms[room].exits.clone() {
            if exit != entrance {
                self.attach_trigger(exit, world);
            }
        }
        room
    }

    /// Allows expansion requests through the room's remaining open exits.
    pub fn arm_exits(&mut self, room: RoomId) -> usize {
        let Some(placed) = self.rooms.get(room) else {
            return 0;
        };
        let mut armed = 0;
        for exit in &placed.exits {
            if let Some(point) = self.exits.get_mut(*exit)
                && !point.is_connected()
                && !point.armed
            {
                point.armed = true;
                armed += 1;
            }
        }
        armed
    }

    pub(crate) fn room_handles(&self) -> Vec<RoomHandle> {
        self.order.iter().filter_map(|id| self.rooms.get(*id)).map(|room| room.handle).collect()
    }

    fn insert_room(
        &mut self,
        layout: &RoomLayout,
        position: Vec2,
        entered_from: Option<Direction>,
        stamp: RoomStamp,
        world: &mut impl RoomWorld,
    ) -> RoomId {
        let room = self.rooms.insert(PlacedRoom {
            id: RoomId::default(),
            layout: layout.id,
            room_type: if stamp.is_terminal { RoomType::Terminal } else { layout.room_type },
            position,
            entered_from,
            depth: stamp.depth,
            is_start: false,
            is_terminal: stamp.is_terminal,
            exits: Vec::with_capacity(layout.exits.len()),
            entrance: None,
            combat: stamp.combat,
            rule: stamp.rule,
            handle: RoomHandle(0),
        });
        self.rooms[room].id = room;
        self.rooms[room].handle = world.instantiate_room(room, layout, position);

        for socket in &layout.exits {
            let exit = self.exits.insert(ConnectionPoint {
                id: ExitId::default(),
                room,
                direction: socket.direction,
                local_offset: socket.offset,
                connected_to: None,
                armed: false,
            });
            self.exits[exit].id = exit;
            self.rooms[room].exits.push(exit);
        }
        self.order.push(room);
        room
    }

    fn attach_trigger(&mut self, exit: ExitId, world: &mut impl RoomWorld) {
        if let (Some(point), Some(position)) =
            (self.exits.get(exit), self.exit_world_position(exit))
        {
            world.attach_exit_trigger(exit, position, point.direction);
        }
    }

    fn nearest_room(&self, position: Vec2) -> Option<(RoomId, f32)> {
        self.rooms()
            .map(|room| (room.id, room.position.distance(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::layout_def;
    use crate::world::HeadlessWorld;

    struct Fixture {
        catalog: RoomCatalog,
        graph: RoomGraph,
        world: HeadlessWorld,
        start: RoomId,
    }

    fn fixture() -> Fixture {
        let mut catalog = RoomCatalog::new();
        let start_layout =
            catalog.set_start(layout_def("start", RoomType::Start, &Direction::ALL));
        let mut graph = RoomGraph::new();
        let mut world = HeadlessWorld::default();
        let layout = catalog.layout(start_layout).cloned().unwrap();
        let start = graph.place_start(&layout, &mut world);
        Fixture { catalog, graph, world, start }
    }

    fn exit_facing(graph: &RoomGraph, room: RoomId, direction: Direction) -> ExitId {
        graph
            .room(room)
            .unwrap()
            .exits
            .iter()
            .copied()
            .find(|exit| graph.exit(*exit).map(|point| point.direction) == Some(direction))
            .unwrap()
    }

    #[test]
    fn start_room_is_at_origin_with_armed_triggers() {
        let fx = fixture();
        let start = fx.graph.start_room().unwrap();
        assert_eq!(start.position, Vec2::ZERO);
        assert_eq!(start.depth, 0);
        assert_eq!(fx.world.triggers.len(), 4);
        assert!(fx.graph.exits().all(|exit| exit.armed && !exit.is_connected()));
    }

    #[test]
    fn layout_without_opposite_exit_is_rejected() {
        let mut fx = fixture();
        let only_north =
            fx.catalog.insert(layout_def("n", RoomType::Combat, &[Direction::North]));
        let east = exit_facing(&fx.graph, fx.start, Direction::East);
        let mut rng = GenRng::from_seed(1);
        let result = fx.graph.plan_placement(&fx.catalog, only_north, east, 4.0, 10.0, &mut rng);
        assert_eq!(
            result,
            Err(PlacementError::NoMatchingExit { layout: only_north, required: Direction::West })
        );
    }

    #[test]
    fn planned_entrance_sits_one_spacing_beyond_the_parent_exit() {
        let fx = fixture();
        let mut catalog = fx.catalog.clone();
        let west_entry = catalog.insert(layout_def("w", RoomType::Combat, &[Direction::West]));
        let east = exit_facing(&fx.graph, fx.start, Direction::East);
        let mut rng = GenRng::from_seed(1);

        let plan =
            fx.graph.plan_placement(&catalog, west_entry, east, 4.0, 10.0, &mut rng).unwrap();
        // start exit at (10, 0); entrance socket at (-10, 0) relative to the new origin
        assert_eq!(plan.position, Vec2::new(24.0, 0.0));
        let socket = catalog.layout(west_entry).unwrap().exits[plan.entrance_socket];
        let entrance_world = plan.position + socket.offset;
        let parent_world = fx.graph.exit_world_position(east).unwrap();
        assert!((entrance_world.distance(parent_world) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn commit_links_both_points_and_leaves_new_exits_unarmed() {
        let mut fx = fixture();
        let corridor = fx
            .catalog
            .insert(layout_def("c", RoomType::Combat, &[Direction::South, Direction::North]));
        let north = exit_facing(&fx.graph, fx.start, Direction::North);
        let mut rng = GenRng::from_seed(1);
        let plan =
            fx.graph.plan_placement(&fx.catalog, corridor, north, 4.0, 10.0, &mut rng).unwrap();
        let layout = fx.catalog.layout(corridor).cloned().unwrap();
        let stamp = RoomStamp { depth: 1, ..RoomStamp::default() };
        let room = fx.graph.commit(&plan, &layout, stamp, &mut fx.world);

        let placed = fx.graph.room(room).unwrap();
        let entrance = placed.entrance.unwrap();
        assert_eq!(fx.graph.exit(north).unwrap().connected_to, Some(entrance));
        assert_eq!(fx.graph.exit(entrance).unwrap().connected_to, Some(north));
        assert_eq!(fx.graph.exit(entrance).unwrap().direction, Direction::South);
        assert_eq!(placed.entered_from, Some(Direction::South));

        let onward = exit_facing(&fx.graph, room, Direction::North);
        assert!(!fx.graph.exit(onward).unwrap().armed);
        assert_eq!(fx.graph.arm_exits(room), 1);
        assert!(fx.graph.exit(onward).unwrap().armed);
        assert_eq!(fx.world.triggers.len(), 5);
    }

    #[test]
    fn candidate_too_close_to_a_placed_room_is_rejected() {
        let fx = fixture();
        let mut catalog = fx.catalog.clone();
        let west_entry = catalog.insert(layout_def("w", RoomType::Combat, &[Direction::West]));
        let east = exit_facing(&fx.graph, fx.start, Direction::East);
        let mut rng = GenRng::from_seed(1);
        let result = fx.graph.plan_placement(&catalog, west_entry, east, 4.0, 30.0, &mut rng);
        assert!(matches!(result, Err(PlacementError::TooClose { .. })));
    }

    #[test]
    fn connected_exit_cannot_be_planned_again() {
        let mut fx = fixture();
        let any = fx.catalog.insert(layout_def("any", RoomType::Combat, &Direction::ALL));
        let south = exit_facing(&fx.graph, fx.start, Direction::South);
        let mut rng = GenRng::from_seed(3);
        let plan = fx.graph.plan_placement(&fx.catalog, any, south, 4.0, 10.0, &mut rng).unwrap();
        let layout = fx.catalog.layout(any).cloned().unwrap();
        fx.graph.commit(&plan, &layout, RoomStamp::default(), &mut fx.world);

        let again = fx.graph.plan_placement(&fx.catalog, any, south, 4.0, 10.0, &mut rng);
        assert_eq!(again, Err(PlacementError::ExitAlreadyConnected(south)));
    }
}
