//! Floor generation
//!
//! Rooms grow outward from the origin by randomized BFS, the farthest
//! room becomes the boss lair, and every other room gets obstacles,
//! food, and walkers. Placement uses bounded rejection sampling; a spot
//! that cannot be found within its retry budget is skipped, never fatal.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::entities::boss::Boss;
use crate::entities::creature::CharacterKind;
use crate::entities::enemy::Enemy;
use crate::entities::pickups::Food;
use crate::progression::difficulty::Difficulty;

use super::rooms::{Direction, Room, RoomGraph, DOOR_WIDTH, ROOM_HEIGHT, ROOM_WIDTH};
use super::spatial::{CrateGrid, Position, WallGrid};

/// Attempts at growing an acceptable room layout.
const LAYOUT_ATTEMPTS: u32 = 50;
/// Minimum rooms for a playable floor.
const MIN_ROOMS: usize = 5;
/// Attempts at placing a single obstacle, food, or enemy.
const PLACEMENT_TRIES: u32 = 20;
/// Probability that BFS growth claims an adjacent room slot.
const GROWTH_CHANCE: f64 = 0.7;
/// Chance an accepted obstacle cell is a crate rather than a wall.
const CRATE_CHANCE: f64 = 0.4;
/// Herd cluster centers for sheep placement.
const HERD_COUNT: usize = 3;

/// Everything generation produces for one floor.
#[derive(Debug, Clone)]
pub struct GeneratedFloor {
    pub graph: RoomGraph,
    pub walls: WallGrid,
    pub crates: CrateGrid,
    pub food: Vec<Food>,
    pub enemies: Vec<Enemy>,
    pub boss: Boss,
}

/// Generate a floor.
///
/// `characters` drives the risk modifier: frost/venom parties get two
/// extra rooms to feed their attrition playstyle.
pub fn generate(
    rng: &mut StdRng,
    floor: u32,
    difficulty: Difficulty,
    characters: &[CharacterKind],
) -> GeneratedFloor {
    let risk = if characters.iter().any(|c| c.risky()) { 2 } else { 0 };
    let target = (6 + 2 * floor + risk) as usize;
    let two_players = characters.len() > 1;

    let mut cells = grow_rooms(rng, target);
    let mut attempts = 1;
    while cells.len() < MIN_ROOMS && attempts < LAYOUT_ATTEMPTS {
        cells = grow_rooms(rng, target);
        attempts += 1;
    }

    let distances = bfs_distances(&cells);
    let boss_key = distances
        .iter()
        .max_by_key(|(_, &d)| d)
        .map(|(&k, _)| k)
        .unwrap_or((0, 0));

    let mut graph = RoomGraph::new();
    for &(gx, gy) in &cells {
        let mut room = Room::new(gx, gy);
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            if cells.contains(&(gx + dx, gy + dy)) {
                room.connections.push(dir);
            }
        }
        room.is_boss_room = (gx, gy) == boss_key;
        if (gx, gy) == (0, 0) {
            room.explored = true;
        }
        graph.insert(room);
    }

    let mut walls = WallGrid::new();
    for room in graph.iter() {
        carve_borders(&mut walls, room);
    }

    let mut crates = CrateGrid::new();
    for key in graph.keys().collect::<Vec<_>>() {
        let room = match graph.get(key) {
            Some(r) => r.clone(),
            None => continue,
        };
        if room.is_boss_room || key == (0, 0) {
            continue;
        }
        place_obstacles(rng, &mut walls, &mut crates, &room, floor, difficulty);
    }

    let food = place_food(rng, &graph, &walls, &crates, floor, difficulty);
    let enemies = place_enemies(rng, &graph, &walls, &crates, floor, two_players);

    let boss_center = graph
        .get(boss_key)
        .map(|r| r.center())
        .unwrap_or_else(|| Position::new(ROOM_WIDTH / 2, ROOM_HEIGHT / 2));
    let boss = Boss::for_floor(floor, boss_center, two_players);

    log::info!(
        "generated floor {}: {} rooms ({} attempts), boss '{}' at {:?}, {} walls, {} crates, {} food, {} walkers",
        floor,
        graph.len(),
        attempts,
        boss.name,
        boss_key,
        walls.len(),
        crates.len(),
        food.len(),
        enemies.len()
    );

    GeneratedFloor {
        graph,
        walls,
        crates,
        food,
        enemies,
        boss,
    }
}

/// Randomized BFS over the room grid from the origin.
fn grow_rooms(rng: &mut StdRng, target: usize) -> HashSet<(i32, i32)> {
    let mut cells = HashSet::new();
    let mut frontier = VecDeque::new();
    cells.insert((0, 0));
    frontier.push_back((0, 0));

    while let Some((gx, gy)) = frontier.pop_front() {
        if cells.len() >= target {
            break;
        }
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let next = (gx + dx, gy + dy);
            if cells.len() < target && !cells.contains(&next) && rng.gen_bool(GROWTH_CHANCE) {
                cells.insert(next);
                frontier.push_back(next);
            }
        }
    }
    cells
}

/// BFS distance of each grown cell from the origin.
fn bfs_distances(cells: &HashSet<(i32, i32)>) -> HashMap<(i32, i32), u32> {
    let mut distances = HashMap::new();
    let mut frontier = VecDeque::new();
    distances.insert((0, 0), 0);
    frontier.push_back((0, 0));
    while let Some((gx, gy)) = frontier.pop_front() {
        let d = distances[&(gx, gy)];
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let next = (gx + dx, gy + dy);
            if cells.contains(&next) && !distances.contains_key(&next) {
                distances.insert(next, d + 1);
                frontier.push_back(next);
            }
        }
    }
    distances
}

/// Border walls on all four edges, with a centered door gap per
/// connection.
fn carve_borders(walls: &mut WallGrid, room: &Room) {
    let (bx, by) = room.base();
    let mid_x = bx + ROOM_WIDTH / 2;
    let mid_y = by + ROOM_HEIGHT / 2;
    let half = DOOR_WIDTH / 2;

    let mut doors: HashSet<(i32, i32)> = HashSet::new();
    for &dir in &room.connections {
        match dir {
            Direction::Up => {
                for x in (mid_x - half)..(mid_x + half) {
                    doors.insert((x, by));
                }
            }
            Direction::Down => {
                for x in (mid_x - half)..(mid_x + half) {
                    doors.insert((x, by + ROOM_HEIGHT - 1));
                }
            }
            Direction::Left => {
                for y in (mid_y - half)..(mid_y + half) {
                    doors.insert((bx, y));
                }
            }
            Direction::Right => {
                for y in (mid_y - half)..(mid_y + half) {
                    doors.insert((bx + ROOM_WIDTH - 1, y));
                }
            }
        }
    }

    for x in bx..bx + ROOM_WIDTH {
        for &y in &[by, by + ROOM_HEIGHT - 1] {
            if !doors.contains(&(x, y)) {
                walls.insert(x, y);
            }
        }
    }
    for y in by..by + ROOM_HEIGHT {
        for &x in &[bx, bx + ROOM_WIDTH - 1] {
            if !doors.contains(&(x, y)) {
                walls.insert(x, y);
            }
        }
    }
}

/// Door-carving cells for a connection, used by the boss room lockdown.
pub fn door_cells(room: &Room, dir: Direction) -> Vec<(i32, i32)> {
    let (bx, by) = room.base();
    let mid_x = bx + ROOM_WIDTH / 2;
    let mid_y = by + ROOM_HEIGHT / 2;
    let half = DOOR_WIDTH / 2;
    match dir {
        Direction::Up => ((mid_x - half)..(mid_x + half)).map(|x| (x, by)).collect(),
        Direction::Down => ((mid_x - half)..(mid_x + half))
            .map(|x| (x, by + ROOM_HEIGHT - 1))
            .collect(),
        Direction::Left => ((mid_y - half)..(mid_y + half)).map(|y| (bx, y)).collect(),
        Direction::Right => ((mid_y - half)..(mid_y + half))
            .map(|y| (bx + ROOM_WIDTH - 1, y))
            .collect(),
    }
}

// ============================================================================
// Obstacles
// ============================================================================

/// The eight obstacle layouts a room can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObstaclePattern {
    Scatter,
    Checkerboard,
    HorizontalBands,
    VerticalBands,
    RadialRings,
    CrossAxis,
    QuadrantClusters,
    Lattice,
}

impl ObstaclePattern {
    fn roll(rng: &mut StdRng) -> Self {
        match rng.gen_range(0..8) {
            0 => ObstaclePattern::Scatter,
            1 => ObstaclePattern::Checkerboard,
            2 => ObstaclePattern::HorizontalBands,
            3 => ObstaclePattern::VerticalBands,
            4 => ObstaclePattern::RadialRings,
            5 => ObstaclePattern::CrossAxis,
            6 => ObstaclePattern::QuadrantClusters,
            _ => ObstaclePattern::Lattice,
        }
    }

    /// Whether a local cell belongs to the pattern.
    fn accepts(self, rng: &mut StdRng, lx: i32, ly: i32) -> bool {
        let mid_x = ROOM_WIDTH / 2;
        let mid_y = ROOM_HEIGHT / 2;
        match self {
            ObstaclePattern::Scatter => true,
            ObstaclePattern::Checkerboard => (lx + ly) % 2 == 0,
            ObstaclePattern::HorizontalBands => ly % 3 == 0,
            ObstaclePattern::VerticalBands => lx % 3 == 0,
            ObstaclePattern::RadialRings => {
                let ring = (lx - mid_x).abs().max((ly - mid_y).abs());
                ring == 5 || ring == 9
            }
            ObstaclePattern::CrossAxis => (lx - mid_x).abs() <= 2 || (ly - mid_y).abs() <= 2,
            ObstaclePattern::QuadrantClusters => {
                let qx = if lx < mid_x { mid_x / 2 } else { mid_x + mid_x / 2 };
                let qy = if ly < mid_y { mid_y / 2 } else { mid_y + mid_y / 2 };
                (lx - qx).abs().max((ly - qy).abs()) <= 3
            }
            ObstaclePattern::Lattice => {
                (lx % 6 == 0 && ly % 6 == 0) || rng.gen_bool(0.2)
            }
        }
    }
}

/// A local cell must keep clear of the spawn-safe center window and the
/// corridors running from each door.
fn obstacle_cell_allowed(lx: i32, ly: i32) -> bool {
    let mid_x = ROOM_WIDTH / 2;
    let mid_y = ROOM_HEIGHT / 2;
    if (lx - mid_x).abs() < 4 && (ly - mid_y).abs() < 4 {
        return false;
    }
    // Vertical door corridors.
    if (lx - mid_x).abs() < 5 && (ly < 6 || ly > ROOM_HEIGHT - 7) {
        return false;
    }
    // Horizontal door corridors.
    if (ly - mid_y).abs() < 5 && (lx < 6 || lx > ROOM_WIDTH - 7) {
        return false;
    }
    true
}

fn place_obstacles(
    rng: &mut StdRng,
    walls: &mut WallGrid,
    crates: &mut CrateGrid,
    room: &Room,
    floor: u32,
    difficulty: Difficulty,
) {
    let (bx, by) = room.base();
    let margin = 5;
    let area = ((ROOM_WIDTH - 4) * (ROOM_HEIGHT - 4)) as f32;
    let density = 0.1 + 0.1 * floor as f32;
    let count = (area * density * difficulty.obstacle_mult()) as u32;
    let pattern = ObstaclePattern::roll(rng);

    for _ in 0..count {
        for _ in 0..PLACEMENT_TRIES {
            let lx = rng.gen_range(margin..ROOM_WIDTH - margin);
            let ly = rng.gen_range(margin..ROOM_HEIGHT - margin);
            if !pattern.accepts(rng, lx, ly) || !obstacle_cell_allowed(lx, ly) {
                continue;
            }
            let (x, y) = (bx + lx, by + ly);
            if walls.contains(x, y) || crates.contains(x, y) {
                continue;
            }
            if rng.gen_bool(CRATE_CHANCE) {
                crates.insert(x, y);
            } else {
                walls.insert(x, y);
            }
            break;
        }
    }
}

// ============================================================================
// Food and enemies
// ============================================================================

fn blocked(walls: &WallGrid, crates: &CrateGrid, pos: Position) -> bool {
    walls.contains(pos.x, pos.y) || crates.contains(pos.x, pos.y)
}

/// Random open tile inside a room, away from the border.
fn open_tile_in(
    rng: &mut StdRng,
    room: &Room,
    walls: &WallGrid,
    crates: &CrateGrid,
    margin: i32,
) -> Option<Position> {
    let (bx, by) = room.base();
    for _ in 0..PLACEMENT_TRIES {
        let pos = Position::new(
            rng.gen_range(bx + margin..bx + ROOM_WIDTH - margin),
            rng.gen_range(by + margin..by + ROOM_HEIGHT - margin),
        );
        if !blocked(walls, crates, pos) {
            return Some(pos);
        }
    }
    None
}

fn place_food(
    rng: &mut StdRng,
    graph: &RoomGraph,
    walls: &WallGrid,
    crates: &CrateGrid,
    floor: u32,
    difficulty: Difficulty,
) -> Vec<Food> {
    let mut spawn_rooms: Vec<&Room> = graph.iter().filter(|r| !r.is_boss_room).collect();
    spawn_rooms.sort_by_key(|r| r.key());
    if spawn_rooms.is_empty() {
        return Vec::new();
    }

    // Sheep flock: a few herd anchors, the rest of the sheep scatter
    // around whichever anchor they roll.
    let mut herds = Vec::new();
    for _ in 0..HERD_COUNT {
        if let Some(&room) = spawn_rooms.choose(rng) {
            if let Some(pos) = open_tile_in(rng, room, walls, crates, 5) {
                herds.push((room.key(), pos));
            }
        }
    }

    let count = (8 + 2 * floor) * difficulty.resource_mult();
    let mut food = Vec::new();
    for _ in 0..count {
        if rng.gen_bool(0.6) && !herds.is_empty() {
            let &(room_key, anchor) = herds.choose(rng).unwrap_or(&herds[0]);
            let mut placed = false;
            for _ in 0..PLACEMENT_TRIES {
                let pos = anchor.offset(rng.gen_range(-4..=4), rng.gen_range(-4..=4));
                let in_room = graph.get(room_key).map(|r| r.contains(pos)).unwrap_or(false);
                if in_room && !blocked(walls, crates, pos) {
                    food.push(Food::sheep(pos));
                    placed = true;
                    break;
                }
            }
            if !placed {
                if let Some(room) = graph.get(room_key) {
                    if let Some(pos) = open_tile_in(rng, room, walls, crates, 2) {
                        food.push(Food::sheep(pos));
                    }
                }
            }
        } else if let Some(&room) = spawn_rooms.choose(rng) {
            if let Some(pos) = open_tile_in(rng, room, walls, crates, 2) {
                food.push(Food::wildfire(pos));
            }
        }
    }
    food
}

fn place_enemies(
    rng: &mut StdRng,
    graph: &RoomGraph,
    walls: &WallGrid,
    crates: &CrateGrid,
    floor: u32,
    two_players: bool,
) -> Vec<Enemy> {
    let mut per_room = 2 + floor;
    if floor >= 3 {
        per_room *= 2;
    }
    if two_players {
        per_room += 2;
    }

    let mut rooms: Vec<&Room> = graph
        .iter()
        .filter(|r| !r.is_boss_room && r.key() != (0, 0))
        .collect();
    rooms.sort_by_key(|r| r.key());

    let mut enemies = Vec::new();
    for room in rooms {
        for _ in 0..per_room {
            if let Some(pos) = open_tile_in(rng, room, walls, crates, 2) {
                enemies.push(Enemy::walker(floor, pos));
            }
        }
    }
    enemies
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn gen_floor(seed: u64, floor: u32, difficulty: Difficulty) -> GeneratedFloor {
        let mut rng = StdRng::seed_from_u64(seed);
        generate(&mut rng, floor, difficulty, &[CharacterKind::Ember])
    }

    #[test]
    fn test_minimum_rooms_and_one_boss_room() {
        for seed in 0..10 {
            let floor = gen_floor(seed, 1, Difficulty::Normal);
            assert!(floor.graph.len() >= MIN_ROOMS, "seed {seed}");
            let boss_rooms = floor.graph.iter().filter(|r| r.is_boss_room).count();
            assert_eq!(boss_rooms, 1, "seed {seed}");
        }
    }

    #[test]
    fn test_boss_room_is_not_origin() {
        for seed in 0..10 {
            let floor = gen_floor(seed, 2, Difficulty::Normal);
            let boss = floor.graph.boss_room().map(|r| r.key());
            assert_ne!(boss, Some((0, 0)), "seed {seed}");
        }
    }

    #[test]
    fn test_connections_are_symmetric() {
        let floor = gen_floor(3, 1, Difficulty::Normal);
        for room in floor.graph.iter() {
            for &dir in &room.connections {
                let (dx, dy) = dir.delta();
                let neighbor = floor
                    .graph
                    .get((room.gx + dx, room.gy + dy))
                    .unwrap_or_else(|| panic!("dangling connection from {:?}", room.key()));
                assert!(neighbor.connections.contains(&dir.opposite()));
            }
        }
    }

    #[test]
    fn test_doors_are_open_and_corners_walled() {
        let floor = gen_floor(5, 1, Difficulty::Normal);
        for room in floor.graph.iter() {
            let (bx, by) = room.base();
            assert!(floor.walls.contains(bx, by));
            assert!(floor.walls.contains(bx + ROOM_WIDTH - 1, by + ROOM_HEIGHT - 1));
            for &dir in &room.connections {
                for (x, y) in door_cells(room, dir) {
                    assert!(!floor.walls.contains(x, y), "door blocked at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_origin_and_boss_rooms_stay_clear() {
        let floor = gen_floor(7, 2, Difficulty::Normal);
        for room in floor.graph.iter() {
            if !room.is_boss_room && room.key() != (0, 0) {
                continue;
            }
            let (bx, by) = room.base();
            for lx in 1..ROOM_WIDTH - 1 {
                for ly in 1..ROOM_HEIGHT - 1 {
                    assert!(
                        !floor.crates.contains(bx + lx, by + ly),
                        "crate inside protected room {:?}",
                        room.key()
                    );
                }
            }
        }
    }

    #[test]
    fn test_easy_spawns_more_food_than_normal() {
        let normal = gen_floor(11, 1, Difficulty::Normal);
        let easy = gen_floor(11, 1, Difficulty::Easy);
        assert!(
            easy.food.len() >= normal.food.len(),
            "easy {} < normal {}",
            easy.food.len(),
            normal.food.len()
        );
    }

    #[test]
    fn test_food_and_enemies_on_open_tiles() {
        let floor = gen_floor(13, 1, Difficulty::Normal);
        for f in &floor.food {
            assert!(!floor.walls.contains(f.pos.x, f.pos.y));
            assert!(!floor.crates.contains(f.pos.x, f.pos.y));
        }
        for e in &floor.enemies {
            assert!(!floor.walls.contains(e.pos.x, e.pos.y));
        }
        assert!(!floor.enemies.is_empty());
    }

    #[test]
    fn test_boss_sits_in_boss_room() {
        let floor = gen_floor(17, 3, Difficulty::Normal);
        let boss_room = floor.graph.boss_room().cloned();
        let boss_room = match boss_room {
            Some(r) => r,
            None => panic!("no boss room"),
        };
        assert!(boss_room.contains(floor.boss.center()));
        assert_eq!(floor.boss.name, "Void Emperor");
    }
}
