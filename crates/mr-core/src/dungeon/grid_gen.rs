//! Grid/lattice level generation.
//!
//! The map is partitioned into a regular lattice of candidate cells; every
//! cell carves a randomly sized and offset rectangle. Rooms are then joined
//! by a connection walk over lattice adjacency: each room tunnels to a
//! random neighbor, and any room still outside the walk is attached to an
//! already-connected neighbor until the whole floor is one region. No
//! retry loop is needed; in a full lattice a connected neighbor always
//! exists, so every union succeeds.

use super::room::Room;
use super::tunnel::dig_tunnel;
use super::{Level, Tile, TileKind};
use crate::consts::{GRID_CELL_HEIGHT, GRID_CELL_WIDTH, MAP_HEIGHT, MAP_WIDTH};
use crate::geometry::Point;
use crate::rng::GameRng;

/// Generate a floor with the lattice method
pub fn generate(depth: usize, is_first_level: bool, rng: &mut GameRng) -> Level {
    let mut level = Level::new(depth);

    let cols = (MAP_WIDTH - 2) / GRID_CELL_WIDTH;
    let rows = (MAP_HEIGHT - 2) / GRID_CELL_HEIGHT;
    let mut rooms = carve_rooms(&mut level, rows, cols, rng);

    let (first, last) = connect_rooms(&mut level, &mut rooms, rng);

    // Stairs go in the first and last rooms touched by the connection walk
    let down = rooms[last].random_point(rng);
    level.set_tile(
        down,
        Tile {
            kind: TileKind::StairsDown,
        },
    );
    level.stairs_down = down;

    if !is_first_level {
        let mut up = rooms[first].random_point(rng);
        while up == down {
            up = rooms[first].random_point(rng);
        }
        level.set_tile(
            up,
            Tile {
                kind: TileKind::StairsUp,
            },
        );
        level.stairs_up = Some(up);
    }

    debug_assert!(level.is_fully_connected());
    level
}

/// Carve one room per lattice cell, keeping a 1-tile margin everywhere
fn carve_rooms(level: &mut Level, rows: usize, cols: usize, rng: &mut GameRng) -> Vec<Room> {
    let mut rooms = Vec::with_capacity(rows * cols);

    for row in 0..rows {
        for col in 0..cols {
            let cell_x = 1 + (col * GRID_CELL_WIDTH) as i32;
            let cell_y = 1 + (row * GRID_CELL_HEIGHT) as i32;

            let width = rng.range(4, GRID_CELL_WIDTH as i32 - 2);
            let height = rng.range(3, GRID_CELL_HEIGHT as i32 - 2);
            let x = cell_x + rng.range(1, GRID_CELL_WIDTH as i32 - 1 - width);
            let y = cell_y + rng.range(1, GRID_CELL_HEIGHT as i32 - 1 - height);

            let room = Room::new(x, y, width, height, row, col);
            for rx in room.x..room.x + room.width {
                for ry in room.y..room.y + room.height {
                    level.set_tile(Point::new(rx, ry), Tile::floor());
                }
            }
            rooms.push(room);
        }
    }

    rooms
}

fn lattice_neighbors(rooms: &[Room], idx: usize) -> Vec<usize> {
    (0..rooms.len())
        .filter(|&j| j != idx && rooms[idx].is_lattice_neighbor(&rooms[j]))
        .collect()
}

/// Tunnel rooms together; returns the indexes of the first and last rooms
/// joined to the walk.
fn connect_rooms(level: &mut Level, rooms: &mut [Room], rng: &mut GameRng) -> (usize, usize) {
    let mut order: Vec<usize> = (0..rooms.len()).collect();
    rng.shuffle(&mut order);

    let first = order[0];
    rooms[first].connected = true;
    let mut last = first;

    // Each room tunnels to one neighbor, preferring neighbors the walk has
    // not reached yet
    for &i in order.iter() {
        let neighbors = lattice_neighbors(rooms, i);
        let unconnected: Vec<usize> = neighbors
            .iter()
            .copied()
            .filter(|&j| !rooms[j].connected)
            .collect();
        let pool = if unconnected.is_empty() {
            &neighbors
        } else {
            &unconnected
        };
        let &j = rng.choose(pool).expect("lattice room without neighbors");

        dig_tunnel(level, rooms[i].center(), rooms[j].center(), rng);
        if rooms[i].connected || rooms[j].connected {
            for k in [i, j] {
                if !rooms[k].connected {
                    rooms[k].connected = true;
                    last = k;
                }
            }
        }
    }

    // Attach anything the pairwise pass left out
    loop {
        let Some(i) = (0..rooms.len()).find(|&i| {
            !rooms[i].connected
                && lattice_neighbors(rooms, i)
                    .iter()
                    .any(|&j| rooms[j].connected)
        }) else {
            break;
        };
        let candidates: Vec<usize> = lattice_neighbors(rooms, i)
            .into_iter()
            .filter(|&j| rooms[j].connected)
            .collect();
        let &j = rng.choose(&candidates).expect("checked non-empty");
        dig_tunnel(level, rooms[i].center(), rooms[j].center(), rng);
        rooms[i].connected = true;
        last = i;
    }

    (first, last)
}
