//! Read-only snapshots for a rendering layer.
//!
//! The core never draws; it hands out plain data (glyphs, colors, status
//! values, queued messages) and lets whatever front end exists compose the
//! screen. The ASCII renderer here is enough for a headless driver.

use serde::{Deserialize, Serialize};

use crate::colors::Color;
use crate::geometry::Point;
use crate::unit::Burden;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileView {
    pub glyph: char,
    pub visible: bool,
    pub explored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub pos: Point,
    pub glyph: char,
    pub color: Color,
    pub name: String,
}

/// Plain values for the status line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLine {
    pub hp: i32,
    pub max_hp: i32,
    pub armor_class: i32,
    pub attack: String,
    pub depth: usize,
    pub burden: Burden,
    pub turn: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub width: usize,
    pub height: usize,
    /// Indexed `[x][y]`, like the level's tile grid
    pub tiles: Vec<Vec<TileView>>,
    /// Visible items and units, player last so it draws on top
    pub entities: Vec<EntityView>,
    pub status: StatusLine,
    /// Messages accumulated since the last snapshot
    pub messages: Vec<String>,
}

impl LevelSnapshot {
    /// Compose the whole screen as text, one string per call
    pub fn render_ascii(&self) -> String {
        let mut grid: Vec<Vec<char>> = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let t = &self.tiles[x][y];
                        if t.visible || t.explored { t.glyph } else { ' ' }
                    })
                    .collect()
            })
            .collect();

        for entity in &self.entities {
            let (x, y) = (entity.pos.x as usize, entity.pos.y as usize);
            if y < self.height && x < self.width {
                grid[y][x] = entity.glyph;
            }
        }

        let mut out = String::new();
        for row in &grid {
            out.extend(row.iter());
            out.push('\n');
        }
        out.push_str(&format!(
            "HP {}/{}  AC {}  Atk {}  Depth {}  T{} {}\n",
            self.status.hp,
            self.status.max_hp,
            self.status.armor_class,
            self.status.attack,
            self.status.depth + 1,
            self.status.turn,
            self.status.burden,
        ));
        for msg in &self.messages {
            out.push_str(msg);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_hides_unexplored() {
        let tiles = vec![
            vec![
                TileView {
                    glyph: '#',
                    visible: true,
                    explored: true,
                };
                2
            ];
            2
        ];
        let mut snapshot = LevelSnapshot {
            width: 2,
            height: 2,
            tiles,
            entities: vec![EntityView {
                pos: Point::new(1, 0),
                glyph: '@',
                color: Color::White,
                name: "you".into(),
            }],
            status: StatusLine {
                hp: 10,
                max_hp: 10,
                armor_class: 11,
                attack: "1d2".into(),
                depth: 0,
                burden: Burden::Light,
                turn: 1,
            },
            messages: vec!["Hello.".into()],
        };

        let text = snapshot.render_ascii();
        assert!(text.starts_with("#@\n##\n"));
        assert!(text.contains("HP 10/10"));
        assert!(text.contains("Hello."));

        snapshot.tiles[0][0].visible = false;
        snapshot.tiles[0][0].explored = false;
        let text = snapshot.render_ascii();
        assert!(text.starts_with(" @\n"));
    }
}
