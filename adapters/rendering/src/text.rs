//! Plain-text backend drawing one character per cell.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use tilewalk_core::CellCoord;

use crate::{RenderItem, RenderingBackend, Scene};

const EMPTY_CELL: char = '.';

/// Writes each frame as a character grid.
///
/// Entities are drawn as their id in base 36, wrapping after `z`.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing frames to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the backend, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn glyph(item: &RenderItem) -> char {
    char::from_digit(item.entity.get() % 36, 36).unwrap_or('?')
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        let grid = scene.tile_grid;
        let mut frame = String::with_capacity(
            usize::try_from(grid.columns.saturating_add(1).saturating_mul(grid.rows)).unwrap_or(0) + 16,
        );
        frame.push_str(&format!("tick {}\n", scene.tick));
        for row in 0..grid.rows {
            for column in 0..grid.columns {
                let cell = CellCoord::new(column, row);
                frame.push(scene.topmost_at(cell).map_or(EMPTY_CELL, glyph));
            }
            frame.push('\n');
        }

        self.writer
            .write_all(frame.as_bytes())
            .context("failed to write text frame")?;
        self.writer.flush().context("failed to flush text frame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileGridPresentation;
    use glam::Vec2;
    use tilewalk_core::{Direction, EntityId, RenderGroup};

    #[test]
    fn frames_mark_occupied_cells() {
        let grid = TileGridPresentation::new(3, 2, 8.0).expect("valid grid");
        let items = [(0, CellCoord::new(0, 0)), (11, CellCoord::new(2, 1))]
            .into_iter()
            .map(|(id, cell)| RenderItem {
                entity: EntityId::new(id),
                sprite: String::from("npc"),
                cell,
                position: Vec2::ZERO,
                size: Vec2::splat(8.0),
                direction: Direction::Down,
                render_group: RenderGroup::Entity,
            })
            .collect();
        let scene = Scene::new(grid, 4, items);
        let mut backend = TextBackend::new(Vec::new());

        backend.present(&scene).expect("writing to a vec succeeds");

        let output = String::from_utf8(backend.into_inner()).expect("ascii output");
        assert_eq!(output, "tick 4\n0..\n..b\n");
    }
}
