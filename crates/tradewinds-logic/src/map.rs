//! Colony map cells. The map itself is produced elsewhere; the core only
//! reads terrain and deposit tags when validating and resolving buildings.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

impl Position {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Plains,
    Forest,
    Hills,
    Mountains,
    Coast,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    /// Mineable resource under this cell, if any.
    pub deposit: Option<ResourceKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyMap {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl ColonyMap {
    /// A uniform map; callers paint terrain and deposits afterwards.
    pub fn filled(width: u16, height: u16, terrain: Terrain) -> Self {
        Self {
            width,
            height,
            cells: vec![
                Cell {
                    terrain,
                    deposit: None,
                };
                width as usize * height as usize
            ],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        if let Some(i) = self.index(pos) {
            self.cells[i].terrain = terrain;
        }
    }

    pub fn set_deposit(&mut self, pos: Position, deposit: Option<ResourceKind>) {
        if let Some(i) = self.index(pos) {
            self.cells[i].deposit = deposit;
        }
    }
}
