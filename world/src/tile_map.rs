//! Solid/open tile grid rasterized from a level's rooms and corridors.

use infiltration_core::{Tile, TileMapView, TileRect};

/// Dense row-major tile grid owned by a running mission.
///
/// Cells default to [`Tile::Solid`]; every room and corridor rectangle is
/// carved open. Rectangles may overlap and the order in which they are applied
/// does not affect the result.
#[derive(Clone, Debug)]
pub(crate) struct TileMap {
    columns: u32,
    rows: u32,
    tile_size: f32,
    cells: Vec<Tile>,
}

impl TileMap {
    /// Rasterizes the provided open areas into a fresh grid.
    pub(crate) fn generate<'a, I>(columns: u32, rows: u32, tile_size: f32, open_areas: I) -> Self
    where
        I: IntoIterator<Item = &'a TileRect>,
    {
        // Bounded by `LevelConfig::validate`, so the product fits in usize.
        let capacity = columns as usize * rows as usize;
        let mut map = Self {
            columns,
            rows,
            tile_size,
            cells: vec![Tile::Solid; capacity],
        };

        for area in open_areas {
            map.carve(area);
        }

        map
    }

    fn carve(&mut self, area: &TileRect) {
        let column_end = area
            .column()
            .saturating_add(area.width())
            .min(self.columns);
        let row_end = area.row().saturating_add(area.height()).min(self.rows);

        for row in area.row()..row_end {
            for column in area.column()..column_end {
                if let Some(index) = self.index(column, row) {
                    self.cells[index] = Tile::Open;
                }
            }
        }
    }

    fn index(&self, column: u32, row: u32) -> Option<usize> {
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Read-only view used by collision, sight and rendering.
    pub(crate) fn view(&self) -> TileMapView<'_> {
        TileMapView::new(&self.cells, self.columns, self.rows, self.tile_size)
    }
}
