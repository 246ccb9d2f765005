//! Drawing collaborators fed from simulation snapshots

use super::road_network::RoadSnapshot;
use super::scheduler::FrameTiming;
use super::vehicle::VehicleSnapshot;

/// Consumes snapshots once per frame
pub trait Renderer {
    fn draw(&mut self, timing: &FrameTiming, roads: &[RoadSnapshot], vehicles: &[VehicleSnapshot]);
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _: &FrameTiming, _: &[RoadSnapshot], _: &[VehicleSnapshot]) {}
}

/// Prints an ASCII map of the network to stdout at a fixed cadence
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    columns: usize,
    rows: usize,
    /// Minimum time between printed maps
    interval_ms: f64,
    last_drawn: Option<f64>,
}

impl TerminalRenderer {
    pub fn new(columns: usize, rows: usize, interval_ms: f64) -> Self {
        Self {
            columns: columns.max(2),
            rows: rows.max(2),
            interval_ms,
            last_drawn: None,
        }
    }

    /// Rasterises roads and vehicle centers onto a character grid
    pub fn render_to_string(&self, roads: &[RoadSnapshot], vehicles: &[VehicleSnapshot]) -> String {
        let mut grid = vec![vec![' '; self.columns]; self.rows];

        let Some((min_x, min_y, max_x, max_y)) = extent(roads) else {
            return String::new();
        };
        let span_x = (max_x - min_x).max(1.0);
        let span_y = (max_y - min_y).max(1.0);

        let to_grid = |x: f32, y: f32| -> (i32, i32) {
            let col = ((x - min_x) / span_x * (self.columns - 1) as f32).round() as i32;
            let row = ((y - min_y) / span_y * (self.rows - 1) as f32).round() as i32;
            (row, col)
        };

        for road in roads {
            let (start_row, start_col) = to_grid(road.x1, road.y1);
            let (end_row, end_col) = to_grid(road.x2, road.y2);
            let glyph = if road.active { '.' } else { ',' };

            // Bresenham line
            let dx = (end_col - start_col).abs();
            let dy = (end_row - start_row).abs();
            let sx = if start_col < end_col { 1 } else { -1 };
            let sy = if start_row < end_row { 1 } else { -1 };
            let mut err = dx - dy;
            let (mut x, mut y) = (start_col, start_row);

            loop {
                plot(&mut grid, y, x, glyph);
                if x == end_col && y == end_row {
                    break;
                }
                let e2 = 2 * err;
                if e2 > -dy {
                    err -= dy;
                    x += sx;
                }
                if e2 < dx {
                    err += dx;
                    y += sy;
                }
            }
        }

        for road in roads {
            let (row, col) = to_grid(road.x1, road.y1);
            plot(&mut grid, row, col, '+');
        }

        for vehicle in vehicles {
            let (row, col) = to_grid(vehicle.center.x, vehicle.center.y);
            plot(&mut grid, row, col, 'C');
        }

        grid.iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(60, 24, 1000.0)
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, timing: &FrameTiming, roads: &[RoadSnapshot], vehicles: &[VehicleSnapshot]) {
        if self
            .last_drawn
            .is_some_and(|last| timing.running - last < self.interval_ms)
        {
            return;
        }
        self.last_drawn = Some(timing.running);

        println!("=== t = {:.0} ms, {} vehicles ===", timing.running, vehicles.len());
        println!("{}", self.render_to_string(roads, vehicles));
        println!();
    }
}

fn extent(roads: &[RoadSnapshot]) -> Option<(f32, f32, f32, f32)> {
    let first = roads.first()?;
    let init = (
        first.x1.min(first.x2),
        first.y1.min(first.y2),
        first.x1.max(first.x2),
        first.y1.max(first.y2),
    );
    Some(roads.iter().fold(init, |(min_x, min_y, max_x, max_y), r| {
        (
            min_x.min(r.x1).min(r.x2),
            min_y.min(r.y1).min(r.y2),
            max_x.max(r.x1).max(r.x2),
            max_y.max(r.y1).max(r.y2),
        )
    }))
}

fn plot(grid: &mut [Vec<char>], row: i32, col: i32, glyph: char) {
    if row < 0 || col < 0 {
        return;
    }
    if let Some(cell) = grid
        .get_mut(row as usize)
        .and_then(|line| line.get_mut(col as usize))
    {
        *cell = glyph;
    }
}
