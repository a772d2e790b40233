//! Raster drawing primitives over one canvas layer.
//!
//! Every primitive funnels its writes through [`DrawEngine::can_draw`]. A
//! point failing the gate (no layers, bad or hidden layer, outside the layer,
//! outside the selection) is skipped silently: dragging a tool off the edge is
//! routine, not an error. All primitives return the number of cells changed.

use super::canvas::Canvas;
use crate::util::{Point, Rect};

/// Neighbourhood used by flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only.
    #[default]
    FourWay,
    /// Edge and corner neighbours.
    EightWay,
}

const FOUR_WAY: [Point; 4] = [
    Point::new(0, -1),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(-1, 0),
];

const EIGHT_WAY: [Point; 8] = [
    Point::new(0, -1),
    Point::new(1, -1),
    Point::new(1, 0),
    Point::new(1, 1),
    Point::new(0, 1),
    Point::new(-1, 1),
    Point::new(-1, 0),
    Point::new(-1, -1),
];

impl Connectivity {
    fn neighbours(self) -> &'static [Point] {
        match self {
            Connectivity::FourWay => &FOUR_WAY,
            Connectivity::EightWay => &EIGHT_WAY,
        }
    }
}

/// Draws into a single target layer, optionally clipped to a selection.
///
/// Points are in canvas space. `None` as the character erases.
pub struct DrawEngine<'a> {
    canvas: &'a mut Canvas,
    layer: usize,
    selection: Option<Rect>,
}

impl<'a> DrawEngine<'a> {
    pub fn new(canvas: &'a mut Canvas, layer: usize) -> Self {
        Self {
            canvas,
            layer,
            selection: None,
        }
    }

    /// Restricts drawing to `selection` (canvas space) when present.
    pub fn with_selection(mut self, selection: Option<Rect>) -> Self {
        self.selection = selection;
        self
    }

    /// The can-draw gate shared by every primitive.
    pub fn can_draw(&self, point: Point) -> bool {
        let Some(layer) = self.canvas.layers().get(self.layer) else {
            return false;
        };
        if !layer.is_visible() {
            return false;
        }
        let Some(local) = point.checked_sub(layer.offset()) else {
            return false;
        };
        if !layer.is_point_visible(local.x, local.y) {
            return false;
        }
        self.selection.is_none_or(|selection| selection.contains(point))
    }

    /// Canvas-space rectangle holding every point the gate can accept: the
    /// target layer's bounds clipped to the selection.
    fn drawable_area(&self) -> Option<Rect> {
        let layer = self.canvas.layers().get(self.layer)?;
        let bounds = layer.bounds();
        if !layer.is_visible() || !bounds.is_valid() {
            return None;
        }
        match self.selection {
            Some(selection) => bounds.intersection(&selection),
            None => Some(bounds),
        }
    }

    /// Current value of the target layer's cell, or `None` when the point is
    /// outside the layer.
    fn layer_cell(&self, point: Point) -> Option<Option<char>> {
        let layer = self.canvas.layers().get(self.layer)?;
        let local = point.checked_sub(layer.offset())?;
        layer
            .is_point_visible(local.x, local.y)
            .then(|| layer.get_character(local.x, local.y))
    }

    /// Writes one cell if the gate allows and the value differs.
    pub fn point(&mut self, point: Point, ch: Option<char>) -> usize {
        if !self.can_draw(point) {
            return 0;
        }
        // The gate has already validated the layer index.
        match self.canvas.set_character(self.layer, point.x, point.y, ch) {
            Ok(true) => 1,
            Ok(false) | Err(_) => 0,
        }
    }

    /// Writes the cell at `(x, y)` when it is representable as a [`Point`].
    fn point_at(&mut self, x: i64, y: i64, ch: Option<char>) -> usize {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => self.point(Point::new(x, y), ch),
            _ => 0,
        }
    }

    /// Bresenham line from `from` to `to`, stamping a filled circle of radius
    /// `thickness` at every traced point.
    pub fn line(&mut self, from: Point, to: Point, thickness: i32, ch: Option<char>) -> usize {
        let Some(area) = self.drawable_area() else {
            return 0;
        };
        let reach = i64::from(thickness.max(0));
        let (x1, y1) = (i64::from(to.x), i64::from(to.y));
        let (mut x, mut y) = (i64::from(from.x), i64::from(from.y));
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut changed = 0;

        loop {
            // Traced points stay between the endpoints, so they fit in i32.
            changed += self.filled_circle(Point::new(x as i32, y as i32), thickness, ch);
            // Both axes move monotonically, so once a stamp clears the
            // drawable area it can never come back.
            let past_x = if sx > 0 {
                x - reach >= i64::from(area.right())
            } else {
                x + reach < i64::from(area.x)
            };
            let past_y = if sy > 0 {
                y - reach >= i64::from(area.bottom())
            } else {
                y + reach < i64::from(area.y)
            };
            if (x == x1 && y == y1) || past_x || past_y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        changed
    }

    /// Midpoint circle outline.
    pub fn circle(&mut self, center: Point, radius: i32, ch: Option<char>) -> usize {
        if radius < 0 {
            return 0;
        }
        if radius == 0 {
            return self.point(center, ch);
        }
        let Some(area) = self.drawable_area() else {
            return 0;
        };
        let r = i64::from(radius);
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        if cx + r < i64::from(area.x)
            || cx - r >= i64::from(area.right())
            || cy + r < i64::from(area.y)
            || cy - r >= i64::from(area.bottom())
        {
            return 0;
        }
        // Every plotted point lies at least `r - 1` from the center.
        let farthest = [
            (area.x, area.y),
            (area.right() - 1, area.y),
            (area.x, area.bottom() - 1),
            (area.right() - 1, area.bottom() - 1),
        ]
        .into_iter()
        .map(|(x, y)| {
            let (dx, dy) = (i128::from(x) - i128::from(cx), i128::from(y) - i128::from(cy));
            dx * dx + dy * dy
        })
        .max()
        .unwrap_or_default();
        if farthest < i128::from(r - 1).pow(2) {
            return 0;
        }

        let mut x = 0i64;
        let mut y = r;
        let mut d = 3 - 2 * r;
        let mut changed = 0;
        while y >= x {
            changed += self.plot_octants(cx, cy, x, y, ch);
            x += 1;
            if d > 0 {
                y -= 1;
                d += 4 * (x - y) + 10;
            } else {
                d += 4 * x + 6;
            }
        }
        changed
    }

    fn plot_octants(&mut self, cx: i64, cy: i64, x: i64, y: i64, ch: Option<char>) -> usize {
        [
            (x, y),
            (-x, y),
            (x, -y),
            (-x, -y),
            (y, x),
            (-y, x),
            (y, -x),
            (-y, -x),
        ]
        .into_iter()
        .map(|(dx, dy)| self.point_at(cx + dx, cy + dy, ch))
        .sum()
    }

    /// Solid disk. Radius 1 is a plus shape; from radius 2 up the disk is
    /// open (`dx² + dy² < r²`), so boundary cells are left out.
    ///
    /// Only the part of the bounding square inside the drawable area is
    /// scanned.
    pub fn filled_circle(&mut self, center: Point, radius: i32, ch: Option<char>) -> usize {
        match radius {
            r if r < 0 => 0,
            0 => self.point(center, ch),
            1 => std::iter::once(Point::ORIGIN)
                .chain(FOUR_WAY)
                .map(|delta| {
                    center
                        .checked_add(delta)
                        .map_or(0, |point| self.point(point, ch))
                })
                .sum(),
            r => {
                let Some(area) = self.drawable_area() else {
                    return 0;
                };
                let r = i64::from(r);
                let (cx, cy) = (i64::from(center.x), i64::from(center.y));
                let left = (cx - r).max(i64::from(area.x));
                let right = (cx + r).min(i64::from(area.right()) - 1);
                let top = (cy - r).max(i64::from(area.y));
                let bottom = (cy + r).min(i64::from(area.bottom()) - 1);

                let mut changed = 0;
                for y in top..=bottom {
                    for x in left..=right {
                        let (dx, dy) = (x - cx, y - cy);
                        if dx * dx + dy * dy < r * r {
                            changed += self.point_at(x, y, ch);
                        }
                    }
                }
                changed
            }
        }
    }

    /// Fills the half-open rectangle `[left, right) x [top, bottom)`.
    pub fn filled_rect(&mut self, rect: Rect, ch: Option<char>) -> usize {
        let Some(clip) = self
            .drawable_area()
            .and_then(|area| area.intersection(&rect))
        else {
            return 0;
        };
        let mut changed = 0;
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                changed += self.point(Point::new(x, y), ch);
            }
        }
        changed
    }

    /// Draws the border cells of the half-open rectangle.
    pub fn rect_outline(&mut self, rect: Rect, ch: Option<char>) -> usize {
        if !rect.is_valid() {
            return 0;
        }
        let Some(area) = self.drawable_area() else {
            return 0;
        };
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        let mut changed = 0;
        for x in left.max(area.x)..=right.min(area.right() - 1) {
            changed += self.point(Point::new(x, top), ch);
            changed += self.point(Point::new(x, bottom), ch);
        }
        for y in top.saturating_add(1).max(area.y)..bottom.min(area.bottom()) {
            changed += self.point(Point::new(left, y), ch);
            changed += self.point(Point::new(right, y), ch);
        }
        changed
    }

    /// Replaces the contiguous region of the seed's value with `replacement`.
    ///
    /// The target is the target layer's own cell at the seed, so empty
    /// regions can be filled too. Uses an explicit stack; each cell is written
    /// before its neighbours are examined, so no cell is visited twice.
    pub fn flood_fill(
        &mut self,
        seed: Point,
        replacement: Option<char>,
        connectivity: Connectivity,
    ) -> usize {
        if !self.can_draw(seed) {
            return 0;
        }
        let Some(target) = self.layer_cell(seed) else {
            return 0;
        };
        if target == replacement {
            return 0;
        }

        let mut changed = self.point(seed, replacement);
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            for &delta in connectivity.neighbours() {
                let Some(next) = current.checked_add(delta) else {
                    continue;
                };
                if self.layer_cell(next) == Some(target) && self.can_draw(next) {
                    changed += self.point(next, replacement);
                    stack.push(next);
                }
            }
        }
        changed
    }

    /// Stamps text left to right from `origin`; `\n` starts a new row at the
    /// origin column. Every other character, spaces included, is written.
    pub fn text(&mut self, origin: Point, text: &str) -> usize {
        let (mut x, mut y) = (i64::from(origin.x), i64::from(origin.y));
        let mut changed = 0;
        for ch in text.chars() {
            match ch {
                '\n' => {
                    x = i64::from(origin.x);
                    y += 1;
                }
                '\r' => {}
                ch => {
                    changed += self.point_at(x, y, Some(ch));
                    x += 1;
                }
            }
        }
        changed
    }
}
