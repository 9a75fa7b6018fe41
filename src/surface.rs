use crate::palette::Rgb;
use std::ops::{Deref, DerefMut};

/// How new paint combines with what is already on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Erases existing content in proportion to the source alpha.
    DestinationOut,
    /// Adds source to destination, so overlapping glows brighten.
    Lighter,
}

/// A 2D drawing context in world coordinates.
///
/// Style setters persist until changed or until a `restore()` pops the
/// state pushed by the matching `save()`.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn resize(&mut self, width: u32, height: u32);

    fn save(&mut self);
    fn restore(&mut self);

    fn set_composite(&mut self, op: Composite);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_fill(&mut self, color: Rgb);
    fn set_shadow(&mut self, blur: f32, color: Rgb);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32);
}

/// Saves the surface state on creation and restores it on drop.
pub struct Scoped<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> Scoped<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Drop for Scoped<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

impl<S: Surface + ?Sized> Deref for Scoped<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for Scoped<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Style {
    composite: Composite,
    global_alpha: f32,
    fill: Rgb,
    shadow_blur: f32,
    shadow_color: Rgb,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            composite: Composite::SourceOver,
            global_alpha: 1.0,
            fill: Rgb::BLACK,
            shadow_blur: 0.0,
            shadow_color: Rgb::BLACK,
        }
    }
}

// Glow is dimmer than the body it surrounds
const GLOW_STRENGTH: f32 = 0.5;

/// Premultiplied RGBA raster covering a `width` x `height` viewport.
///
/// Each raster pixel spans `cell` world units on both axes, which maps one
/// pixel onto one half-block of a terminal cell.
pub struct Canvas {
    width: u32,
    height: u32,
    cell: u32,
    cols: usize,
    rows: usize,
    pixels: Vec<[f32; 4]>,
    style: Style,
    stack: Vec<Style>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let cols = width.div_ceil(cell) as usize;
        let rows = height.div_ceil(cell) as usize;
        Self {
            width,
            height,
            cell,
            cols,
            rows,
            pixels: vec![[0.0; 4]; cols * rows],
            style: Style::default(),
            stack: Vec::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Premultiplied `[r, g, b, a]` at a raster position.
    pub fn pixel(&self, col: usize, row: usize) -> [f32; 4] {
        self.pixels[row * self.cols + col]
    }

    pub fn composite(&self) -> Composite {
        self.style.composite
    }

    fn blend(&mut self, idx: usize, color: Rgb, alpha: f32) {
        let [r, g, b] = color.to_unit();
        let src = [r * alpha, g * alpha, b * alpha, alpha];
        let dst = &mut self.pixels[idx];

        match self.style.composite {
            Composite::SourceOver => {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = s + *d * (1.0 - alpha);
                }
            }
            Composite::DestinationOut => {
                for d in dst.iter_mut() {
                    *d *= 1.0 - alpha;
                }
            }
            Composite::Lighter => {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = (*d + s).min(1.0);
                }
            }
        }
    }

    /// Clamps a raster interval `[start, end)` to `0..limit`.
    fn span(start: f32, end: f32, limit: usize) -> std::ops::Range<usize> {
        let start = start.max(0.0) as usize;
        let end = end.clamp(0.0, limit as f32) as usize;
        start.min(end)..end
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        // Contents are dropped, the style stack survives
        self.width = width;
        self.height = height;
        self.cols = width.div_ceil(self.cell) as usize;
        self.rows = height.div_ceil(self.cell) as usize;
        self.pixels = vec![[0.0; 4]; self.cols * self.rows];
    }

    fn save(&mut self) {
        self.stack.push(self.style);
    }

    fn restore(&mut self) {
        if let Some(style) = self.stack.pop() {
            self.style = style;
        }
    }

    fn set_composite(&mut self, op: Composite) {
        self.style.composite = op;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.style.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_fill(&mut self, color: Rgb) {
        self.style.fill = color;
    }

    fn set_shadow(&mut self, blur: f32, color: Rgb) {
        self.style.shadow_blur = blur.max(0.0);
        self.style.shadow_color = color;
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let alpha = self.style.global_alpha;
        let fill = self.style.fill;
        let cell = self.cell as f32;
        let cols = Self::span((x / cell).floor(), ((x + w) / cell).ceil(), self.cols);
        let rows = Self::span((y / cell).floor(), ((y + h) / cell).ceil(), self.rows);

        for row in rows {
            for col in cols.clone() {
                self.blend(row * self.cols + col, fill, alpha);
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32) {
        let Style {
            global_alpha,
            fill,
            shadow_blur,
            shadow_color,
            ..
        } = self.style;
        if global_alpha <= 0.0 {
            return;
        }

        let cell = self.cell as f32;
        // Anything smaller than a pixel still lights the pixel it sits in
        let core = radius.max(cell * 0.5);
        let reach = core + shadow_blur;
        let home = ((x / cell).floor(), (y / cell).floor());

        let cols = Self::span(
            ((x - reach) / cell).floor(),
            ((x + reach) / cell).floor() + 1.0,
            self.cols,
        );
        let rows = Self::span(
            ((y - reach) / cell).floor(),
            ((y + reach) / cell).floor() + 1.0,
            self.rows,
        );

        for row in rows {
            for col in cols.clone() {
                let cx = (col as f32 + 0.5) * cell;
                let cy = (row as f32 + 0.5) * cell;
                let dist = ((cx - x).powi(2) + (cy - y).powi(2)).sqrt();
                let idx = row * self.cols + col;

                if dist <= core || (col as f32, row as f32) == home {
                    self.blend(idx, fill, global_alpha);
                } else if shadow_blur > 0.0 && dist < reach {
                    let falloff = 1.0 - (dist - core) / shadow_blur;
                    self.blend(idx, shadow_color, global_alpha * falloff * GLOW_STRENGTH);
                }
            }
        }
    }
}
