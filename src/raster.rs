use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};
use ttf_parser::{Face, OutlineBuilder};

static SYSTEM_FONTS: Lazy<Database> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    db
});

/// Padding around rendered text, in pixels.
const RASTER_PAD: f64 = 10.0;
const BLOCK_ADVANCE: f64 = 0.6;
const BLOCK_ASCENT: f64 = 0.7;
const MISSING_GLYPH_ADVANCE: f64 = 0.56;

/// Alpha-channel bitmap of one label rendering.
///
/// `origin` is the pixel position of the text origin: the left end of the first
/// line's baseline. Line `i` has its baseline `font_size * i` below it.
#[derive(Debug, Clone)]
pub struct GlyphRaster {
    pub width: u32,
    pub height: u32,
    pub alpha: Vec<u8>,
    pub origin: (f64, f64),
}

impl GlyphRaster {
    pub fn blank(width: u32, height: u32, origin: (f64, f64)) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
            origin,
        }
    }

    fn from_pixmap(pixmap: &Pixmap, origin: (f64, f64)) -> Self {
        let alpha = pixmap.data().chunks_exact(4).map(|px| px[3]).collect();
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            alpha,
            origin,
        }
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[(y * self.width + x) as usize]
    }

    pub fn ink_pixels(&self) -> usize {
        self.alpha.iter().filter(|a| **a > 0).count()
    }
}

/// Single-line text extent used by the unoptimized centroid placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub ascent: f64,
}

/// Renders label lines to alpha rasters. Identical input must give identical output.
pub trait GlyphRasterizer: Send + Sync {
    fn rasterize(&self, lines: &[String], font_family: &str, font_size: f64) -> GlyphRaster;
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> TextExtent;
}

/// Font-free rasterizer: every non-whitespace character is a solid block.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRasterizer;

impl GlyphRasterizer for BlockRasterizer {
    fn rasterize(&self, lines: &[String], _font_family: &str, font_size: f64) -> GlyphRaster {
        let widths: Vec<f64> = lines
            .iter()
            .map(|line| block_width(line, font_size))
            .collect();
        let Some((mut pixmap, origin)) = canvas_for(&widths, font_size) else {
            return GlyphRaster::blank(0, 0, (0.0, 0.0));
        };
        let paint = ink_paint(false);
        for (idx, line) in lines.iter().enumerate() {
            let baseline = origin.1 + font_size * idx as f64;
            let mut pen = origin.0;
            for ch in line.chars() {
                let advance = font_size * BLOCK_ADVANCE;
                if !ch.is_whitespace() {
                    fill_block(&mut pixmap, &paint, pen, baseline, advance, font_size);
                }
                pen += advance;
            }
        }
        GlyphRaster::from_pixmap(&pixmap, origin)
    }

    fn measure(&self, text: &str, _font_family: &str, font_size: f64) -> TextExtent {
        TextExtent {
            width: block_width(text, font_size),
            ascent: font_size * BLOCK_ASCENT,
        }
    }
}

/// Rasterizes glyph outlines of a system font. Families that cannot be resolved
/// fall back to block glyphs so labels always produce ink.
#[derive(Default)]
pub struct FontRasterizer {
    cache: Mutex<HashMap<String, Option<Arc<FontData>>>>,
}

struct FontData {
    bytes: Vec<u8>,
    index: u32,
}

impl FontRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn font(&self, font_family: &str) -> Option<Arc<FontData>> {
        let key = normalize_family_key(font_family);
        let mut guard = self.cache.lock().ok()?;
        if let Some(entry) = guard.get(&key) {
            return entry.clone();
        }
        let loaded = load_font(font_family).map(Arc::new);
        if loaded.is_none() {
            tracing::debug!(family = %key, "font family not found, using block glyphs");
        }
        guard.insert(key, loaded.clone());
        loaded
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn rasterize(&self, lines: &[String], font_family: &str, font_size: f64) -> GlyphRaster {
        let Some(font) = self.font(font_family) else {
            return BlockRasterizer.rasterize(lines, font_family, font_size);
        };
        let Ok(face) = Face::parse(&font.bytes, font.index) else {
            return BlockRasterizer.rasterize(lines, font_family, font_size);
        };
        let widths: Vec<f64> = lines
            .iter()
            .map(|line| face_width(&face, line, font_size))
            .collect();
        let Some((mut pixmap, origin)) = canvas_for(&widths, font_size) else {
            return GlyphRaster::blank(0, 0, (0.0, 0.0));
        };
        let paint = ink_paint(true);
        let scale = font_size / face.units_per_em().max(1) as f64;
        for (idx, line) in lines.iter().enumerate() {
            let baseline = origin.1 + font_size * idx as f64;
            let mut pen = origin.0;
            let mut builder = PathBuilder::new();
            for ch in line.chars() {
                let Some(glyph) = face.glyph_index(ch) else {
                    let advance = font_size * MISSING_GLYPH_ADVANCE;
                    if !ch.is_whitespace() {
                        fill_block(&mut pixmap, &paint, pen, baseline, advance, font_size);
                    }
                    pen += advance;
                    continue;
                };
                let mut sink = OutlineSink {
                    builder: &mut builder,
                    x: pen as f32,
                    y: baseline as f32,
                    scale: scale as f32,
                };
                face.outline_glyph(glyph, &mut sink);
                pen += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
            }
            if let Some(path) = builder.finish() {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        GlyphRaster::from_pixmap(&pixmap, origin)
    }

    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> TextExtent {
        let Some(font) = self.font(font_family) else {
            return BlockRasterizer.measure(text, font_family, font_size);
        };
        let Ok(face) = Face::parse(&font.bytes, font.index) else {
            return BlockRasterizer.measure(text, font_family, font_size);
        };
        let scale = font_size / face.units_per_em().max(1) as f64;
        TextExtent {
            width: face_width(&face, text, font_size),
            ascent: face.ascender() as f64 * scale,
        }
    }
}

struct OutlineSink<'a> {
    builder: &'a mut PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
}

impl OutlineSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for OutlineSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn face_width(face: &Face<'_>, text: &str, font_size: f64) -> f64 {
    let scale = font_size / face.units_per_em().max(1) as f64;
    let mut width = 0.0;
    for ch in text.chars() {
        match face.glyph_index(ch) {
            Some(glyph) => width += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale,
            None => width += font_size * MISSING_GLYPH_ADVANCE,
        }
    }
    width.max(0.0)
}

fn block_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * BLOCK_ADVANCE
}

fn canvas_for(widths: &[f64], font_size: f64) -> Option<(Pixmap, (f64, f64))> {
    let max_width = widths.iter().copied().fold(0.0, f64::max);
    let lines = widths.len().max(1) as f64;
    let baseline = RASTER_PAD + font_size;
    let width = (max_width + font_size + RASTER_PAD * 2.0).ceil() as u32;
    let height = (baseline + font_size * lines + RASTER_PAD).ceil() as u32;
    let pixmap = Pixmap::new(width.max(1), height.max(1))?;
    Some((pixmap, (RASTER_PAD, baseline)))
}

fn ink_paint(anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = anti_alias;
    paint
}

fn fill_block(pixmap: &mut Pixmap, paint: &Paint<'_>, pen: f64, baseline: f64, advance: f64, font_size: f64) {
    let inset = advance * 0.1;
    let height = font_size * BLOCK_ASCENT;
    if let Some(rect) = Rect::from_xywh(
        (pen + inset) as f32,
        (baseline - height) as f32,
        (advance - inset * 2.0) as f32,
        height as f32,
    ) {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn load_font(font_family: &str) -> Option<FontData> {
    #[derive(Clone, Copy)]
    enum FamilyToken {
        Generic(Family<'static>),
        Name(usize),
    }

    let mut names: Vec<String> = Vec::new();
    let mut order: Vec<FamilyToken> = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        match raw.to_ascii_lowercase().as_str() {
            "serif" => order.push(FamilyToken::Generic(Family::Serif)),
            "sans-serif" | "system-ui" => order.push(FamilyToken::Generic(Family::SansSerif)),
            "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
            "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
            "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
            _ => {
                order.push(FamilyToken::Name(names.len()));
                names.push(raw.to_string());
            }
        }
    }
    if order.is_empty() {
        order.push(FamilyToken::Generic(Family::SansSerif));
    }
    let families: Vec<Family<'_>> = order
        .iter()
        .map(|token| match *token {
            FamilyToken::Generic(family) => family,
            FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
        })
        .collect();

    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = SYSTEM_FONTS.query(&query)?;
    SYSTEM_FONTS.with_face_data(id, |data, index| FontData {
        bytes: data.to_vec(),
        index,
    })
}
