use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;

/// Row-major 2D affine transform `[a, b, c, d, e, f]`:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub m: [f32; 6],
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn then_translate(self, dx: f32, dy: f32) -> Self {
        let [a, b, c, d, e, f] = self.m;
        Self {
            m: [a, b, c, d, e + dx, f + dy],
        }
    }

    pub fn then_scale(self, sx: f32, sy: f32) -> Self {
        let [a, b, c, d, e, f] = self.m;
        Self {
            m: [a * sx, b * sy, c * sx, d * sy, e * sx, f * sy],
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.m;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level, 255)
    }

    fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// The rendering-surface collaborator. The runtime owns exactly one live
/// surface and resets its transform after every draw invocation; everything
/// else here exists for sketches and drawing code, not for the runtime.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn transform(&self) -> Transform2D;
    fn set_transform(&mut self, transform: Transform2D);

    /// Returns the transform to identity. Any persistent base transform a
    /// host set up is erased with it; see the runtime design notes.
    fn reset_transform(&mut self) {
        self.set_transform(Transform2D::IDENTITY);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        let transform = self.transform().then_translate(dx, dy);
        self.set_transform(transform);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        let transform = self.transform().then_scale(sx, sy);
        self.set_transform(transform);
    }

    /// Restores the default style state and identity transform.
    fn apply_default_styles(&mut self);

    fn set_fill(&mut self, color: Rgba);
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn pixel(&self, x: u32, y: u32) -> Option<Rgba>;
    fn pixels(&self) -> &[u8];
}

pub trait SurfaceFactory {
    fn create_surface(&mut self, width: u32, height: u32) -> Box<dyn Surface>;
}

/// CPU raster surface: RGBA8 buffer plus transform and style state. Enough
/// to exercise sketches end to end without a GPU; hosts with real render
/// targets supply their own `Surface`.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    transform: Transform2D,
    fill: Rgba,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            transform: Transform2D::IDENTITY,
            fill: Rgba::WHITE,
        }
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn transform(&self) -> Transform2D {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
    }

    fn apply_default_styles(&mut self) {
        self.transform = Transform2D::IDENTITY;
        self.fill = Rgba::WHITE;
    }

    fn set_fill(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn clear(&mut self, color: Rgba) {
        let bytes = color.to_bytes();
        for pixel in
            bytemuck::cast_slice_mut::<u8, [u8; 4]>(&mut self.pixels)
        {
            *pixel = bytes;
        }
    }

    /// Axis-aligned fill through the current transform's translation and
    /// scale components. Rotation/shear is left to richer drawing backends.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x0, y0) = self.transform.apply(x, y);
        let (x1, y1) = self.transform.apply(x + w, y + h);

        let left = x0.min(x1).floor().max(0.0) as u32;
        let top = y0.min(y1).floor().max(0.0) as u32;
        let right = (x0.max(x1).ceil() as i64).clamp(0, self.width as i64);
        let bottom = (y0.max(y1).ceil() as i64).clamp(0, self.height as i64);

        let bytes = self.fill.to_bytes();
        for py in top..bottom as u32 {
            let row = (py * self.width) as usize;
            for px in left..right as u32 {
                let offset = (row + px as usize) * 4;
                self.pixels[offset..offset + 4].copy_from_slice(&bytes);
            }
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = ((y * self.width + x) * 4) as usize;
        let p = &self.pixels[offset..offset + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[derive(Default)]
pub struct RasterSurfaceFactory;

impl SurfaceFactory for RasterSurfaceFactory {
    fn create_surface(&mut self, width: u32, height: u32) -> Box<dyn Surface> {
        if width == 0 || height == 0 {
            warn!("surface dimensions {}x{} clamped to 1", width, height);
        }

        Box::new(RasterSurface::new(width, height))
    }
}

/// Encodes a surface's current pixels as a PNG file.
pub fn write_png(surface: &dyn Surface, path: &Path) -> Result<(), String> {
    let file = fs::File::create(path).map_err(|err| {
        format!("failed to create '{}': {}", path.display(), err)
    })?;
    let mut writer = std::io::BufWriter::new(file);

    let mut encoder =
        png::Encoder::new(&mut writer, surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);

    let mut png_writer = encoder
        .write_header()
        .map_err(|err| format!("png header failed: {}", err))?;
    png_writer
        .write_image_data(surface.pixels())
        .map_err(|err| format!("png write failed: {}", err))?;
    drop(png_writer);

    writer
        .flush()
        .map_err(|err| format!("png flush failed: {}", err))
}
