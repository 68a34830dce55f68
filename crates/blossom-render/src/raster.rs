//! CPU rasterizer backing the `DrawSurface` contract

use crate::affine::Affine;
use blossom_core::{BlossomError, Color, CompositeMode, DrawSurface, Rect, Result, Size, Vec2};
use std::path::Path;

/// Largest backing store a surface will allocate (8192 x 8192)
pub const MAX_PIXELS: usize = 1 << 26;

/// Device-pixel dimensions for `size` at `dpr`, or `None` when the store
/// would not fit in `MAX_PIXELS`
fn backing_dims(size: Size, dpr: f32) -> Option<(u32, u32)> {
    let side = |logical: f32| {
        let px = (logical * dpr).round().max(0.0);
        (px.is_finite() && px <= u32::MAX as f32).then_some(px as u32)
    };
    let (width, height) = (side(size.width)?, side(size.height)?);
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&count| count <= MAX_PIXELS)
        .map(|_| (width, height))
}

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    alpha: f32,
    composite: CompositeMode,
}

/// Premultiplied-alpha RGBA framebuffer.
///
/// The backing store is `size × device_pixel_ratio` pixels; drawing happens in
/// logical coordinates through a base `scale(device_pixel_ratio)` transform.
/// Coverage is sampled once at each pixel center, so edges are aliased.
pub struct RasterSurface {
    size: Size,
    dpr: f32,
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
    state: State,
    stack: Vec<State>,
}

impl RasterSurface {
    /// Acquire a surface. Fails when there is nothing to draw into, or when
    /// the backing store would exceed `MAX_PIXELS`.
    pub fn new(size: Size, device_pixel_ratio: f32) -> Result<Self> {
        if size.is_empty()
            || !(device_pixel_ratio > 0.0)
            || backing_dims(size, device_pixel_ratio).is_none()
        {
            return Err(BlossomError::SurfaceUnavailable(format!(
                "cannot allocate a {}x{} surface at {}x",
                size.width, size.height, device_pixel_ratio
            )));
        }
        let mut surface = Self {
            size,
            dpr: device_pixel_ratio,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            state: State {
                transform: Affine::IDENTITY,
                alpha: 1.0,
                composite: CompositeMode::SourceOver,
            },
            stack: Vec::new(),
        };
        surface.resize(size, device_pixel_ratio);
        Ok(surface)
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    /// Straight-alpha color of a device pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b, a] = self.pixels[(y * self.width + x) as usize];
        if a <= 0.0 {
            return Some(Color::TRANSPARENT);
        }
        Some(Color::new(r / a, g / a, b / a, a))
    }

    /// Pixel at a logical coordinate
    pub fn sample(&self, p: Vec2) -> Option<Color> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        self.pixel((p.x * self.dpr) as u32, (p.y * self.dpr) as u32)
    }

    /// Fraction of pixels with any coverage
    pub fn coverage(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let lit = self.pixels.iter().filter(|p| p[3] > 0.0).count();
        lit as f32 / self.pixels.len() as f32
    }

    /// Straight-alpha RGBA8 bytes, row-major
    pub fn to_rgba8(&self) -> Vec<u8> {
        let texels: Vec<[u8; 4]> = self
            .pixels
            .iter()
            .map(|&[r, g, b, a]| {
                let unpremul = |c: f32| if a > 0.0 { c / a } else { 0.0 };
                [
                    to_byte(unpremul(r)),
                    to_byte(unpremul(g)),
                    to_byte(unpremul(b)),
                    to_byte(a),
                ]
            })
            .collect();
        bytemuck::cast_slice::<[u8; 4], u8>(&texels).to_vec()
    }

    pub fn to_image(&self) -> Result<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8()).ok_or_else(|| {
            BlossomError::RenderError(format!(
                "pixel buffer does not fit {}x{}",
                self.width, self.height
            ))
        })
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| BlossomError::RenderError(format!("{}: {e}", path.display())))?;
        log::debug!(
            "[render] wrote {}x{} PNG to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    /// Blend `layer` onto this surface with `mode`. Layers of a different
    /// pixel size are sampled nearest-neighbor.
    pub fn composite_layer(&mut self, layer: &RasterSurface, mode: CompositeMode) {
        if layer.width == 0 || layer.height == 0 {
            return;
        }
        for y in 0..self.height {
            let sy = (y as u64 * layer.height as u64 / self.height as u64) as u32;
            for x in 0..self.width {
                let sx = (x as u64 * layer.width as u64 / self.width as u64) as u32;
                let src = layer.pixels[(sy * layer.width + sx) as usize];
                let dst = &mut self.pixels[(y * self.width + x) as usize];
                blend(dst, src, mode);
            }
        }
    }

    fn base_transform(&self) -> Affine {
        Affine::scale(self.dpr)
    }

    fn premultiplied(&self, color: Color) -> [f32; 4] {
        let a = (color.a * self.state.alpha).clamp(0.0, 1.0);
        [color.r * a, color.g * a, color.b * a, a]
    }

    /// Shade every pixel whose center, mapped back to local space, passes
    /// `inside`. `half` bounds the shape around `center` in local space.
    fn fill_local(
        &mut self,
        center: Vec2,
        half: Vec2,
        color: Color,
        inside: impl Fn(Vec2) -> bool,
    ) {
        let src = self.premultiplied(color);
        if src[3] <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let transform = self.state.transform;
        let Some(inverse) = transform.inverse() else {
            return;
        };

        let mid = transform.apply(center);
        let ext = transform.extent(half);
        let x0 = (mid.x - ext.x).floor().max(0.0) as u32;
        let y0 = (mid.y - ext.y).floor().max(0.0) as u32;
        let x1 = ((mid.x + ext.x).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((mid.y + ext.y).ceil().max(0.0) as u32).min(self.height);

        let composite = self.state.composite;
        for y in y0..y1 {
            for x in x0..x1 {
                let local = inverse.apply(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if inside(local) {
                    blend(&mut self.pixels[(y * self.width + x) as usize], src, composite);
                }
            }
        }
    }
}

fn blend(dst: &mut [f32; 4], src: [f32; 4], mode: CompositeMode) {
    match mode {
        CompositeMode::SourceOver => {
            let keep = 1.0 - src[3];
            for i in 0..4 {
                dst[i] = src[i] + dst[i] * keep;
            }
        }
        CompositeMode::Lighter => {
            for i in 0..4 {
                dst[i] = (src[i] + dst[i]).min(1.0);
            }
        }
        CompositeMode::Screen => {
            for i in 0..4 {
                dst[i] = src[i] + dst[i] - src[i] * dst[i];
            }
        }
    }
}

fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, size: Size, device_pixel_ratio: f32) {
        self.size = size;
        self.dpr = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        (self.width, self.height) = backing_dims(size, self.dpr).unwrap_or_else(|| {
            log::warn!(
                "[render] {}x{} at {}x exceeds {MAX_PIXELS} pixels; surface emptied",
                size.width,
                size.height,
                self.dpr
            );
            (0, 0)
        });
        self.pixels = vec![[0.0; 4]; self.width as usize * self.height as usize];
        self.stack.clear();
        self.state = State {
            transform: self.base_transform(),
            alpha: 1.0,
            composite: CompositeMode::SourceOver,
        };
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let half = Vec2::new(rect.width * 0.5, rect.height * 0.5);
        let center = Vec2::new(rect.x, rect.y) + half;
        self.fill_local(center, half, color, |p| rect.contains(p));
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        self.fill_local(center, radii, color, |p| {
            let dx = (p.x - center.x) / radii.x;
            let dy = (p.y - center.y) / radii.y;
            dx * dx + dy * dy <= 1.0
        });
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform.translate(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform.rotate(angle);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.state.composite = mode;
    }
}
