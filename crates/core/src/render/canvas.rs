use std::path::Path;

use image::RgbaImage;

use super::Surface;
use crate::{color::Rgba, Result};

/// Software RGBA raster used for headless runs and snapshots.
///
/// Points are blended source-over with the point's straight alpha; the
/// destination keeps its own alpha channel untouched except on `clear`.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    color: Rgba,
    frames_presented: u64,
    points_drawn: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::default(); width as usize * height as usize],
            color: Rgba::new(255, 255, 255, 255),
            frames_presented: 0,
            points_drawn: 0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x as i32, y as i32).map(|i| self.pixels[i])
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Points that landed on the surface since creation.
    pub fn points_drawn(&self) -> u64 {
        self.points_drawn
    }

    pub fn to_image(&self) -> RgbaImage {
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|&p| <[u8; 4]>::from(p))
            .collect();
        // The buffer length always matches width * height * 4.
        RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_image().save(path)?;
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Surface for Canvas {
    fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    fn draw_point(&mut self, x: i32, y: i32) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let src = self.color;
        let dst = &mut self.pixels[index];
        dst.r = blend(src.r, dst.r, src.a);
        dst.g = blend(src.g, dst.g, src.a);
        dst.b = blend(src.b, dst.b, src.a);
        self.points_drawn += 1;
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}

fn blend(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    ((src as u16 * a + dst as u16 * (255 - a)) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_point_replaces_pixel() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear(Rgba::new(20, 20, 30, 255));
        canvas.set_color(Rgba::new(200, 100, 50, 255));
        canvas.draw_point(1, 2);

        assert_eq!(canvas.pixel(1, 2).unwrap(), Rgba::new(200, 100, 50, 255));
        assert_eq!(canvas.pixel(2, 1).unwrap(), Rgba::new(20, 20, 30, 255));
    }

    #[test]
    fn transparent_point_leaves_pixel() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear(Rgba::new(20, 20, 30, 255));
        canvas.set_color(Rgba::new(255, 255, 255, 0));
        canvas.draw_point(0, 0);

        assert_eq!(canvas.pixel(0, 0).unwrap(), Rgba::new(20, 20, 30, 255));
    }

    #[test]
    fn out_of_bounds_points_are_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_point(-1, 0);
        canvas.draw_point(0, 4);
        canvas.draw_point(i32::MIN, i32::MAX);

        assert_eq!(canvas.points_drawn(), 0);
        assert!(canvas.pixel(4, 0).is_none());
    }

    #[test]
    fn image_matches_pixels() {
        let mut canvas = Canvas::new(3, 2);
        canvas.clear(Rgba::new(1, 2, 3, 255));
        canvas.set_color(Rgba::new(9, 9, 9, 255));
        canvas.draw_point(2, 1);

        let image = canvas.to_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [9, 9, 9, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }
}
