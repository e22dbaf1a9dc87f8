//! RAM framebuffer with per-pixel change detection.
//!
//! The passcode page redraws every frame while the dial moves. Drawing into
//! this buffer first and flushing only the bounding box of changed pixels
//! keeps the panel transfer small: a spring-back repaints the whole dial
//! but only the pixels that actually moved reach the hardware.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::trace;

use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

const WIDTH: usize = DISPLAY_WIDTH_PX as usize;
const HEIGHT: usize = DISPLAY_HEIGHT_PX as usize;

/// Total number of pixels in the framebuffer (320 x 240 = 76,800).
const PIXEL_COUNT: usize = WIDTH * HEIGHT;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Heap-backed framebuffer implementing `DrawTarget<Color = Rgb565>`.
///
/// Holds a 320x240 pixel buffer (153,600 bytes) and tracks the bounding box
/// of changed pixels so [`flush`](Self::flush) sends only that region.
pub struct FrameBuffer {
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Allocate a framebuffer filled with black pixels.
    pub fn new() -> Self {
        Self {
            pixels: vec![Rgb565::BLACK; PIXEL_COUNT],
            dirty: None,
        }
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return None;
        }
        Some(self.pixels[y as usize * WIDTH + x as usize])
    }

    /// Region changed since the last flush, if any.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * WIDTH + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Copy the dirty region to `display`, then reset the dirty state.
    ///
    /// A no-op when nothing changed.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let area = rect.to_rectangle();
        let width = area.size.width as usize;
        trace!(
            "Flushing {}x{} region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        let pixels = &self.pixels;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * WIDTH + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (x, y) = (coord.x, coord.y);
            if x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Walk the full area so the color stream stays aligned with clipped rows
        let mut colors = colors.into_iter();
        for row in 0..area.size.height as i32 {
            let y = area.top_left.y + row;
            for col in 0..area.size.width as i32 {
                let x = area.top_left.x + col;
                let Some(color) = colors.next() else {
                    return Ok(());
                };
                if x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        let Some(bottom_right) = clipped.bottom_right() else {
            return Ok(());
        };

        for y in clipped.top_left.y..=bottom_right.y {
            for x in clipped.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    #[test]
    fn test_new_buffer_is_clean_and_black() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.dirty_area(), None);
        assert_eq!(fb.pixel(0, 0), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(319, 239), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(320, 0), None);
        assert_eq!(fb.pixel(-1, 5), None);
    }

    #[test]
    fn test_unchanged_pixels_do_not_dirty() {
        let mut fb = FrameBuffer::new();
        fb.clear(Rgb565::BLACK).unwrap();
        assert_eq!(fb.dirty_area(), None);
    }

    #[test]
    fn test_dirty_area_covers_changes() {
        let mut fb = FrameBuffer::new();
        fb.fill_solid(
            &Rectangle::new(Point::new(10, 20), Size::new(4, 3)),
            Rgb565::RED,
        )
        .unwrap();
        Pixel(Point::new(30, 5), Rgb565::GREEN).draw(&mut fb).unwrap();

        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(10, 5), Size::new(21, 18)))
        );
        assert_eq!(fb.pixel(13, 22), Some(Rgb565::RED));
        assert_eq!(fb.pixel(14, 22), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_fill_solid_clips_to_screen() {
        let mut fb = FrameBuffer::new();
        fb.fill_solid(
            &Rectangle::new(Point::new(-5, 235), Size::new(10, 10)),
            Rgb565::BLUE,
        )
        .unwrap();
        assert_eq!(fb.pixel(0, 239), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(4, 235), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(5, 235), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_fill_contiguous_keeps_rows_aligned_when_clipped() {
        let mut fb = FrameBuffer::new();
        let area = Rectangle::new(Point::new(-1, 0), Size::new(2, 2));
        let colors = [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE];
        fb.fill_contiguous(&area, colors).unwrap();

        assert_eq!(fb.pixel(0, 0), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(0, 1), Some(Rgb565::WHITE));
    }

    #[test]
    fn test_flush_sends_only_dirty_region() {
        let mut fb = FrameBuffer::new();
        fb.fill_solid(
            &Rectangle::new(Point::new(2, 1), Size::new(2, 2)),
            Rgb565::RED,
        )
        .unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        fb.flush(&mut display).unwrap();

        assert_eq!(display.affected_area(), fb_area(2, 1, 2, 2));
        assert_eq!(display.get_pixel(Point::new(3, 2)), Some(Rgb565::RED));
        assert_eq!(fb.dirty_area(), None);

        // Nothing changed, nothing sent
        let mut untouched = MockDisplay::<Rgb565>::new();
        fb.flush(&mut untouched).unwrap();
        assert_eq!(untouched.affected_area(), Rectangle::zero());
    }

    fn fb_area(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }
}
