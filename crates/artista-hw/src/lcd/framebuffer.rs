//! RGB565 framebuffer for Artista screens.

/// RGB565 framebuffer sized to one screen.
///
/// Pixels are stored row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    /// Pixel data in RGB565 format.
    data: Vec<u16>,
    /// Width of the framebuffer (screen columns).
    width: u16,
    /// Height of the framebuffer (screen lines).
    height: u16,
}

impl Framebuffer {
    /// Creates a framebuffer initialized to black.
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            data: vec![0; size],
            width,
            height,
        }
    }

    /// Returns the width of the framebuffer.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Returns the height of the framebuffer.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns the number of pixels.
    pub fn pixels(&self) -> usize {
        self.data.len()
    }

    /// Returns the size of the framebuffer on the wire, in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() * 2
    }

    /// Returns a reference to the raw pixel data.
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// Returns a mutable reference to the raw pixel data.
    pub fn data_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    /// Clears the framebuffer to a solid color.
    pub fn clear(&mut self, color: u16) {
        self.data.fill(color);
    }

    /// Sets a pixel at the given coordinates.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: u16) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            self.data[idx] = color;
        }
    }

    /// Gets a pixel at the given coordinates.
    #[cfg(any(test, feature = "test-support"))]
    pub fn get_pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            Some(self.data[idx])
        } else {
            None
        }
    }

    /// Fills a rectangle with a solid color, clipped to the framebuffer.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, color: u16) {
        for dy in 0..height {
            for dx in 0..width {
                self.set_pixel(x.saturating_add(dx), y.saturating_add(dy), color);
            }
        }
    }

    /// Serializes the pixels in the screen's native (little-endian) order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|p| p.to_le_bytes()).collect()
    }
}

/// Converts 16-bit-per-channel RGB to RGB565, keeping the top bits.
#[inline]
pub fn rgb16_to_rgb565(r: u16, g: u16, b: u16) -> u16 {
    ((r >> 11) << 11) | ((g >> 10) << 5) | (b >> 11)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_conversion() {
        // Pure red
        assert_eq!(rgb16_to_rgb565(0xFFFF, 0, 0), 0xF800);
        // Pure green
        assert_eq!(rgb16_to_rgb565(0, 0xFFFF, 0), 0x07E0);
        // Pure blue
        assert_eq!(rgb16_to_rgb565(0, 0, 0xFFFF), 0x001F);
        assert_eq!(rgb16_to_rgb565(0xFFFF, 0xFFFF, 0xFFFF), 0xFFFF);
        assert_eq!(rgb16_to_rgb565(0, 0, 0), 0x0000);
    }

    #[test]
    fn test_rgb16_keeps_top_bits_of_rgb8() {
        for v in [0u8, 7, 8, 100, 200, 255] {
            let wide = v as u16 * 257;
            let expected = ((v as u16 >> 3) << 11) | ((v as u16 >> 2) << 5) | (v as u16 >> 3);
            assert_eq!(rgb16_to_rgb565(wide, wide, wide), expected);
        }
        assert_eq!(rgb16_to_rgb565(0x07FF, 0x03FF, 0x07FF), 0x0000);
    }

    #[test]
    fn test_framebuffer_ops() {
        let mut fb = Framebuffer::new(4, 3);
        assert_eq!(fb.pixels(), 12);
        assert_eq!(fb.byte_len(), 24);

        fb.set_pixel(1, 2, 0xF800);
        assert_eq!(fb.get_pixel(1, 2), Some(0xF800));
        assert_eq!(fb.data()[2 * 4 + 1], 0xF800);
        assert_eq!(fb.get_pixel(4, 0), None);

        fb.clear(0xFFFF);
        assert_eq!(fb.get_pixel(0, 0), Some(0xFFFF));

        fb.fill_rect(2, 1, 10, 10, 0x001F);
        assert_eq!(fb.get_pixel(3, 2), Some(0x001F));
        assert_eq!(fb.get_pixel(1, 1), Some(0xFFFF));
    }

    #[test]
    fn test_le_bytes() {
        let mut fb = Framebuffer::new(2, 1);
        fb.data_mut().copy_from_slice(&[0xF800, 0x001F]);
        assert_eq!(fb.to_le_bytes(), vec![0x00, 0xF8, 0x1F, 0x00]);
    }
}
