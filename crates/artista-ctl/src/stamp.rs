//! Identification image drawn by `-n`.
//!
//! Black text on white: the screen's enumeration index and its display id,
//! scaled up on large screens so it can be read from a distance.

use std::convert::Infallible;

use artista_hw::{DisplayId, Framebuffer};
use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::{
        raw::{RawData, RawU16},
        Rgb565,
    },
    prelude::*,
    text::{Baseline, Text},
};

const BACKGROUND: u16 = 0xFFFF;
const TEXT_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, Rgb565::BLACK);

/// Unscaled space needed by the two text lines.
const TEXT_WIDTH: u32 = 200;
const TEXT_HEIGHT: u32 = 60;

/// Draws into a framebuffer, blowing every pixel up to a `scale` square.
struct Canvas<'a> {
    fb: &'a mut Framebuffer,
    scale: u16,
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(
            u32::from(self.fb.width() / self.scale),
            u32::from(self.fb.height() / self.scale),
        )
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                continue;
            };
            let raw = RawU16::from(color).into_inner();
            self.fb.fill_rect(
                x.saturating_mul(self.scale),
                y.saturating_mul(self.scale),
                self.scale,
                self.scale,
                raw,
            );
        }
        Ok(())
    }
}

/// Pixel scale for a screen of the given size.
pub fn scale_for(columns: u16, lines: u16) -> u16 {
    let by_width = u32::from(columns) / TEXT_WIDTH;
    let by_height = u32::from(lines) / TEXT_HEIGHT;
    by_width.min(by_height).clamp(1, u32::from(u16::MAX)) as u16
}

/// Renders the identification image for one screen.
pub fn render(index: usize, display_id: &DisplayId, columns: u16, lines: u16) -> Framebuffer {
    let mut fb = Framebuffer::new(columns, lines);
    fb.clear(BACKGROUND);

    let scale = scale_for(columns, lines);
    let mut canvas = Canvas {
        fb: &mut fb,
        scale,
    };

    let number = format!("n:{}", index);
    let id = format!("id:{}", display_id);
    for (text, y) in [(number.as_str(), 5), (id.as_str(), 30)] {
        Text::with_baseline(text, Point::new(5, y), TEXT_STYLE, Baseline::Top)
            .draw(&mut canvas)
            .unwrap_or_else(|never| match never {});
    }

    fb
}
