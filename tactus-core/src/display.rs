//! Display geometry, colors, and screen layout
//!
//! The layout math is kept here so it can be checked on the host; the
//! firmware only turns the resulting regions into driver calls.

/// Rectangular area of the panel, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub const fn area(&self) -> usize {
        self.w as usize * self.h as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Inclusive last column
    pub const fn x_end(&self) -> u16 {
        self.x + self.w - 1
    }

    /// Inclusive last row
    pub const fn y_end(&self) -> u16 {
        self.y + self.h - 1
    }

    /// Whether the region lies entirely within a `width` x `height` panel
    pub const fn fits(&self, width: u16, height: u16) -> bool {
        (self.x as u32 + self.w as u32) <= width as u32
            && (self.y as u32 + self.h as u32) <= height as u32
    }
}

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((b >> 3) as u16)
}

pub const BLACK: u16 = 0x0000;

/// Colors used by the player screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: u16,
    pub accent: u16,
    pub bar_track: u16,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: rgb565(10, 10, 20),
            accent: rgb565(0, 180, 255),
            bar_track: rgb565(30, 30, 30),
        }
    }
}

/// Layout constants
pub mod layout {
    pub const PADDING: u16 = 16;
    pub const BAR_WIDTH: u16 = 220;
    pub const BAR_HEIGHT: u16 = 20;
    pub const BAR_BORDER: u16 = 2;
    pub const ICON_SIZE: u16 = 48;
    pub const ICON_PIXELS: usize = ICON_SIZE as usize * ICON_SIZE as usize;
    /// Vertical gap between the icon and the volume bar
    pub const ICON_GAP: u16 = 12;
    /// Narrowest panel the bar fits on
    pub const MIN_WIDTH: u16 = BAR_WIDTH + 2 * PADDING;
    /// Shortest panel the icon and bar stack fits on
    pub const MIN_HEIGHT: u16 = 2 * PADDING + BAR_HEIGHT + ICON_GAP + ICON_SIZE;
}

/// Fill operations that draw the volume bar, in paint order
///
/// Border first, then the empty track, then the filled part. The filled
/// part is omitted at zero volume.
pub fn volume_bar(volume: u8, height: u16, palette: &Palette) -> heapless::Vec<(Region, u16), 3> {
    use layout::*;

    let x = PADDING;
    let y = height.saturating_sub(PADDING + BAR_HEIGHT).max(BAR_BORDER);
    let filled = (volume.min(100) as u32 * BAR_WIDTH as u32 / 100) as u16;

    let mut ops = heapless::Vec::new();
    // capacity matches the three pushes below
    let _ = ops.push((
        Region::new(
            x - BAR_BORDER,
            y - BAR_BORDER,
            BAR_WIDTH + 2 * BAR_BORDER,
            BAR_HEIGHT + 2 * BAR_BORDER,
        ),
        palette.accent,
    ));
    let _ = ops.push((Region::new(x, y, BAR_WIDTH, BAR_HEIGHT), palette.bar_track));
    if filled > 0 {
        let _ = ops.push((Region::new(x, y, filled, BAR_HEIGHT), palette.accent));
    }
    ops
}

/// Where the play/pause icon goes on a `width` x `height` panel
pub fn icon_region(width: u16, height: u16) -> Region {
    use layout::*;
    Region::new(
        width.saturating_sub(PADDING + ICON_SIZE),
        height.saturating_sub(PADDING + ICON_SIZE + BAR_HEIGHT + ICON_GAP),
        ICON_SIZE,
        ICON_SIZE,
    )
}

/// Render the play/pause icon into a row-major bitmap
///
/// Playing shows two pause bars; idle shows a right-pointing triangle.
pub fn render_icon(playing: bool, palette: &Palette, out: &mut [u16; layout::ICON_PIXELS]) {
    let size = layout::ICON_SIZE as usize;
    out.fill(palette.background);

    for row in 8..size - 8 {
        let line = &mut out[row * size..(row + 1) * size];
        if playing {
            line[10..18].fill(palette.accent);
            line[24..32].fill(palette.accent);
        } else {
            line[8..8 + (row - 8)].fill(palette.accent);
        }
    }
}
