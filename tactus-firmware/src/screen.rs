//! Boot screen and incremental redraws
//!
//! Only two things are ever drawn after boot: the volume bar and the
//! play/pause icon. Each is redrawn on its own when it changes.

use tactus_core::display::{icon_region, layout, render_icon, volume_bar, Palette};
use tactus_core::Result;

use crate::board::Panel;

pub struct Screen {
    palette: Palette,
    width: u16,
    height: u16,
    icon: [u16; layout::ICON_PIXELS],
}

impl Screen {
    pub fn new(palette: Palette, width: u16, height: u16) -> Self {
        Self {
            palette,
            width,
            height,
            icon: [0; layout::ICON_PIXELS],
        }
    }

    /// Background, volume bar and icon
    pub async fn draw_boot(&mut self, panel: &mut Panel, volume: u8, playing: bool) -> Result<()> {
        panel.clear(self.palette.background).await?;
        self.draw_volume(panel, volume).await?;
        self.draw_icon(panel, playing).await
    }

    pub async fn draw_volume(&mut self, panel: &mut Panel, volume: u8) -> Result<()> {
        for (region, color) in volume_bar(volume, self.height, &self.palette) {
            panel.fill_region(region, color).await?;
        }
        Ok(())
    }

    pub async fn draw_icon(&mut self, panel: &mut Panel, playing: bool) -> Result<()> {
        render_icon(playing, &self.palette, &mut self.icon);
        let r = icon_region(self.width, self.height);
        panel.draw_bitmap(r.x, r.y, r.w, r.h, &self.icon).await
    }
}
