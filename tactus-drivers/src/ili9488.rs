//! ILI9488 SPI Display Driver
//!
//! 320x480 panel driven in 16-bit RGB565 mode. A command byte goes out with
//! DC low, its payload with DC high. Pixel data is streamed in chunks
//! through a reusable transfer buffer after a window has been programmed.

use embedded_hal_async::delay::DelayNs;

use tactus_core::config::DisplayConfig;
use tactus_core::display::Region;
use tactus_core::transfer::{ChunkPlan, TransferBuffer};
use tactus_core::{Error, Result};
use tactus_hal::{OutputPin, SpiBus};

pub const WIDTH: u16 = 320;
pub const HEIGHT: u16 = 480;

/// Pixels per pixel-data transaction
pub const CHUNK_PIXELS: usize = 1024;
const CHUNK_BYTES: usize = CHUNK_PIXELS * 2;

/// Reset pulse timing
const RESET_LOW_MS: u32 = 20;
const RESET_SETTLE_MS: u32 = 120;

/// ILI9488 commands
pub mod cmd {
    pub const SLPOUT: u8 = 0x11;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const PASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const PIXFMT: u8 = 0x3A;
    pub const PGAMCTRL: u8 = 0xE0;
    pub const NGAMCTRL: u8 = 0xE1;
    pub const PWCTRL1: u8 = 0xC0;
    pub const PWCTRL2: u8 = 0xC1;
    pub const VMCTRL: u8 = 0xC5;
    pub const IFMODE: u8 = 0xB0;
    pub const FRMCTR1: u8 = 0xB1;
    pub const INVTR: u8 = 0xB4;
    pub const DISCTRL: u8 = 0xB6;
    pub const ETMOD: u8 = 0xB7;
    pub const SETIMAGE: u8 = 0xE9;
    pub const ADJCTRL3: u8 = 0xF7;
}

/// One step of the power-on sequence
#[derive(Debug, Clone, Copy)]
pub struct InitEntry {
    pub opcode: u8,
    pub data: &'static [u8],
    /// Wait after the command, in milliseconds
    pub delay_ms: u32,
}

const fn entry(opcode: u8, data: &'static [u8], delay_ms: u32) -> InitEntry {
    InitEntry {
        opcode,
        data,
        delay_ms,
    }
}

/// Vendor power-on sequence, sent in order
pub const INIT_SEQUENCE: &[InitEntry] = &[
    entry(
        cmd::PGAMCTRL,
        &[0x00, 0x03, 0x09, 0x08, 0x16, 0x0A, 0x3F, 0x78, 0x4C, 0x09, 0x0A, 0x08, 0x16, 0x1A, 0x0F],
        0,
    ),
    entry(
        cmd::NGAMCTRL,
        &[0x00, 0x16, 0x19, 0x03, 0x0F, 0x05, 0x32, 0x45, 0x46, 0x04, 0x0E, 0x0D, 0x35, 0x37, 0x0F],
        0,
    ),
    entry(cmd::PWCTRL1, &[0x17, 0x15], 0),
    entry(cmd::PWCTRL2, &[0x41], 0),
    entry(cmd::VMCTRL, &[0x00, 0x12, 0x80], 0),
    entry(cmd::MADCTL, &[0x48], 0),   // BGR, column order flipped
    entry(cmd::PIXFMT, &[0x55], 0),   // 16 bits per pixel
    entry(cmd::IFMODE, &[0x00], 0),
    entry(cmd::FRMCTR1, &[0xA0], 0),  // 60 Hz
    entry(cmd::INVTR, &[0x02], 0),    // 2-dot inversion
    entry(cmd::DISCTRL, &[0x02, 0x02], 0),
    entry(cmd::ETMOD, &[0xC6], 0),
    entry(cmd::SETIMAGE, &[0x00], 0),
    entry(cmd::ADJCTRL3, &[0xA9, 0x51, 0x2C, 0x82], 0),
    entry(cmd::SLPOUT, &[], 120),
    entry(cmd::DISPON, &[], 20),
];

/// ILI9488 driver
///
/// Reset and backlight lines are optional; without a backlight line
/// [`Self::set_backlight`] is rejected.
pub struct Ili9488<SPI, DC, RST, BL, D> {
    spi: SPI,
    dc: DC,
    rst: Option<RST>,
    bl: Option<BL>,
    delay: D,
    width: u16,
    height: u16,
    backlight_active_high: bool,
    buffer: TransferBuffer<CHUNK_BYTES>,
}

impl<SPI, DC, RST, BL, D> Ili9488<SPI, DC, RST, BL, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
    D: DelayNs,
{
    pub fn new(
        spi: SPI,
        dc: DC,
        rst: Option<RST>,
        bl: Option<BL>,
        delay: D,
        config: &DisplayConfig,
    ) -> Self {
        Self {
            spi,
            dc,
            rst,
            bl,
            delay,
            width: config.width,
            height: config.height,
            backlight_active_high: config.backlight_active_high,
            buffer: TransferBuffer::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Whole panel as a region
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Reset the panel, run the power-on sequence, then light the backlight
    ///
    /// Any failed transaction aborts the sequence.
    pub async fn initialize(&mut self) -> Result<()> {
        self.dc.set_low();
        if let Some(rst) = self.rst.as_mut() {
            rst.set_low();
            self.delay.delay_ms(RESET_LOW_MS).await;
            rst.set_high();
            self.delay.delay_ms(RESET_SETTLE_MS).await;
        }

        for e in INIT_SEQUENCE {
            self.command(e.opcode, e.data).await?;
            if e.delay_ms > 0 {
                self.delay.delay_ms(e.delay_ms).await;
            }
        }

        if self.bl.is_some() {
            self.set_backlight(true)?;
        }
        Ok(())
    }

    /// Drive the backlight according to its configured polarity
    pub fn set_backlight(&mut self, on: bool) -> Result<()> {
        let bl = self.bl.as_mut().ok_or(Error::InvalidArgument)?;
        bl.set_state(on == self.backlight_active_high);
        Ok(())
    }

    /// Program the address window and open memory write
    pub async fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<()> {
        let region = self.checked(x, y, w, h)?;
        self.write_window(&region).await
    }

    /// Stream a row-major RGB565 bitmap into a window
    ///
    /// `pixels` must hold exactly `w * h` colors.
    pub async fn draw_bitmap(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[u16]) -> Result<()> {
        let region = self.checked(x, y, w, h)?;
        if pixels.len() != region.area() {
            return Err(Error::InvalidArgument);
        }

        self.write_window(&region).await?;
        self.dc.set_high();
        for range in ChunkPlan::new(pixels.len(), CHUNK_PIXELS) {
            let bytes = self.buffer.load_pixels(&pixels[range]);
            self.spi.write(bytes).await?;
        }
        Ok(())
    }

    /// Fill a window with one color
    pub async fn fill(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) -> Result<()> {
        let region = self.checked(x, y, w, h)?;

        self.write_window(&region).await?;
        self.dc.set_high();
        for range in ChunkPlan::new(region.area(), CHUNK_PIXELS) {
            let bytes = self.buffer.load_solid(color, range.len());
            self.spi.write(bytes).await?;
        }
        Ok(())
    }

    /// Fill a [`Region`] with one color
    pub async fn fill_region(&mut self, region: Region, color: u16) -> Result<()> {
        self.fill(region.x, region.y, region.w, region.h, color).await
    }

    /// Fill the whole panel
    pub async fn clear(&mut self, color: u16) -> Result<()> {
        self.fill_region(self.bounds(), color).await
    }

    fn checked(&self, x: u16, y: u16, w: u16, h: u16) -> Result<Region> {
        let region = Region::new(x, y, w, h);
        if region.is_empty() || !region.fits(self.width, self.height) {
            return Err(Error::InvalidArgument);
        }
        Ok(region)
    }

    async fn write_window(&mut self, r: &Region) -> Result<()> {
        self.write_range(cmd::CASET, r.x, r.x_end()).await?;
        self.write_range(cmd::PASET, r.y, r.y_end()).await?;
        self.command(cmd::RAMWR, &[]).await
    }

    async fn write_range(&mut self, opcode: u8, start: u16, end: u16) -> Result<()> {
        let [s_hi, s_lo] = start.to_be_bytes();
        let [e_hi, e_lo] = end.to_be_bytes();
        self.command(opcode, &[s_hi, s_lo, e_hi, e_lo]).await
    }

    async fn command(&mut self, opcode: u8, data: &[u8]) -> Result<()> {
        self.dc.set_low();
        self.spi.write(&[opcode]).await?;
        if !data.is_empty() {
            self.dc.set_high();
            self.spi.write(data).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{new_log, BusOp, Log, MockDelay, MockPin, MockSpi};
    use embassy_futures::block_on;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;
    use tactus_hal::BusError;

    type TestPanel = Ili9488<MockSpi, MockPin, MockPin, MockPin, MockDelay>;

    fn panel(log: &Log, with_pins: bool) -> TestPanel {
        let dc = Rc::new(Cell::new(false));
        Ili9488::new(
            MockSpi::new(dc.clone(), log),
            MockPin::shared(dc),
            with_pins.then(|| MockPin::logged("rst", log)),
            with_pins.then(|| MockPin::logged("bl", log)),
            MockDelay::new(log),
            &DisplayConfig::default(),
        )
    }

    fn window_ops(x0: u16, y0: u16, x1: u16, y1: u16) -> Vec<BusOp> {
        let [a, b] = x0.to_be_bytes();
        let [c, d] = x1.to_be_bytes();
        let [e, f] = y0.to_be_bytes();
        let [g, h] = y1.to_be_bytes();
        vec![
            BusOp::Cmd(cmd::CASET),
            BusOp::Data(vec![a, b, c, d]),
            BusOp::Cmd(cmd::PASET),
            BusOp::Data(vec![e, f, g, h]),
            BusOp::Cmd(cmd::RAMWR),
        ]
    }

    #[test]
    fn test_initialize_sequence() {
        let log = new_log();
        let mut p = panel(&log, true);
        block_on(p.initialize()).unwrap();

        let mut expected = vec![
            BusOp::Pin("rst", false),
            BusOp::Delay(20),
            BusOp::Pin("rst", true),
            BusOp::Delay(120),
        ];
        for e in INIT_SEQUENCE {
            expected.push(BusOp::Cmd(e.opcode));
            if !e.data.is_empty() {
                expected.push(BusOp::Data(e.data.to_vec()));
            }
            if e.delay_ms > 0 {
                expected.push(BusOp::Delay(e.delay_ms));
            }
        }
        expected.push(BusOp::Pin("bl", true));
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn test_init_sequence_bytes() {
        assert_eq!(INIT_SEQUENCE.len(), 16);
        assert_eq!(INIT_SEQUENCE[0].opcode, 0xE0);
        assert_eq!(INIT_SEQUENCE[0].data.len(), 15);
        assert_eq!(INIT_SEQUENCE[5].opcode, 0x36);
        assert_eq!(INIT_SEQUENCE[5].data, &[0x48]);
        assert_eq!(INIT_SEQUENCE[13].data, &[0xA9, 0x51, 0x2C, 0x82]);
        assert_eq!((INIT_SEQUENCE[14].opcode, INIT_SEQUENCE[14].delay_ms), (0x11, 120));
        assert_eq!((INIT_SEQUENCE[15].opcode, INIT_SEQUENCE[15].delay_ms), (0x29, 20));
    }

    #[test]
    fn test_initialize_aborts_on_failure() {
        let log = new_log();
        let mut p = panel(&log, true);
        p.spi.fail_at = Some(3);
        assert_eq!(
            block_on(p.initialize()),
            Err(Error::Bus(BusError::Timeout))
        );
        // backlight never switched on
        assert!(!log.borrow().contains(&BusOp::Pin("bl", true)));
    }

    #[test]
    fn test_backlight_polarity() {
        let log = new_log();
        let dc = Rc::new(Cell::new(false));
        let cfg = DisplayConfig {
            backlight_active_high: false,
            ..DisplayConfig::default()
        };
        let mut p: TestPanel = Ili9488::new(
            MockSpi::new(dc.clone(), &log),
            MockPin::shared(dc),
            None,
            Some(MockPin::logged("bl", &log)),
            MockDelay::new(&log),
            &cfg,
        );
        p.set_backlight(true).unwrap();
        p.set_backlight(false).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![BusOp::Pin("bl", false), BusOp::Pin("bl", true)]
        );
    }

    #[test]
    fn test_backlight_without_pin() {
        let log = new_log();
        let mut p = panel(&log, false);
        assert_eq!(p.set_backlight(true), Err(Error::InvalidArgument));
        // initialize skips reset and backlight
        block_on(p.initialize()).unwrap();
        assert!(!log.borrow().iter().any(|op| matches!(op, BusOp::Pin(..))));
    }

    #[test]
    fn test_set_window_big_endian() {
        let log = new_log();
        let mut p = panel(&log, false);
        block_on(p.set_window(300, 256, 20, 224)).unwrap();
        assert_eq!(*log.borrow(), window_ops(300, 256, 319, 479));
    }

    #[test]
    fn test_fill_chunks() {
        let log = new_log();
        let mut p = panel(&log, false);
        block_on(p.fill(0, 0, 50, 50, 0xF800)).unwrap();

        let ops = log.borrow();
        assert_eq!(&ops[..5], window_ops(0, 0, 49, 49).as_slice());
        let sizes: Vec<usize> = ops[5..]
            .iter()
            .map(|op| match op {
                BusOp::Data(d) => d.len(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(sizes, vec![2048, 2048, 904]);
        if let BusOp::Data(d) = &ops[7] {
            assert!(d.chunks(2).all(|px| px == [0xF8, 0x00]));
        }
    }

    #[test]
    fn test_draw_bitmap_big_endian_order() {
        let log = new_log();
        let mut p = panel(&log, false);
        let pixels = [0x1234u16, 0xABCD, 0x0001, 0xFF00];
        block_on(p.draw_bitmap(10, 20, 2, 2, &pixels)).unwrap();

        let ops = log.borrow();
        assert_eq!(&ops[..5], window_ops(10, 20, 11, 21).as_slice());
        assert_eq!(
            ops[5],
            BusOp::Data(vec![0x12, 0x34, 0xAB, 0xCD, 0x00, 0x01, 0xFF, 0x00])
        );
        assert_eq!(ops.len(), 6);
    }

    #[test]
    fn test_draw_rejects_bad_arguments() {
        let log = new_log();
        let mut p = panel(&log, false);
        assert_eq!(
            block_on(p.draw_bitmap(0, 0, 2, 2, &[0; 3])),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            block_on(p.fill(0, 0, 0, 10, 0)),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            block_on(p.fill(310, 0, 20, 10, 0)),
            Err(Error::InvalidArgument)
        );
        // nothing reached the bus
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_pixel_failure_surfaces() {
        let log = new_log();
        let mut p = panel(&log, false);
        // 6 window transactions, then the second pixel chunk fails
        p.spi.fail_at = Some(7);
        assert_eq!(
            block_on(p.fill(0, 0, 100, 100, 0)),
            Err(Error::Bus(BusError::Timeout))
        );
    }

    /// Every run of pixel data is immediately preceded by the window for it
    fn assert_windowed(ops: &[BusOp], region: Region) {
        let expected = window_ops(region.x, region.y, region.x_end(), region.y_end());
        let first_data = ops
            .iter()
            .position(|op| *op == BusOp::Cmd(cmd::RAMWR))
            .map(|i| i + 1)
            .unwrap_or(ops.len());
        assert!(first_data >= 5);
        assert_eq!(&ops[first_data - 5..first_data], expected.as_slice());
        assert!(first_data < ops.len());
        assert!(ops[first_data..].iter().all(|op| matches!(op, BusOp::Data(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_fill_pixels_sum_and_window(
            x in 0u16..320, y in 0u16..480, w in 1u16..=320, h in 1u16..=480, color in any::<u16>()
        ) {
            let w = w.min(WIDTH - x);
            let h = h.min(HEIGHT - y);
            let log = new_log();
            let mut p = panel(&log, false);
            block_on(p.fill(x, y, w, h, color)).unwrap();

            let ops = log.borrow();
            let expected = window_ops(x, y, x + w - 1, y + h - 1);
            prop_assert_eq!(&ops[..5], expected.as_slice());
            let chunks: Vec<usize> = ops[5..]
                .iter()
                .map(|op| match op {
                    BusOp::Data(d) => d.len() / 2,
                    _ => usize::MAX,
                })
                .collect();
            prop_assert_eq!(chunks.iter().sum::<usize>(), w as usize * h as usize);
            prop_assert!(chunks.iter().filter(|&&n| n < CHUNK_PIXELS).count() <= 1);
            for (i, n) in chunks.iter().enumerate() {
                if *n < CHUNK_PIXELS {
                    prop_assert_eq!(i, chunks.len() - 1);
                }
            }
        }

        #[test]
        fn test_bitmap_always_windowed(x in 0u16..300, y in 0u16..460, w in 1u16..20, h in 1u16..20) {
            let region = Region::new(x, y, w, h);
            let pixels = vec![0x07E0u16; region.area()];
            let log = new_log();
            let mut p = panel(&log, false);
            block_on(p.draw_bitmap(x, y, w, h, &pixels)).unwrap();
            assert_windowed(&log.borrow(), region);
        }
    }
}
