//! Board wiring
//!
//! Fixed pin assignments for the desk appliance carrier board, and the
//! constructors that turn raw peripherals into the driver stacks the tasks
//! run on. Encoder pins are not fixed; they come from `desk.toml` through
//! the [`PinBank`].
//!
//! | Function           | Pins                                  |
//! |--------------------|---------------------------------------|
//! | Panel (SPI0)       | SCK 18, MOSI 19, CS 17, DC 20, RST 21 |
//! | Backlight          | 22                                    |
//! | Touch (I2C0)       | SDA 4, SCL 5, INT 6                   |
//! | SD card (SPI1)     | MISO 12, CS 13, SCK 14, MOSI 15       |
//! | I2S (PIO0)         | BCLK 26, LRCLK 27, DATA 28            |

use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{
    CORE1, DMA_CH0, DMA_CH1, I2C0, PIN_12, PIN_13, PIN_14, PIN_15, PIN_17, PIN_18, PIN_19,
    PIN_20, PIN_21, PIN_22, PIN_26, PIN_27, PIN_28, PIN_4, PIN_5, PIN_6, PIO0, SPI0, SPI1,
};
use embassy_rp::pio::Pio;
use embassy_rp::spi::{self, Spi};
use embassy_rp::{Peri, Peripherals};
use embassy_time::Delay;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use embedded_sdmmc::SdCard;
use static_cell::StaticCell;

use tactus_core::config::{DeskConfig, DisplayConfig, TouchConfig};
use tactus_drivers::audio::AudioEngine;
use tactus_drivers::ili9488::Ili9488;
use tactus_hal::i2c::I2cConfig;
use tactus_hal::spi::SpiConfig;
use tactus_hal::{FileSource, StorageError};
use tactus_hal_rp2040::storage::FixedTime;
use tactus_hal_rp2040::{bank_pins, Drive, Line, PinBank, PioI2sSink, SdCardFiles, TimedI2c, TimedSpi};

use crate::Irqs;

/// SD card clock during card initialization
const SD_INIT_HZ: u32 = 400_000;
/// SD card clock once the card is up
const SD_RUN_HZ: u32 = 16_000_000;

pub type PanelBus = TimedSpi<Spi<'static, SPI0, spi::Async>>;
pub type Panel = Ili9488<PanelBus, Drive<'static>, Drive<'static>, Drive<'static>, Delay>;
pub type TouchBus = TimedI2c<I2c<'static, I2C0, i2c::Async>>;
pub type SdDevice = ExclusiveDevice<Spi<'static, SPI1, spi::Blocking>, Output<'static>, NoDelay>;
pub type Card = SdCardFiles<SdCard<SdDevice, Delay>, FixedTime>;
pub type Sink = PioI2sSink<'static, PIO0, 0>;
pub type Engine = AudioEngine<Sink, CardSlot>;

/// Panel chip select, held low for the life of the firmware
static PANEL_CS: StaticCell<Output<'static>> = StaticCell::new();

pub struct DisplayResources {
    spi: Peri<'static, SPI0>,
    sck: Peri<'static, PIN_18>,
    mosi: Peri<'static, PIN_19>,
    dma: Peri<'static, DMA_CH0>,
    cs: Peri<'static, PIN_17>,
    dc: Peri<'static, PIN_20>,
    rst: Peri<'static, PIN_21>,
    backlight: Peri<'static, PIN_22>,
}

pub struct TouchResources {
    i2c: Peri<'static, I2C0>,
    sda: Peri<'static, PIN_4>,
    scl: Peri<'static, PIN_5>,
    int: Peri<'static, PIN_6>,
}

pub struct CardResources {
    spi: Peri<'static, SPI1>,
    miso: Peri<'static, PIN_12>,
    cs: Peri<'static, PIN_13>,
    sck: Peri<'static, PIN_14>,
    mosi: Peri<'static, PIN_15>,
}

pub struct I2sResources {
    pio: Peri<'static, PIO0>,
    dma: Peri<'static, DMA_CH1>,
    bit_clock: Peri<'static, PIN_26>,
    word_select: Peri<'static, PIN_27>,
    data: Peri<'static, PIN_28>,
}

/// All peripherals, grouped by what they drive
pub struct Board {
    pub display: DisplayResources,
    pub touch: TouchResources,
    pub card: CardResources,
    pub i2s: I2sResources,
    pub core1: Peri<'static, CORE1>,
    /// GPIOs without fixed wiring, for config-driven assignment
    pub bank: PinBank,
}

impl Board {
    pub fn split(p: Peripherals) -> Self {
        let mut bank = PinBank::new();
        bank_pins!(
            bank, p,
            0 => PIN_0, 1 => PIN_1, 2 => PIN_2, 3 => PIN_3, 7 => PIN_7,
            8 => PIN_8, 9 => PIN_9, 10 => PIN_10, 11 => PIN_11, 16 => PIN_16,
            23 => PIN_23, 24 => PIN_24, 25 => PIN_25, 29 => PIN_29,
        );

        Self {
            display: DisplayResources {
                spi: p.SPI0,
                sck: p.PIN_18,
                mosi: p.PIN_19,
                dma: p.DMA_CH0,
                cs: p.PIN_17,
                dc: p.PIN_20,
                rst: p.PIN_21,
                backlight: p.PIN_22,
            },
            touch: TouchResources {
                i2c: p.I2C0,
                sda: p.PIN_4,
                scl: p.PIN_5,
                int: p.PIN_6,
            },
            card: CardResources {
                spi: p.SPI1,
                miso: p.PIN_12,
                cs: p.PIN_13,
                sck: p.PIN_14,
                mosi: p.PIN_15,
            },
            i2s: I2sResources {
                pio: p.PIO0,
                dma: p.DMA_CH1,
                bit_clock: p.PIN_26,
                word_select: p.PIN_27,
                data: p.PIN_28,
            },
            core1: p.CORE1,
            bank,
        }
    }
}

impl DisplayResources {
    /// ILI9488 on SPI0 with DMA; not yet initialized
    pub fn into_panel(self, config: &DisplayConfig) -> Panel {
        let bus_config = SpiConfig {
            frequency: config.spi_hz,
            ..SpiConfig::default()
        };
        let spi = Spi::new_txonly(
            self.spi,
            self.sck,
            self.mosi,
            self.dma,
            tactus_hal_rp2040::spi::rp_config(&bus_config),
        );
        PANEL_CS.init(Output::new(self.cs, Level::Low));

        Ili9488::new(
            TimedSpi::new(spi, &bus_config),
            Drive::new(self.dc.into(), false),
            Some(Drive::new(self.rst.into(), true)),
            Some(Drive::new(self.backlight.into(), !config.backlight_active_high)),
            Delay,
            config,
        )
    }
}

impl TouchResources {
    /// I2C0 bus for the GT911 and its INT line
    pub fn into_parts(self, config: &TouchConfig) -> (TouchBus, Line<'static>) {
        let bus_config = I2cConfig {
            frequency: config.i2c_hz,
            timeout_ms: config.timeout_ms,
        };
        let i2c = I2c::new_async(
            self.i2c,
            self.scl,
            self.sda,
            Irqs,
            tactus_hal_rp2040::i2c::rp_config(&bus_config),
        );
        let int = Line::new(Input::new(self.int, Pull::Up));
        (TimedI2c::new(i2c, &bus_config), int)
    }
}

impl CardResources {
    /// Bring up the card on SPI1 and open its first FAT volume
    pub fn mount(self) -> Result<Card, StorageError> {
        let mut spi_config = spi::Config::default();
        spi_config.frequency = SD_INIT_HZ;
        let spi = Spi::new_blocking(self.spi, self.sck, self.mosi, self.miso, spi_config);
        let cs = Output::new(self.cs, Level::High);
        let device = ExclusiveDevice::new_no_delay(spi, cs).map_err(|_| StorageError::Device)?;

        let card = SdCard::new(device, Delay);
        // first access runs the card init sequence at the slow clock
        card.num_bytes().map_err(|_| StorageError::Device)?;

        let mut run_config = spi::Config::default();
        run_config.frequency = SD_RUN_HZ;
        card.spi(|dev| dev.bus_mut().set_config(&run_config));

        SdCardFiles::mount(card, FixedTime)
    }
}

impl I2sResources {
    /// PIO0 state machine 0 running the I2S program
    pub fn into_sink(self, sample_rate: u32) -> Sink {
        let Pio { common, sm0, .. } = Pio::new(self.pio, Irqs);
        PioI2sSink::new(
            common,
            sm0,
            self.dma,
            self.data,
            self.bit_clock,
            self.word_select,
            sample_rate,
        )
    }
}

/// Encoder lines taken from the pin bank
pub struct EncoderLines {
    pub a: Line<'static>,
    pub b: Line<'static>,
    pub button: Line<'static>,
}

/// Claim the configured encoder pins
///
/// A pin outside the bank or named twice gives `InvalidArgument`.
pub fn encoder_lines(bank: &mut PinBank, config: &DeskConfig) -> tactus_core::Result<EncoderLines> {
    let enc = &config.encoder;
    let a = bank.take(enc.pin_a.pin)?;
    let b = bank.take(enc.pin_b.pin)?;
    let button = bank.take(enc.pin_button.pin)?;
    Ok(EncoderLines {
        a: Line::from_config(a, &enc.pin_a),
        b: Line::from_config(b, &enc.pin_b),
        button: Line::from_config(button, &enc.pin_button),
    })
}

/// SD card that may be absent
///
/// Without a mounted card every path reads as missing, so tones keep
/// working and file playback fails with `NotFound`.
pub struct CardSlot(pub Option<Card>);

impl FileSource for CardSlot {
    type Handle = <Card as FileSource>::Handle;

    async fn open(&mut self, path: &str) -> Result<Self::Handle, StorageError> {
        match self.0.as_mut() {
            Some(card) => card.open(path).await,
            None => Err(StorageError::NotFound),
        }
    }

    async fn read(&mut self, file: Self::Handle, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.0.as_mut() {
            Some(card) => card.read(file, buf).await,
            None => Err(StorageError::Device),
        }
    }

    async fn seek(&mut self, file: Self::Handle, offset: i32) -> Result<(), StorageError> {
        match self.0.as_mut() {
            Some(card) => card.seek(file, offset).await,
            None => Err(StorageError::Device),
        }
    }

    async fn close(&mut self, file: Self::Handle) -> Result<(), StorageError> {
        match self.0.as_mut() {
            Some(card) => card.close(file).await,
            None => Err(StorageError::Device),
        }
    }
}
