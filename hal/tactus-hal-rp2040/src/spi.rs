//! Timeout-bounded SPI bus (transmit only)

use embassy_time::{with_timeout, Duration};
use embedded_hal_async::spi::SpiBus as AsyncSpiBus;

use tactus_hal::spi::{Phase, Polarity, SpiConfig};
use tactus_hal::{BusError, SpiBus};

/// Translate the bus settings into an embassy-rp SPI config
pub fn rp_config(config: &SpiConfig) -> embassy_rp::spi::Config {
    let mut rp = embassy_rp::spi::Config::default();
    rp.frequency = config.frequency;
    rp.polarity = match config.polarity {
        Polarity::IdleLow => embassy_rp::spi::Polarity::IdleLow,
        Polarity::IdleHigh => embassy_rp::spi::Polarity::IdleHigh,
    };
    rp.phase = match config.phase {
        Phase::CaptureOnFirstTransition => embassy_rp::spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => embassy_rp::spi::Phase::CaptureOnSecondTransition,
    };
    rp
}

/// Wraps an async SPI bus so every write has a deadline
///
/// Chip select is tied low on the panel, so the raw bus is used rather
/// than a device.
pub struct TimedSpi<T> {
    inner: T,
    timeout: Duration,
}

impl<T: AsyncSpiBus> TimedSpi<T> {
    pub fn new(inner: T, config: &SpiConfig) -> Self {
        Self {
            inner,
            timeout: Duration::from_millis(config.timeout_ms as u64),
        }
    }
}

impl<T: AsyncSpiBus> SpiBus for TimedSpi<T> {
    async fn write(&mut self, data: &[u8]) -> Result<(), BusError> {
        let transfer = async {
            self.inner.write(data).await?;
            self.inner.flush().await
        };
        with_timeout(self.timeout, transfer)
            .await
            .map_err(|_| BusError::Timeout)?
            .map_err(|_| BusError::Transport)
    }
}
