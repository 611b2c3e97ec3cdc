//! Timeout-bounded I2C bus

use embassy_time::{with_timeout, Duration};
use embedded_hal::i2c::{Error as _, ErrorKind};
use embedded_hal_async::i2c::I2c;

use tactus_hal::i2c::I2cConfig;
use tactus_hal::{BusError, I2cBus};

/// Translate the bus settings into an embassy-rp I2C config
pub fn rp_config(config: &I2cConfig) -> embassy_rp::i2c::Config {
    let mut rp = embassy_rp::i2c::Config::default();
    rp.frequency = config.frequency;
    rp
}

/// Wraps an async I2C master so every transaction has a deadline
pub struct TimedI2c<T> {
    inner: T,
    timeout: Duration,
}

impl<T: I2c> TimedI2c<T> {
    pub fn new(inner: T, config: &I2cConfig) -> Self {
        Self {
            inner,
            timeout: Duration::from_millis(config.timeout_ms as u64),
        }
    }
}

fn map_error<E: embedded_hal::i2c::Error>(e: E) -> BusError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        _ => BusError::Transport,
    }
}

impl<T: I2c> I2cBus for TimedI2c<T> {
    async fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        with_timeout(self.timeout, self.inner.write(address, data))
            .await
            .map_err(|_| BusError::Timeout)?
            .map_err(map_error)
    }

    async fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), BusError> {
        with_timeout(self.timeout, self.inner.write_read(address, write_data, read_buf))
            .await
            .map_err(|_| BusError::Timeout)?
            .map_err(map_error)
    }
}
