//! GT911 Capacitive Touch Controller Driver
//!
//! Register protocol over I2C with 16-bit big-endian register addresses.
//! The INT line only raises a [`TouchIrq`] flag; all bus traffic happens in
//! [`Gt911::read_touch_points`], called from task context.

use portable_atomic::{AtomicBool, Ordering};

use tactus_core::events::{TouchFrame, TouchPoint, MAX_TOUCH_POINTS};
use tactus_core::{Error, ProtocolError, Result};
use tactus_hal::I2cBus;

/// Default 7-bit I2C address (INT held low during reset)
pub const GT911_ADDR: u8 = 0x5D;

/// Bytes per entry in the point table
pub const POINT_RECORD_LEN: usize = 8;

/// GT911 registers
pub mod reg {
    /// Product id, 4 ASCII bytes
    pub const PRODUCT_ID: u16 = 0x8140;
    /// Firmware version, little-endian u16
    pub const FIRMWARE_VERSION: u16 = 0x8144;
    /// Bit 7 = buffer ready, bits 0..3 = point count
    pub const STATUS: u16 = 0x814E;
    /// First point record (track id, x, y, size, reserved)
    pub const POINT_TABLE: u16 = 0x814F;
}

const STATUS_READY: u8 = 0x80;
const STATUS_COUNT_MASK: u8 = 0x0F;

/// Touch-ready flag shared between the INT handler and the driver
///
/// The handler only ever raises it; only [`Gt911::read_touch_points`]
/// clears it.
pub struct TouchIrq(AtomicBool);

impl Default for TouchIrq {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchIrq {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Called from interrupt context on a falling INT edge
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// GT911 driver
pub struct Gt911<'a, I2C> {
    i2c: I2C,
    address: u8,
    irq: &'a TouchIrq,
    product_id: [u8; 4],
    firmware_version: u16,
}

impl<'a, I2C: I2cBus> Gt911<'a, I2C> {
    /// Identify the controller and keep its identity
    ///
    /// A bus failure aborts with [`Error::Bus`]. An id of all zero or all
    /// 0xFF bytes means nothing sensible answered and is reported as
    /// [`ProtocolError::UnexpectedResponse`].
    pub async fn initialize(i2c: I2C, irq: &'a TouchIrq) -> Result<Self> {
        Self::initialize_at(i2c, GT911_ADDR, irq).await
    }

    /// Same as [`Self::initialize`] for a controller strapped to another address
    pub async fn initialize_at(i2c: I2C, address: u8, irq: &'a TouchIrq) -> Result<Self> {
        let mut dev = Self {
            i2c,
            address,
            irq,
            product_id: [0; 4],
            firmware_version: 0,
        };

        let mut id = [0u8; 4];
        dev.read_reg(reg::PRODUCT_ID, &mut id).await?;
        if id.iter().all(|&b| b == 0x00) || id.iter().all(|&b| b == 0xFF) {
            return Err(Error::Protocol(ProtocolError::UnexpectedResponse));
        }

        let mut fw = [0u8; 2];
        dev.read_reg(reg::FIRMWARE_VERSION, &mut fw).await?;

        dev.product_id = id;
        dev.firmware_version = u16::from_le_bytes(fw);
        Ok(dev)
    }

    /// Product id as reported (e.g. `b"911\0"`)
    pub fn product_id(&self) -> [u8; 4] {
        self.product_id
    }

    /// Product id as text, trailing NULs trimmed
    pub fn product_id_str(&self) -> &str {
        let end = self.product_id.iter().position(|&b| b == 0).unwrap_or(4);
        core::str::from_utf8(&self.product_id[..end]).unwrap_or("?")
    }

    pub fn firmware_version(&self) -> u16 {
        self.firmware_version
    }

    /// INT fired since the last read
    pub fn touch_pending(&self) -> bool {
        self.irq.is_raised()
    }

    /// Read the current touch frame and re-arm the controller
    ///
    /// Clears the ready flag on entry. A status without the ready bit gives
    /// an empty frame. Otherwise exactly `count * 8` bytes are read from the
    /// point table and the status register is written back to zero.
    pub async fn read_touch_points(&mut self) -> Result<TouchFrame> {
        self.irq.take();

        let mut status = [0u8; 1];
        self.read_reg(reg::STATUS, &mut status).await?;
        if status[0] & STATUS_READY == 0 {
            return Ok(TouchFrame::empty());
        }

        let count = ((status[0] & STATUS_COUNT_MASK) as usize).min(MAX_TOUCH_POINTS);
        let mut raw = [0u8; MAX_TOUCH_POINTS * POINT_RECORD_LEN];
        let raw = &mut raw[..count * POINT_RECORD_LEN];
        if count > 0 {
            self.read_reg(reg::POINT_TABLE, raw).await?;
        }

        let mut frame = TouchFrame::empty();
        for record in raw.chunks_exact(POINT_RECORD_LEN) {
            // count is clamped to capacity
            let _ = frame.points.push(decode_point(record));
        }

        self.write_reg(reg::STATUS, &[0]).await?;
        Ok(frame)
    }

    async fn read_reg(&mut self, reg: u16, buf: &mut [u8]) -> Result<()> {
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), buf)
            .await?;
        Ok(())
    }

    async fn write_reg(&mut self, reg: u16, data: &[u8]) -> Result<()> {
        let mut frame = [0u8; 2 + 4];
        let len = 2 + data.len();
        if len > frame.len() {
            return Err(Error::InvalidArgument);
        }
        frame[..2].copy_from_slice(&reg.to_be_bytes());
        frame[2..len].copy_from_slice(data);
        self.i2c.write(self.address, &frame[..len]).await?;
        Ok(())
    }
}

/// Decode one 8-byte point record: id, x (LE), y (LE), size (LE), reserved
fn decode_point(r: &[u8]) -> TouchPoint {
    TouchPoint {
        id: r[0],
        x: u16::from_le_bytes([r[1], r[2]]),
        y: u16::from_le_bytes([r[3], r[4]]),
        size: u16::from_le_bytes([r[5], r[6]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockI2c;
    use embassy_futures::block_on;
    use tactus_hal::BusError;

    fn device() -> MockI2c {
        let mut i2c = MockI2c::new(GT911_ADDR);
        i2c.set_reg(reg::PRODUCT_ID, b"911\0");
        i2c.set_reg(reg::FIRMWARE_VERSION, &[0x60, 0x10]);
        i2c
    }

    #[test]
    fn test_initialize_reads_identity() {
        let irq = TouchIrq::new();
        let dev = block_on(Gt911::initialize(device(), &irq)).unwrap();
        assert_eq!(dev.product_id(), *b"911\0");
        assert_eq!(dev.product_id_str(), "911");
        assert_eq!(dev.firmware_version(), 0x1060);
        // register address is sent high byte first
        assert_eq!(dev.i2c.addr_bytes[0], [0x81, 0x40]);
        assert_eq!(dev.i2c.addr_bytes[1], [0x81, 0x44]);
    }

    #[test]
    fn test_initialize_rejects_blank_id() {
        let irq = TouchIrq::new();
        let mut i2c = device();
        i2c.set_reg(reg::PRODUCT_ID, &[0xFF; 4]);
        assert_eq!(
            block_on(Gt911::initialize(i2c, &irq)).err(),
            Some(Error::Protocol(ProtocolError::UnexpectedResponse))
        );

        let mut i2c = device();
        i2c.set_reg(reg::PRODUCT_ID, &[0; 4]);
        assert!(block_on(Gt911::initialize(i2c, &irq)).is_err());
    }

    #[test]
    fn test_initialize_bus_failure() {
        let irq = TouchIrq::new();
        let mut i2c = device();
        i2c.fail = Some(BusError::Timeout);
        let err = block_on(Gt911::initialize(i2c, &irq)).err().unwrap();
        assert!(err.is_timeout());

        let i2c = MockI2c::new(0x14);
        assert_eq!(
            block_on(Gt911::initialize(i2c, &irq)).err(),
            Some(Error::Bus(BusError::Nack))
        );
    }

    #[test]
    fn test_not_ready_is_empty_frame() {
        let irq = TouchIrq::new();
        let mut dev = block_on(Gt911::initialize(device(), &irq)).unwrap();
        dev.i2c.set_reg(reg::STATUS, &[0x02]);
        assert!(!dev.touch_pending());
        irq.raise();
        assert!(dev.touch_pending());

        let frame = block_on(dev.read_touch_points()).unwrap();
        assert!(frame.is_empty());
        assert!(!irq.is_raised());
        assert!(dev.i2c.writes.is_empty());
        assert!(dev.i2c.reads.iter().all(|(r, _)| *r != reg::POINT_TABLE));
    }

    #[test]
    fn test_reads_points_and_clears_status() {
        let irq = TouchIrq::new();
        let mut dev = block_on(Gt911::initialize(device(), &irq)).unwrap();
        dev.i2c.set_reg(reg::STATUS, &[0x82]);
        dev.i2c.set_reg(
            reg::POINT_TABLE,
            &[
                1, 0x2C, 0x01, 0xE0, 0x01, 0x10, 0x00, 0, //
                2, 0x05, 0x00, 0x06, 0x00, 0x20, 0x00, 0,
            ],
        );
        irq.raise();

        let frame = block_on(dev.read_touch_points()).unwrap();
        assert_eq!(frame.points.len(), 2);
        assert_eq!(
            frame.points[0],
            TouchPoint { id: 1, x: 300, y: 480, size: 16 }
        );
        assert_eq!(frame.points[1], TouchPoint { id: 2, x: 5, y: 6, size: 32 });

        assert!(dev.i2c.reads.contains(&(reg::POINT_TABLE, 16)));
        assert_eq!(dev.i2c.writes.as_slice(), &[(reg::STATUS, std::vec![0u8])]);
        assert!(!irq.is_raised());
    }

    #[test]
    fn test_count_clamped_to_max() {
        let irq = TouchIrq::new();
        let mut dev = block_on(Gt911::initialize(device(), &irq)).unwrap();
        dev.i2c.set_reg(reg::STATUS, &[0x8F]);

        let frame = block_on(dev.read_touch_points()).unwrap();
        assert_eq!(frame.points.len(), MAX_TOUCH_POINTS);
        assert!(dev.i2c.reads.contains(&(reg::POINT_TABLE, 40)));
    }

    #[test]
    fn test_ready_with_zero_points_still_acknowledged() {
        let irq = TouchIrq::new();
        let mut dev = block_on(Gt911::initialize(device(), &irq)).unwrap();
        dev.i2c.set_reg(reg::STATUS, &[0x80]);

        let frame = block_on(dev.read_touch_points()).unwrap();
        assert!(frame.is_empty());
        assert!(dev.i2c.reads.iter().all(|(r, _)| *r != reg::POINT_TABLE));
        assert_eq!(dev.i2c.writes.len(), 1);
    }

    #[test]
    fn test_bus_error_propagates() {
        let irq = TouchIrq::new();
        let mut dev = block_on(Gt911::initialize(device(), &irq)).unwrap();
        dev.i2c.fail = Some(BusError::Transport);
        irq.raise();
        assert_eq!(
            block_on(dev.read_touch_points()).err(),
            Some(Error::Bus(BusError::Transport))
        );
        // flag was consumed even though the read failed
        assert!(!irq.is_raised());
    }
}
