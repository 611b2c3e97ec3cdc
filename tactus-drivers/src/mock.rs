//! Recording mocks for host tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use tactus_hal::{AudioSink, BusError, FileSource, I2cBus, InputPin, OutputPin, SpiBus, StorageError};

use crate::audio::PlaybackControl;

/// One observable effect on the display wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    /// Byte written with DC low
    Cmd(u8),
    /// Bytes written with DC high
    Data(Vec<u8>),
    /// Named control line driven to a level
    Pin(&'static str, bool),
    Delay(u32),
}

pub type Log = Rc<RefCell<Vec<BusOp>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Input line with a settable level
#[derive(Clone, Default)]
pub struct FakeInput(pub Rc<Cell<bool>>);

impl FakeInput {
    pub fn new(high: bool) -> Self {
        Self(Rc::new(Cell::new(high)))
    }
}

impl InputPin for FakeInput {
    fn is_high(&self) -> bool {
        self.0.get()
    }
}

/// Output line that shares its level and optionally logs changes
pub struct MockPin {
    name: &'static str,
    level: Rc<Cell<bool>>,
    log: Option<Log>,
}

impl MockPin {
    /// Silent pin whose level another mock can observe
    pub fn shared(level: Rc<Cell<bool>>) -> Self {
        Self {
            name: "",
            level,
            log: None,
        }
    }

    pub fn logged(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            level: Rc::new(Cell::new(false)),
            log: Some(log.clone()),
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.set_state(true);
    }

    fn set_low(&mut self) {
        self.set_state(false);
    }

    fn set_state(&mut self, high: bool) {
        self.level.set(high);
        if let Some(log) = &self.log {
            log.borrow_mut().push(BusOp::Pin(self.name, high));
        }
    }
}

/// SPI bus that tags each write with the DC level it saw
pub struct MockSpi {
    dc: Rc<Cell<bool>>,
    log: Log,
    /// Fail the transaction with this index (0-based)
    pub fail_at: Option<usize>,
    count: usize,
}

impl MockSpi {
    pub fn new(dc: Rc<Cell<bool>>, log: &Log) -> Self {
        Self {
            dc,
            log: log.clone(),
            fail_at: None,
            count: 0,
        }
    }
}

impl SpiBus for MockSpi {
    async fn write(&mut self, data: &[u8]) -> Result<(), BusError> {
        let index = self.count;
        self.count += 1;
        if self.fail_at == Some(index) {
            return Err(BusError::Timeout);
        }
        let op = if self.dc.get() {
            BusOp::Data(data.to_vec())
        } else {
            assert_eq!(data.len(), 1, "commands are single bytes");
            BusOp::Cmd(data[0])
        };
        self.log.borrow_mut().push(op);
        Ok(())
    }
}

pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(BusOp::Delay(ms));
    }
}

/// Register-file I2C device with 16-bit big-endian addressing
pub struct MockI2c {
    pub address: u8,
    regs: Vec<(u16, Vec<u8>)>,
    /// Every write as (register, payload)
    pub writes: Vec<(u16, Vec<u8>)>,
    /// Every read as (register, length)
    pub reads: Vec<(u16, usize)>,
    /// Raw register address bytes of every transaction
    pub addr_bytes: Vec<[u8; 2]>,
    pub fail: Option<BusError>,
}

impl MockI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: Vec::new(),
            writes: Vec::new(),
            reads: Vec::new(),
            addr_bytes: Vec::new(),
            fail: None,
        }
    }

    pub fn set_reg(&mut self, reg: u16, data: &[u8]) {
        self.regs.retain(|(r, _)| *r != reg);
        self.regs.push((reg, data.to_vec()));
    }

    fn reg(&self, reg: u16) -> &[u8] {
        self.regs
            .iter()
            .find(|(r, _)| *r == reg)
            .map(|(_, d)| d.as_slice())
            .unwrap_or(&[])
    }
}

impl I2cBus for MockI2c {
    async fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        if let Some(e) = self.fail {
            return Err(e);
        }
        if address != self.address {
            return Err(BusError::Nack);
        }
        let reg = u16::from_be_bytes([data[0], data[1]]);
        self.addr_bytes.push([data[0], data[1]]);
        self.writes.push((reg, data[2..].to_vec()));
        self.set_reg(reg, &data[2..]);
        Ok(())
    }

    async fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), BusError> {
        if let Some(e) = self.fail {
            return Err(e);
        }
        if address != self.address {
            return Err(BusError::Nack);
        }
        let reg = u16::from_be_bytes([write_data[0], write_data[1]]);
        self.addr_bytes.push([write_data[0], write_data[1]]);
        self.reads.push((reg, read_buf.len()));
        let src = self.reg(reg);
        read_buf.fill(0);
        let n = src.len().min(read_buf.len());
        read_buf[..n].copy_from_slice(&src[..n]);
        Ok(())
    }
}

/// Audio sink that records output and can trip a stop mid-stream
pub struct MockSink {
    pub rate: u32,
    pub enabled: u32,
    pub output: Vec<u8>,
    pub writes: usize,
    /// Largest number of bytes taken per write
    pub max_write: usize,
    /// Request stop on this control once `output` reaches the byte count
    pub stop_after: Option<(usize, &'static PlaybackControl)>,
    /// Cancel this generation on the control once `output` reaches the byte count
    pub cancel_after: Option<(usize, &'static PlaybackControl, u32)>,
}

impl MockSink {
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            enabled: 0,
            output: Vec::new(),
            writes: 0,
            max_write: usize::MAX,
            stop_after: None,
            cancel_after: None,
        }
    }
}

impl AudioSink for MockSink {
    fn sample_rate(&self) -> u32 {
        self.rate
    }

    async fn enable(&mut self) -> Result<(), BusError> {
        self.enabled += 1;
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, BusError> {
        let n = data.len().min(self.max_write);
        self.output.extend_from_slice(&data[..n]);
        self.writes += 1;
        if let Some((limit, control)) = self.stop_after {
            if self.output.len() >= limit {
                control.request_stop();
            }
        }
        if let Some((limit, control, generation)) = self.cancel_after {
            if self.output.len() >= limit {
                control.cancel(generation);
            }
        }
        Ok(n)
    }
}

/// In-memory file store
pub struct MockFiles {
    files: Vec<(&'static str, Vec<u8>)>,
    /// (file index, position) per open handle; `None` once closed
    open: Vec<Option<(usize, usize)>>,
    pub opens: usize,
    pub closes: usize,
    /// Largest number of bytes returned per read
    pub max_read: usize,
}

impl MockFiles {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            open: Vec::new(),
            opens: 0,
            closes: 0,
            max_read: usize::MAX,
        }
    }

    pub fn add(&mut self, path: &'static str, data: Vec<u8>) {
        self.files.push((path, data));
    }

    pub fn open_handles(&self) -> usize {
        self.open.iter().filter(|h| h.is_some()).count()
    }
}

impl FileSource for MockFiles {
    type Handle = usize;

    async fn open(&mut self, path: &str) -> Result<usize, StorageError> {
        let idx = self
            .files
            .iter()
            .position(|(p, _)| *p == path)
            .ok_or(StorageError::NotFound)?;
        self.opens += 1;
        self.open.push(Some((idx, 0)));
        Ok(self.open.len() - 1)
    }

    async fn read(&mut self, file: usize, buf: &mut [u8]) -> Result<usize, StorageError> {
        let (idx, pos) = self.open[file].ok_or(StorageError::Device)?;
        let data = &self.files[idx].1;
        let start = pos.min(data.len());
        let n = (data.len() - start).min(buf.len()).min(self.max_read);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.open[file] = Some((idx, start + n));
        Ok(n)
    }

    async fn seek(&mut self, file: usize, offset: i32) -> Result<(), StorageError> {
        let (idx, pos) = self.open[file].ok_or(StorageError::Device)?;
        let new_pos = pos as i64 + offset as i64;
        if new_pos < 0 {
            return Err(StorageError::Device);
        }
        self.open[file] = Some((idx, new_pos as usize));
        Ok(())
    }

    async fn close(&mut self, file: usize) -> Result<(), StorageError> {
        self.open[file].take().ok_or(StorageError::Device)?;
        self.closes += 1;
        Ok(())
    }
}

/// Build a WAV file: RIFF header, fmt chunk, `extra` chunks, then data
pub fn wav_bytes(
    channels: u16,
    rate: u32,
    bits: u16,
    extra: &[(&[u8; 4], &[u8])],
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"WAVE");
    body.extend_from_slice(b"fmt ");
    body.extend_from_slice(&16u32.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&channels.to_le_bytes());
    body.extend_from_slice(&rate.to_le_bytes());
    let block = channels * bits / 8;
    body.extend_from_slice(&(rate * block as u32).to_le_bytes());
    body.extend_from_slice(&block.to_le_bytes());
    body.extend_from_slice(&bits.to_le_bytes());
    for (id, payload) in extra {
        body.extend_from_slice(*id);
        body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        body.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            body.push(0);
        }
    }
    body.extend_from_slice(b"data");
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(data);

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// Stereo PCM payload with a recognizable ramp
pub fn pcm_frames(frames: usize) -> Vec<u8> {
    let mut v = Vec::with_capacity(frames * 4);
    for i in 0..frames {
        let s = (i as i16).wrapping_mul(3);
        v.extend_from_slice(&s.to_le_bytes());
        v.extend_from_slice(&s.wrapping_neg().to_le_bytes());
    }
    v
}
