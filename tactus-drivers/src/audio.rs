//! Audio Streaming Engine
//!
//! Drives an [`AudioSink`] with either a synthesized sine tone or the PCM
//! payload of a WAV file read from a [`FileSource`]. Output is always
//! interleaved stereo, 16-bit little-endian.
//!
//! File playback can be cancelled from another context through the shared
//! [`PlaybackControl`]. Tones always run to completion.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use tactus_core::transfer::ChunkPlan;
use tactus_core::wav::{
    parse_riff_header, ChunkHeader, WavFormat, WavHeader, CHUNK_HEADER_LEN, FMT_BODY_LEN,
    RIFF_HEADER_LEN,
};
use tactus_core::{Error, ProtocolError, Result};
use tactus_hal::{AudioSink, BusError, FileSource};

/// Frames synthesized per tone write
pub const TONE_FRAMES: usize = 256;
/// Bytes read from the file per chunk
pub const FILE_CHUNK_BYTES: usize = 16 * 1024;

pub const DEFAULT_TONE_HZ: f32 = 880.0;
pub const DEFAULT_VOLUME: f32 = 0.3;

const FRAME_BYTES: usize = 4;
const TWO_PI: f32 = core::f32::consts::PI * 2.0;

/// Playback state shared between the engine and whoever may cancel it
///
/// Lives in a `static` so the stop request can be raised from a context
/// that does not own the engine.
///
/// Also records the newest withdrawn play request by generation, so a
/// request still waiting in a queue can be skipped before it starts.
pub struct PlaybackControl {
    stop: AtomicBool,
    playing: AtomicBool,
    cancelled: AtomicU32,
}

impl Default for PlaybackControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackControl {
    pub const fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            cancelled: AtomicU32::new(0),
        }
    }

    /// Ask the running file playback to end at its next check
    ///
    /// Ignored while nothing is playing. Repeated requests have no further
    /// effect.
    pub fn request_stop(&self) {
        if self.playing.load(Ordering::Acquire) {
            self.stop.store(true, Ordering::Release);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Withdraw every play request up to and including `generation`
    ///
    /// Stops the running playback as [`Self::request_stop`] does.
    pub fn cancel(&self, generation: u32) {
        self.cancelled.store(generation, Ordering::Release);
        self.request_stop();
    }

    /// Whether the play request numbered `generation` was withdrawn
    ///
    /// Generations wrap; anything within half the range behind the last
    /// cancel counts as withdrawn.
    pub fn is_cancelled(&self, generation: u32) -> bool {
        let behind = self.cancelled.load(Ordering::Acquire).wrapping_sub(generation);
        behind < 1 << 31
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn begin(&self) {
        self.stop.store(false, Ordering::Release);
        self.playing.store(true, Ordering::Release);
    }

    fn finish(&self) {
        self.stop.store(false, Ordering::Release);
        self.playing.store(false, Ordering::Release);
    }
}

/// Tone and WAV playback over one output sink
pub struct AudioEngine<S, F> {
    sink: S,
    files: F,
    control: &'static PlaybackControl,
    rate: Option<u32>,
    tone: [u8; TONE_FRAMES * FRAME_BYTES],
    chunk: [u8; FILE_CHUNK_BYTES],
}

impl<S: AudioSink, F: FileSource> AudioEngine<S, F> {
    pub fn new(sink: S, files: F, control: &'static PlaybackControl) -> Self {
        Self {
            sink,
            files,
            control,
            rate: None,
            tone: [0; TONE_FRAMES * FRAME_BYTES],
            chunk: [0; FILE_CHUNK_BYTES],
        }
    }

    /// Bring up the output at `sample_rate`
    ///
    /// A second call once active succeeds without touching the sink. The
    /// rate must be non-zero and match what the sink was built for.
    pub async fn initialize(&mut self, sample_rate: u32) -> Result<()> {
        if self.rate.is_some() {
            return Ok(());
        }
        if sample_rate == 0 || sample_rate != self.sink.sample_rate() {
            return Err(Error::InvalidArgument);
        }
        self.sink.enable().await?;
        self.rate = Some(sample_rate);
        Ok(())
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.rate
    }

    pub fn request_stop(&self) {
        self.control.request_stop();
    }

    pub fn is_playing(&self) -> bool {
        self.control.is_playing()
    }

    /// Play a sine tone on both channels
    ///
    /// `volume` outside (0, 1] falls back to [`DEFAULT_VOLUME`]; a frequency
    /// that is not positive falls back to [`DEFAULT_TONE_HZ`].
    pub async fn play_tone(&mut self, freq_hz: f32, duration_ms: u32, volume: f32) -> Result<()> {
        let rate = self.rate.ok_or(Error::InvalidArgument)?;
        let freq = if freq_hz > 0.0 { freq_hz } else { DEFAULT_TONE_HZ };
        let volume = if volume > 0.0 && volume <= 1.0 {
            volume
        } else {
            DEFAULT_VOLUME
        };

        let total = usize::try_from(rate as u64 * duration_ms as u64 / 1000).unwrap_or(usize::MAX);
        let step = TWO_PI * freq / rate as f32;
        let amplitude = i16::MAX as f32 * volume;
        let mut phase = 0.0f32;

        for range in ChunkPlan::new(total, TONE_FRAMES) {
            let bytes = range.len() * FRAME_BYTES;
            for frame in self.tone[..bytes].chunks_exact_mut(FRAME_BYTES) {
                let sample = (libm::sinf(phase) * amplitude) as i16;
                let [lo, hi] = sample.to_le_bytes();
                frame.copy_from_slice(&[lo, hi, lo, hi]);
                phase += step;
                if phase >= TWO_PI {
                    phase -= TWO_PI;
                }
            }
            write_all(&mut self.sink, &self.tone[..bytes], None).await?;
        }
        Ok(())
    }

    /// Stream a WAV file until its data ends or a stop is requested
    ///
    /// The header is fully validated before the first sample is written. The
    /// file is closed exactly once on every path, and the engine is idle
    /// again when this returns.
    pub async fn play_file(&mut self, path: &str) -> Result<()> {
        let rate = self.rate.ok_or(Error::InvalidArgument)?;
        let file = self.files.open(path).await?;
        self.control.begin();

        let streamed = self.stream(file, rate).await;
        let closed = self.files.close(file).await;
        self.control.finish();

        streamed?;
        closed?;
        Ok(())
    }

    async fn stream(&mut self, file: F::Handle, rate: u32) -> Result<()> {
        let header = read_header(&mut self.files, file).await?;
        header.format.validate(rate)?;

        let frame = header.format.frame_len();
        // streamed files leave the size at 0 and run to end of file
        let mut remaining = match header.data_size {
            0 => usize::MAX,
            size => size as usize,
        };
        remaining -= remaining % frame;

        while remaining > 0 && !self.control.stop_requested() {
            let want = remaining.min(FILE_CHUNK_BYTES);
            let got = read_full(&mut self.files, file, &mut self.chunk[..want]).await?;
            // a truncated payload ends on a whole frame
            let got = got - got % frame;
            if got == 0 {
                break;
            }
            if !write_all(&mut self.sink, &self.chunk[..got], Some(self.control)).await? {
                break;
            }
            remaining -= got;
        }
        Ok(())
    }
}

/// Walk the chunk list up to the start of the data payload
///
/// Unknown chunks are skipped wherever they appear. Reaching end of file,
/// or a chunk header cut short by it, means there is no audio data.
async fn read_header<F: FileSource>(files: &mut F, file: F::Handle) -> Result<WavHeader> {
    let mut riff = [0u8; RIFF_HEADER_LEN];
    read_exact(files, file, &mut riff).await?;
    parse_riff_header(&riff)?;

    let mut format: Option<WavFormat> = None;
    loop {
        let mut raw = [0u8; CHUNK_HEADER_LEN];
        if read_full(files, file, &mut raw).await? < CHUNK_HEADER_LEN {
            return Err(Error::NotFound);
        }
        let chunk = ChunkHeader::parse(&raw);

        if chunk.is_fmt() {
            if (chunk.size as usize) < FMT_BODY_LEN {
                return Err(malformed());
            }
            let mut body = [0u8; FMT_BODY_LEN];
            read_exact(files, file, &mut body).await?;
            format = Some(WavFormat::parse(&body));
            skip(files, file, chunk.skip_len() - FMT_BODY_LEN as u32).await?;
        } else if chunk.is_data() {
            let format = format.ok_or_else(malformed)?;
            return Ok(WavHeader {
                format,
                data_size: chunk.size,
            });
        } else {
            skip(files, file, chunk.skip_len()).await?;
        }
    }
}

fn malformed() -> Error {
    Error::Protocol(ProtocolError::MalformedContainer)
}

async fn skip<F: FileSource>(files: &mut F, file: F::Handle, len: u32) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let offset = i32::try_from(len).map_err(|_| malformed())?;
    files.seek(file, offset).await?;
    Ok(())
}

/// Read until `buf` is full or the file ends; returns the bytes read
async fn read_full<F: FileSource>(files: &mut F, file: F::Handle, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = files.read(file, &mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

async fn read_exact<F: FileSource>(files: &mut F, file: F::Handle, buf: &mut [u8]) -> Result<()> {
    if read_full(files, file, buf).await? != buf.len() {
        return Err(malformed());
    }
    Ok(())
}

/// Push `data` through the sink, following partial writes
///
/// With a control attached the stop flag is checked before every write and
/// `Ok(false)` is returned once it is set. A sink that accepts nothing is a
/// transport failure.
async fn write_all<S: AudioSink>(
    sink: &mut S,
    mut data: &[u8],
    control: Option<&PlaybackControl>,
) -> Result<bool> {
    while !data.is_empty() {
        if control.is_some_and(|c| c.stop_requested()) {
            return Ok(false);
        }
        let n = sink.write(data).await?;
        if n == 0 {
            return Err(Error::Bus(BusError::Transport));
        }
        data = &data[n.min(data.len())..];
    }
    Ok(true)
}
