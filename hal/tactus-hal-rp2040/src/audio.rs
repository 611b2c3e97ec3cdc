//! PIO-based I2S output
//!
//! Uses the embassy-rp I2S program on one PIO state machine with DMA. Each
//! 32-bit word carries one stereo frame, left sample in the upper half,
//! shifted out MSB first.

use embassy_rp::dma::Channel;
use embassy_rp::pio::{Common, Instance, PioPin, StateMachine};
use embassy_rp::pio_programs::i2s::{PioI2sOut, PioI2sOutProgram};
use embassy_rp::Peri;

use tactus_hal::{AudioSink, BusError};

/// Bits per sample on the wire
pub const BIT_DEPTH: u32 = 16;

/// Frames moved per DMA transfer
pub const DMA_FRAMES: usize = 256;

const FRAME_BYTES: usize = 4;

/// Pack one little-endian `L0 L1 R0 R1` frame into an I2S word
pub fn pack_frame(frame: &[u8]) -> u32 {
    let left = u16::from_le_bytes([frame[0], frame[1]]) as u32;
    let right = u16::from_le_bytes([frame[2], frame[3]]) as u32;
    (left << 16) | right
}

/// I2S output on a PIO state machine
///
/// Bit clock and word select must be consecutive pins, bit clock first.
pub struct PioI2sSink<'d, P: Instance, const S: usize> {
    out: PioI2sOut<'d, P, S>,
    // owns the instruction memory the program was loaded into
    _common: Common<'d, P>,
    rate: u32,
    enabled: bool,
    words: [u32; DMA_FRAMES],
}

impl<'d, P: Instance, const S: usize> PioI2sSink<'d, P, S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mut common: Common<'d, P>,
        sm: StateMachine<'d, P, S>,
        dma: Peri<'d, impl Channel>,
        data_pin: Peri<'d, impl PioPin>,
        bit_clock_pin: Peri<'d, impl PioPin>,
        word_select_pin: Peri<'d, impl PioPin>,
        sample_rate: u32,
    ) -> Self {
        let program = PioI2sOutProgram::new(&mut common);
        let out = PioI2sOut::new(
            &mut common,
            sm,
            dma,
            data_pin,
            bit_clock_pin,
            word_select_pin,
            sample_rate,
            BIT_DEPTH,
            &program,
        );
        Self {
            out,
            _common: common,
            rate: sample_rate,
            enabled: false,
            words: [0; DMA_FRAMES],
        }
    }
}

impl<P: Instance, const S: usize> AudioSink for PioI2sSink<'_, P, S> {
    fn sample_rate(&self) -> u32 {
        self.rate
    }

    async fn enable(&mut self) -> Result<(), BusError> {
        if !self.enabled {
            // clock out one buffer of silence so the DAC locks before real data
            self.words.fill(0);
            self.out.write(&self.words).await;
            self.enabled = true;
        }
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, BusError> {
        if !self.enabled {
            return Err(BusError::Transport);
        }
        let frames = (data.len() / FRAME_BYTES).min(DMA_FRAMES);
        if frames == 0 {
            // less than one frame left; it cannot be played
            return Ok(data.len());
        }
        for (word, frame) in self.words.iter_mut().zip(data.chunks_exact(FRAME_BYTES)) {
            *word = pack_frame(frame);
        }
        self.out.write(&self.words[..frames]).await;
        Ok(frames * FRAME_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_frame() {
        assert_eq!(pack_frame(&[0x34, 0x12, 0x78, 0x56]), 0x1234_5678);
        // negative samples keep their two's complement bits
        let l = (-2i16).to_le_bytes();
        let r = 1i16.to_le_bytes();
        assert_eq!(pack_frame(&[l[0], l[1], r[0], r[1]]), 0xFFFE_0001);
    }
}
