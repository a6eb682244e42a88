//! Progressive accumulation state shared between render passes and the display.
//!
//! One mutex guards the accumulation buffer, the per-pixel sample counts and
//! the resolved display buffer, so a reader never observes a half-committed
//! pass. Passes render without holding the lock and commit at the end; a
//! pass that started before a [`RenderState::reset`] is discarded.

use lux_core::Color;
use parking_lot::Mutex;

use crate::{resolve_pixel, RenderError, RenderResult};

/// Buffers guarded by the state mutex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBuffers {
    /// Sum of all committed samples per pixel
    pub accum: Vec<Color>,
    /// Number of committed samples per pixel
    pub samples: Vec<u32>,
    /// Resolved BGRA pixels
    pub display: Vec<[u8; 4]>,
    /// Completed full-frame passes
    pub passes: u32,
    /// Incremented by every reset
    pub generation: u64,
}

impl FrameBuffers {
    fn new(pixel_count: usize) -> Self {
        Self {
            accum: vec![Color::ZERO; pixel_count],
            samples: vec![0; pixel_count],
            display: vec![[0, 0, 0, 255]; pixel_count],
            passes: 0,
            generation: 0,
        }
    }

    fn clear(&mut self) {
        self.accum.fill(Color::ZERO);
        self.samples.fill(0);
        self.display.fill([0, 0, 0, 255]);
        self.passes = 0;
        self.generation += 1;
    }

    fn ticket(&self) -> PassTicket {
        PassTicket {
            generation: self.generation,
            pass: self.passes,
        }
    }

    #[inline]
    fn add_sample(&mut self, pixel: usize, sample: Color) {
        self.accum[pixel] += sample;
        self.samples[pixel] += 1;
        self.display[pixel] = resolve_pixel(self.accum[pixel], self.samples[pixel]);
    }
}

/// Identifies the accumulation generation a pass was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    pub generation: u64,
    /// Index of the pass within its generation
    pub pass: u32,
}

/// Accumulated radiance and display buffer for one frame size.
#[derive(Debug)]
pub struct RenderState {
    width: u32,
    height: u32,
    buffers: Mutex<FrameBuffers>,
}

impl RenderState {
    /// Create zeroed buffers for a `width` x `height` frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffers: Mutex::new(FrameBuffers::new(width as usize * height as usize)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Zero all accumulation and restart the pass counter.
    ///
    /// Call whenever the camera, scene or render settings change. Passes in
    /// flight are discarded when they commit.
    pub fn reset(&self) {
        let mut buffers = self.buffers.lock();
        buffers.clear();
        log::debug!("Accumulation reset (generation {})", buffers.generation);
    }

    /// Start a full-frame pass.
    pub fn tick(&self) -> PassTicket {
        self.buffers.lock().ticket()
    }

    /// Start a full-frame pass and copy every pixel's sample count.
    ///
    /// Pixel `i` of the pass uses sample index `counts[i]`, so passes never
    /// repeat a random stream already spent by single-pixel renders.
    pub fn begin_pass(&self) -> (PassTicket, Vec<u32>) {
        let buffers = self.buffers.lock();
        (buffers.ticket(), buffers.samples.clone())
    }

    /// Add one sample per pixel from a completed pass.
    ///
    /// Returns `Ok(false)` if the state was reset after the pass started.
    pub fn commit_pass(&self, ticket: PassTicket, frame: &[Color]) -> RenderResult<bool> {
        if frame.len() != self.pixel_count() {
            return Err(RenderError::BufferSize {
                expected: self.pixel_count(),
                actual: frame.len(),
            });
        }

        let mut buffers = self.buffers.lock();
        if buffers.generation != ticket.generation {
            return Ok(false);
        }
        for (pixel, &sample) in frame.iter().enumerate() {
            buffers.add_sample(pixel, sample);
        }
        buffers.passes += 1;
        Ok(true)
    }

    /// Ticket and sample index for rendering a single pixel.
    pub fn begin_pixel(&self, pixel: usize) -> RenderResult<(PassTicket, u32)> {
        let buffers = self.buffers.lock();
        let samples = *buffers.samples.get(pixel).ok_or(RenderError::PixelOutOfRange {
            pixel,
            count: self.pixel_count(),
        })?;
        Ok((buffers.ticket(), samples))
    }

    /// Add one sample to a single pixel and re-resolve it.
    ///
    /// Returns `Ok(false)` if the state was reset after `begin_pixel`.
    pub fn commit_pixel(&self, ticket: PassTicket, pixel: usize, sample: Color) -> RenderResult<bool> {
        if pixel >= self.pixel_count() {
            return Err(RenderError::PixelOutOfRange {
                pixel,
                count: self.pixel_count(),
            });
        }

        let mut buffers = self.buffers.lock();
        if buffers.generation != ticket.generation {
            return Ok(false);
        }
        buffers.add_sample(pixel, sample);
        Ok(true)
    }

    /// Completed full-frame passes since the last reset.
    pub fn passes(&self) -> u32 {
        self.buffers.lock().passes
    }

    /// Copy of the resolved BGRA frame, `width * height * 4` bytes.
    pub fn snapshot_display(&self) -> Vec<u8> {
        let buffers = self.buffers.lock();
        bytemuck::cast_slice(&buffers.display).to_vec()
    }

    /// Copy of all buffers.
    pub fn snapshot(&self) -> FrameBuffers {
        self.buffers.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_accumulates_and_resolves() {
        let state = RenderState::new(2, 1);
        let ticket = state.tick();
        assert_eq!(ticket.pass, 0);
        assert!(state.commit_pass(ticket, &[Color::ONE, Color::ZERO]).unwrap());
        let ticket = state.tick();
        assert_eq!(ticket.pass, 1);
        assert!(state.commit_pass(ticket, &[Color::ZERO, Color::X]).unwrap());

        assert_eq!(state.passes(), 2);
        let display = state.snapshot_display();
        assert_eq!(display.len(), 8);
        assert_eq!(&display[0..4], &[127, 127, 127, 255]);
        assert_eq!(&display[4..8], &[0, 0, 127, 255]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let state = RenderState::new(3, 2);
        let ticket = state.tick();
        state.commit_pass(ticket, &[Color::ONE; 6]).unwrap();

        state.reset();
        let once = state.snapshot();
        state.reset();
        let twice = state.snapshot();

        for buffers in [&once, &twice] {
            assert!(buffers.accum.iter().all(|c| *c == Color::ZERO));
            assert!(buffers.samples.iter().all(|&n| n == 0));
            assert_eq!(buffers.passes, 0);
        }
        assert_eq!(once.accum, twice.accum);
        assert_eq!(once.display, twice.display);
        assert_eq!(state.passes(), 0);
    }

    #[test]
    fn test_stale_pass_is_discarded() {
        let state = RenderState::new(1, 1);
        let stale = state.tick();
        state.reset();

        assert!(!state.commit_pass(stale, &[Color::ONE]).unwrap());
        assert_eq!(state.passes(), 0);
        assert_eq!(state.snapshot().accum[0], Color::ZERO);

        let fresh = state.tick();
        assert!(state.commit_pass(fresh, &[Color::ONE]).unwrap());
        assert_eq!(state.passes(), 1);
    }

    #[test]
    fn test_wrong_frame_size_is_rejected() {
        let state = RenderState::new(2, 2);
        let ticket = state.tick();
        assert!(matches!(
            state.commit_pass(ticket, &[Color::ONE; 3]),
            Err(RenderError::BufferSize { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_begin_pass_reports_per_pixel_counts() {
        let state = RenderState::new(2, 1);
        let (ticket, _) = state.begin_pixel(1).unwrap();
        state.commit_pixel(ticket, 1, Color::ONE).unwrap();

        let (ticket, counts) = state.begin_pass();
        assert_eq!(ticket, state.tick());
        assert_eq!(counts, vec![0, 1]);
    }

    #[test]
    fn test_single_pixel_commit() {
        let state = RenderState::new(2, 2);
        let (ticket, sample) = state.begin_pixel(3).unwrap();
        assert_eq!(sample, 0);
        assert!(state.commit_pixel(ticket, 3, Color::ONE).unwrap());

        let (_, sample) = state.begin_pixel(3).unwrap();
        assert_eq!(sample, 1);
        assert_eq!(state.passes(), 0);
        assert_eq!(&state.snapshot_display()[12..16], &[255, 255, 255, 255]);
        assert!(state.begin_pixel(4).is_err());
    }
}
