//! The interrupt-side half of the acquisition engine.
//!
//! An [`EdgeDecoder`] turns the stream of edge timestamps delivered by the
//! platform's pin-change interrupt into the sensor's 5-byte frame. Every
//! field is an atomic cell, so the decoder can live in a `static` that both
//! the interrupt handler and the foreground reach; the handler is the only
//! writer while an acquisition is in flight, the foreground only reads
//! (plus the forced-timeout path, which runs strictly after the handler has
//! gone quiet). No floating-point work happens here.

use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU8, AtomicU32, Ordering};

use crate::status::Status;

/// Anything shorter than this during the handshake is treated as noise.
const NOISE_US: u32 = 40;
/// Longest tolerated interval while waiting for the response handshake.
const RESPONSE_TIMEOUT_US: u32 = 200;
/// Longest tolerated interval between edges of the data phase.
const DATA_TIMEOUT_US: u32 = 200;
/// Pulses at least this long decode as a 1 bit. The short pulse is
/// 26-28 us and the long one ~70 us, so an interval landing exactly on the
/// threshold reads as long.
const BIT_ONE_THRESHOLD_US: u32 = 50;

/// Counted handshake intervals (the ~80 us low and ~80 us high halves).
const HANDSHAKE_EDGES: u8 = 2;
const FRAME_BYTES: usize = 5;
const FRAME_BITS: u8 = 40;

/// Diagnostic log capacity: the completed handshake interval plus one entry
/// per data bit.
pub const EDGE_LOG_CAPACITY: usize = 41;

/// Phase of the decode state machine.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Waiting for the sensor's low-then-high handshake.
    Response = 0,
    /// Receiving the 40 data bits.
    Data = 1,
    /// Frame complete, checksum verified.
    Acquired = 2,
    /// Idle before first use, or halted after success/failure.
    Stopped = 3,
    /// Acquisition requested, no edge seen yet.
    Acquiring = 4,
}

impl State {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Response,
            1 => Self::Data,
            2 => Self::Acquired,
            4 => Self::Acquiring,
            _ => Self::Stopped,
        }
    }
}

/// Decodes edge timestamps into a raw sensor frame.
///
/// `const`-constructible so it can be placed in a `static` and shared with
/// the interrupt handler:
///
/// ```ignore
/// static DECODER: EdgeDecoder = EdgeDecoder::new();
///
/// // in the pin-change ISR:
/// DECODER.on_edge(micros());
/// ```
pub struct EdgeDecoder {
    state: AtomicU8,
    status: AtomicI8,
    frame: [AtomicU8; FRAME_BYTES],
    /// Data bits received so far (0..=40).
    bits_seen: AtomicU8,
    handshake_edges: AtomicU8,
    /// Set while the next data-phase interval is the ~50 us sync low.
    sync_pending: AtomicBool,
    last_edge_us: AtomicU32,
    convert: AtomicBool,
    detach: AtomicBool,
    edge_count: AtomicU8,
    edges: [AtomicU8; EDGE_LOG_CAPACITY],
}

impl EdgeDecoder {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(State::Stopped as u8),
            status: AtomicI8::new(Status::NotStarted.code()),
            frame: [const { AtomicU8::new(0) }; FRAME_BYTES],
            bits_seen: AtomicU8::new(0),
            handshake_edges: AtomicU8::new(0),
            sync_pending: AtomicBool::new(false),
            last_edge_us: AtomicU32::new(0),
            convert: AtomicBool::new(false),
            detach: AtomicBool::new(false),
            edge_count: AtomicU8::new(0),
            edges: [const { AtomicU8::new(0) }; EDGE_LOG_CAPACITY],
        }
    }

    /// Resets the cursor, frame and diagnostic log for a new acquisition.
    ///
    /// `now_us` is the moment the signal pin was released; the first edge
    /// interval is measured from here.
    pub fn begin(&self, now_us: u32) {
        for byte in &self.frame {
            byte.store(0, Ordering::Relaxed);
        }
        self.bits_seen.store(0, Ordering::Relaxed);
        self.handshake_edges.store(0, Ordering::Relaxed);
        self.sync_pending.store(false, Ordering::Relaxed);
        self.edge_count.store(0, Ordering::Relaxed);
        self.convert.store(false, Ordering::Relaxed);
        self.detach.store(false, Ordering::Relaxed);
        self.last_edge_us.store(now_us, Ordering::Relaxed);
        self.status.store(Status::Acquiring.code(), Ordering::Relaxed);
        self.state.store(State::Acquiring as u8, Ordering::Release);
    }

    /// Advances the state machine by one signal transition.
    ///
    /// Must be called once per edge, in arrival order, with the wrapping
    /// microsecond timestamp of the transition. Safe to call from an
    /// interrupt context; edges arriving after a terminal state are no-ops.
    pub fn on_edge(&self, now_us: u32) {
        let state = self.state();
        if matches!(state, State::Stopped | State::Acquired) {
            // Late or spurious interrupt.
            return;
        }

        let delta = now_us.wrapping_sub(self.last_edge_us.load(Ordering::Relaxed));
        if delta == 0 {
            self.fail(Status::DeltaError);
            return;
        }
        self.last_edge_us.store(now_us, Ordering::Relaxed);

        match state {
            // First edge: the sensor pulling the bus low opens the handshake.
            State::Acquiring => self.state.store(State::Response as u8, Ordering::Release),
            State::Response => self.response_edge(delta),
            State::Data => self.data_edge(delta),
            State::Acquired | State::Stopped => {}
        }
    }

    fn response_edge(&self, delta: u32) {
        if delta > RESPONSE_TIMEOUT_US {
            self.fail(Status::ResponseTimeout);
            return;
        }
        if delta < NOISE_US {
            // Glitch: fold it into the next interval.
            let rolled = self.last_edge_us.load(Ordering::Relaxed).wrapping_sub(delta);
            self.last_edge_us.store(rolled, Ordering::Relaxed);
            return;
        }

        let seen = self.handshake_edges.load(Ordering::Relaxed) + 1;
        self.handshake_edges.store(seen, Ordering::Relaxed);
        if seen >= HANDSHAKE_EDGES {
            self.log_interval(delta);
            self.sync_pending.store(true, Ordering::Relaxed);
            self.status.store(Status::ResponseOk.code(), Ordering::Relaxed);
            self.state.store(State::Data as u8, Ordering::Release);
        }
    }

    fn data_edge(&self, delta: u32) {
        if delta > DATA_TIMEOUT_US {
            self.fail(Status::DataTimeout);
            return;
        }

        // Intervals alternate: the ~50 us sync low, then the pulse that
        // carries the bit.
        if self.sync_pending.swap(false, Ordering::Relaxed) {
            return;
        }
        self.sync_pending.store(true, Ordering::Relaxed);

        self.log_interval(delta);
        let bit = delta >= BIT_ONE_THRESHOLD_US;

        let bits_seen = self.bits_seen.load(Ordering::Relaxed);
        if let Some(byte) = self.frame.get(usize::from(bits_seen / 8)) {
            let shifted = (byte.load(Ordering::Relaxed) << 1) | u8::from(bit);
            byte.store(shifted, Ordering::Relaxed);
        }

        if bits_seen + 1 == FRAME_BITS {
            self.finish_frame();
        } else {
            self.bits_seen.store(bits_seen + 1, Ordering::Relaxed);
        }
    }

    fn finish_frame(&self) {
        let frame = self.frame();
        let sum = frame[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v));

        self.detach.store(true, Ordering::Relaxed);
        if sum == frame[4] {
            self.convert.store(true, Ordering::Relaxed);
            self.status.store(Status::Ok.code(), Ordering::Relaxed);
            self.state.store(State::Acquired as u8, Ordering::Release);
        } else {
            self.status.store(Status::ChecksumError.code(), Ordering::Relaxed);
            self.state.store(State::Stopped as u8, Ordering::Release);
        }
    }

    fn fail(&self, status: Status) {
        self.detach.store(true, Ordering::Relaxed);
        self.status.store(status.code(), Ordering::Relaxed);
        self.state.store(State::Stopped as u8, Ordering::Release);
    }

    /// Forces an in-flight acquisition into the timed-out terminal state.
    ///
    /// Invoked by the foreground when the overall acquisition deadline
    /// passes without the handler reaching a terminal state.
    pub(crate) fn force_timeout(&self) {
        if self.in_flight() {
            self.fail(Status::IsrTimeout);
        }
    }

    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn status(&self) -> Status {
        Status::from_code(self.status.load(Ordering::Acquire)).unwrap_or(Status::NotStarted)
    }

    /// True while an acquisition has been started but not reached a
    /// terminal state.
    pub fn in_flight(&self) -> bool {
        matches!(
            self.state(),
            State::Acquiring | State::Response | State::Data
        )
    }

    /// Snapshot of the raw frame bytes.
    ///
    /// Only meaningful once [`status`](Self::status) is [`Status::Ok`].
    pub fn frame(&self) -> [u8; FRAME_BYTES] {
        let mut out = [0; FRAME_BYTES];
        for (dst, src) in out.iter_mut().zip(&self.frame) {
            *dst = src.load(Ordering::Relaxed);
        }
        out
    }

    /// Index of the data bit the cursor sits on (clamped to 39).
    pub fn bit_index(&self) -> u8 {
        self.bits_seen.load(Ordering::Relaxed).min(FRAME_BITS - 1)
    }

    /// Index of the frame byte the cursor sits on (clamped to 4).
    pub fn byte_index(&self) -> u8 {
        self.bit_index() / 8
    }

    /// Consumes the pending needs-conversion marker.
    pub(crate) fn take_convert(&self) -> bool {
        self.convert.swap(false, Ordering::Relaxed)
    }

    /// Consumes the pending request to detach the edge capture.
    pub(crate) fn take_detach_request(&self) -> bool {
        self.detach.swap(false, Ordering::Relaxed)
    }

    /// Copies the captured inter-edge intervals (saturated to 255 us) into
    /// `out` and returns how many were written.
    pub fn edge_log(&self, out: &mut [u8]) -> usize {
        let count = usize::from(self.edge_count.load(Ordering::Relaxed));
        let n = count.min(out.len()).min(EDGE_LOG_CAPACITY);
        for (dst, src) in out.iter_mut().zip(&self.edges).take(n) {
            *dst = src.load(Ordering::Relaxed);
        }
        n
    }

    fn log_interval(&self, delta: u32) {
        let n = usize::from(self.edge_count.load(Ordering::Relaxed));
        if let Some(slot) = self.edges.get(n) {
            slot.store(delta.min(u32::from(u8::MAX)) as u8, Ordering::Relaxed);
            self.edge_count.store((n + 1) as u8, Ordering::Relaxed);
        }
    }
}

impl Default for EdgeDecoder {
    fn default() -> Self {
        Self::new()
    }
}
