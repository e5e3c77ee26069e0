//! Platform services the engine consumes but `embedded-hal` does not model.

/// Arms and disarms delivery of signal-edge events.
///
/// An implementation typically wraps the target's pin-change interrupt
/// registration (both edge directions) and routes each event to
/// [`EdgeDecoder::on_edge`](crate::EdgeDecoder::on_edge) together with the
/// current microsecond timestamp.
pub trait EdgeCapture {
    /// Start delivering edge events for the signal pin.
    fn arm(&mut self);

    /// Stop delivering edge events.
    fn disarm(&mut self);
}

/// A read-only, wrapping microsecond counter.
///
/// The counter is allowed to wrap during an acquisition; all elapsed-time
/// math in this crate uses wrapping subtraction.
pub trait MonotonicMicros {
    /// Microseconds since some fixed reference point.
    fn now_us(&mut self) -> u32;
}
