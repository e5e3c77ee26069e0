use crate::status::Status;

/// Possible errors from the acquisition engine.
///
/// Each protocol or usage failure mirrors one entry of the error half of
/// the [`Status`] vocabulary; `Pin` wraps the GPIO error type.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// Checksum did not match the received data.
    Checksum,
    /// No edge activity within the overall acquisition timeout.
    IsrTimeout,
    /// The sensor's response handshake timed out.
    ResponseTimeout,
    /// A data-bit interval timed out.
    DataTimeout,
    /// An acquisition is still in flight.
    Acquiring,
    /// The edge source delivered an implausible interval.
    Delta,
    /// No acquisition has been run yet.
    NotStarted,
    /// Error from the GPIO pin driving the signal line.
    Pin(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}

impl<E> DhtError<E> {
    /// Maps the error half of the status vocabulary onto an error value.
    ///
    /// Returns `None` for the success and in-progress codes.
    pub fn from_status(status: Status) -> Option<Self> {
        match status {
            Status::ChecksumError => Some(Self::Checksum),
            Status::IsrTimeout => Some(Self::IsrTimeout),
            Status::ResponseTimeout => Some(Self::ResponseTimeout),
            Status::DataTimeout => Some(Self::DataTimeout),
            Status::AlreadyAcquiring => Some(Self::Acquiring),
            Status::DeltaError => Some(Self::Delta),
            Status::NotStarted => Some(Self::NotStarted),
            Status::Ok | Status::Acquiring | Status::Acquired | Status::ResponseOk => None,
        }
    }
}
