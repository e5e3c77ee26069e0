/// Outcome of the most recently completed or in-flight acquisition.
///
/// The discriminants form a fixed integer vocabulary shared with other
/// implementations of this protocol: success and in-progress codes are
/// zero or positive, error codes are negative. Callers that switch on
/// the raw code can rely on these values never changing.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i8)]
pub enum Status {
    /// Acquisition finished and the checksum matched.
    Ok = 0,
    /// An acquisition is in flight.
    Acquiring = 1,
    /// The full 40-bit frame has been received.
    Acquired = 2,
    /// The sensor's response handshake completed.
    ResponseOk = 3,
    /// The received checksum byte did not match the data bytes.
    ChecksumError = -1,
    /// No edge activity within the overall acquisition timeout.
    IsrTimeout = -2,
    /// The response handshake took longer than allowed.
    ResponseTimeout = -3,
    /// A data-bit interval took longer than allowed.
    DataTimeout = -4,
    /// A new acquisition was requested while one was still in flight.
    AlreadyAcquiring = -5,
    /// The edge source delivered an implausible (zero-length) interval.
    DeltaError = -6,
    /// No acquisition has been run yet.
    NotStarted = -7,
}

impl Status {
    /// Raw integer code, suitable for storage in an atomic cell.
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// Recovers a status from its raw code.
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::Acquiring),
            2 => Some(Self::Acquired),
            3 => Some(Self::ResponseOk),
            -1 => Some(Self::ChecksumError),
            -2 => Some(Self::IsrTimeout),
            -3 => Some(Self::ResponseTimeout),
            -4 => Some(Self::DataTimeout),
            -5 => Some(Self::AlreadyAcquiring),
            -6 => Some(Self::DeltaError),
            -7 => Some(Self::NotStarted),
            _ => None,
        }
    }

    /// True for the negative (error) half of the vocabulary.
    pub const fn is_error(self) -> bool {
        self.code() < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_fixed() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Acquiring.code(), 1);
        assert_eq!(Status::Acquired.code(), 2);
        assert_eq!(Status::ResponseOk.code(), 3);
        assert_eq!(Status::ChecksumError.code(), -1);
        assert_eq!(Status::IsrTimeout.code(), -2);
        assert_eq!(Status::ResponseTimeout.code(), -3);
        assert_eq!(Status::DataTimeout.code(), -4);
        assert_eq!(Status::AlreadyAcquiring.code(), -5);
        assert_eq!(Status::DeltaError.code(), -6);
        assert_eq!(Status::NotStarted.code(), -7);
    }

    #[test]
    fn code_round_trip() {
        for code in -7..=3 {
            let status = Status::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(Status::from_code(4), None);
        assert_eq!(Status::from_code(-8), None);
    }

    #[test]
    fn error_group_is_negative() {
        assert!(!Status::Ok.is_error());
        assert!(!Status::Acquiring.is_error());
        assert!(!Status::ResponseOk.is_error());
        assert!(Status::ChecksumError.is_error());
        assert!(Status::NotStarted.is_error());
    }
}
