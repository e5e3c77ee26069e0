//! Interrupt-driven DHT Sensor Acquisition for Embedded Rust
//!
//! This crate decodes the single-wire timing protocol of the DHT family of
//! humidity/temperature sensors (DHT11, DHT21/AM2301, DHT22/AM2302) from
//! edge-timestamp events, instead of bit-banging the line with blocking
//! reads. The platform's pin-change interrupt feeds an [`EdgeDecoder`]
//! (a `static`-friendly, all-atomic state machine); the foreground [`Dht`]
//! engine issues the start pulse, enforces timeouts and converts the
//! validated 5-byte frame into calibrated readings.
//!
//! # Features
//! - Non-blocking `acquire()` plus a cooperative `acquire_and_wait()`
//! - Fixed status-code vocabulary ([`Status`]) shared across contexts
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! GPIO and timing come from the [`embedded-hal`] traits:
//! - [`OutputPin`] to drive and release the open-drain signal line
//! - [`DelayNs`] for the start-pulse hold and the cooperative wait loop
//!
//! Two crate-local traits cover what `embedded-hal` does not model:
//! [`EdgeCapture`] (arm/disarm the pin-change interrupt) and
//! [`MonotonicMicros`] (wrapping microsecond counter).
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod decoder;
pub mod dewpoint;
pub mod dht;
pub mod error;
pub mod platform;
pub mod status;
pub mod variant;

pub use decoder::{EDGE_LOG_CAPACITY, EdgeDecoder, State};
pub use dewpoint::{dew_point, dew_point_slow};
pub use dht::{DEFAULT_ACQUIRE_TIMEOUT_US, Dht, Reading};
pub use error::DhtError;
pub use platform::{EdgeCapture, MonotonicMicros};
pub use status::Status;
pub use variant::SensorType;
