use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::decoder::{EdgeDecoder, State};
use crate::dewpoint;
use crate::error::DhtError;
use crate::platform::{EdgeCapture, MonotonicMicros};
use crate::status::Status;
use crate::variant::SensorType;

/// Fallback overall acquisition timeout: worst-case handshake plus forty
/// long bits, with roughly 2x margin.
pub const DEFAULT_ACQUIRE_TIMEOUT_US: u32 = 10_000;

/// Gap between status polls inside [`Dht::acquire_and_wait`].
const POLL_INTERVAL_US: u32 = 100;

/// Converted readings from one successful acquisition.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

/// The foreground half of the acquisition engine.
///
/// Owns the signal pin, the start-pulse timing and the query surface; the
/// shared [`EdgeDecoder`] does the interrupt-side decoding. One engine owns
/// its signal pin exclusively: it drives the start pulse, releases the bus,
/// arms the edge capture and disarms it again once the decoder reaches a
/// terminal state.
///
/// The pin is only ever driven low or released, never sampled, so an
/// open-drain output is the natural fit: `set_high` must let the bus
/// pull-up take over.
pub struct Dht<'a, PIN, DELAY, CLOCK, CAP> {
    pin: PIN,
    delay: DELAY,
    clock: CLOCK,
    capture: CAP,
    sensor: SensorType,
    decoder: &'a EdgeDecoder,
    legacy_callback: Option<fn()>,
    start_us: u32,
    timeout_us: u32,
    reading: Option<Reading>,
}

impl<'a, PIN, DELAY, CLOCK, CAP, E> Dht<'a, PIN, DELAY, CLOCK, CAP>
where
    PIN: OutputPin<Error = E>,
    DELAY: DelayNs,
    CLOCK: MonotonicMicros,
    CAP: EdgeCapture,
{
    /// Creates a new engine around a shared decoder.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin on the sensor's data line, open-drain.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - Wrapping microsecond counter for timeout tracking.
    /// * `capture` - Arms/disarms edge-event delivery for the pin.
    /// * `sensor` - Which DHT variant is attached.
    /// * `decoder` - The decoder the platform's edge interrupt feeds.
    pub fn new(
        pin: PIN,
        delay: DELAY,
        clock: CLOCK,
        capture: CAP,
        sensor: SensorType,
        decoder: &'a EdgeDecoder,
    ) -> Self {
        Self::new_with_callback(pin, delay, clock, capture, sensor, decoder, None)
    }

    /// Like [`new`](Self::new), but records a legacy wrapper callback.
    ///
    /// Early revisions of this protocol's drivers required callers to pass
    /// the function they had attached to the pin interrupt. The engine
    /// keeps the reference for interface compatibility and never invokes
    /// it.
    pub fn new_with_callback(
        pin: PIN,
        delay: DELAY,
        clock: CLOCK,
        capture: CAP,
        sensor: SensorType,
        decoder: &'a EdgeDecoder,
        legacy_callback: Option<fn()>,
    ) -> Self {
        Self {
            pin,
            delay,
            clock,
            capture,
            sensor,
            decoder,
            legacy_callback,
            start_us: 0,
            timeout_us: DEFAULT_ACQUIRE_TIMEOUT_US,
            reading: None,
        }
    }

    /// Starts a non-blocking acquisition with the default timeout.
    ///
    /// Issues the start pulse, releases the bus, arms edge capture and
    /// returns immediately; the interrupt-fed decoder does the rest.
    /// Returns [`DhtError::Acquiring`] if a cycle is already in flight --
    /// the in-flight cycle is left untouched.
    pub fn acquire(&mut self) -> Result<(), DhtError<E>> {
        self.acquire_with_timeout(0)
    }

    /// Starts a non-blocking acquisition.
    ///
    /// `timeout_us` bounds the whole cycle; 0 selects
    /// [`DEFAULT_ACQUIRE_TIMEOUT_US`]. The timeout is enforced
    /// cooperatively, on every status-affecting query.
    pub fn acquire_with_timeout(&mut self, timeout_us: u32) -> Result<(), DhtError<E>> {
        self.service_flags();
        if self.decoder.in_flight() {
            return Err(DhtError::Acquiring);
        }

        self.reading = None;

        // Request a reading: hold the bus low, then release it and let the
        // sensor answer.
        self.pin.set_low()?;
        self.delay.delay_us(self.sensor.start_hold_us());
        self.pin.set_high()?;

        self.timeout_us = if timeout_us == 0 {
            DEFAULT_ACQUIRE_TIMEOUT_US
        } else {
            timeout_us
        };
        self.start_us = self.clock.now_us();
        self.decoder.begin(self.start_us);
        self.capture.arm();
        Ok(())
    }

    /// Starts an acquisition and blocks until it reaches a terminal state.
    ///
    /// Waits cooperatively (polling with a short delay, not a hard spin)
    /// so the platform can service other work. `timeout_us` of 0 selects
    /// the default. Returns the terminal outcome as a `Result`; the raw
    /// status stays available through [`status`](Self::status).
    pub fn acquire_and_wait(&mut self, timeout_us: u32) -> Result<(), DhtError<E>> {
        self.acquire_with_timeout(timeout_us)?;
        while self.acquiring() {
            self.delay.delay_us(POLL_INTERVAL_US);
        }
        match self.decoder.status() {
            Status::Ok => Ok(()),
            other => Err(DhtError::from_status(other).unwrap_or(DhtError::NotStarted)),
        }
    }

    /// True while an acquisition is in flight.
    pub fn acquiring(&mut self) -> bool {
        self.service_flags();
        self.decoder.in_flight()
    }

    /// The status of the most recent (or in-flight) acquisition.
    pub fn status(&mut self) -> Status {
        self.service_flags();
        self.decoder.status()
    }

    /// Acquires a fresh reading and returns the temperature in Celsius.
    pub fn read_temperature(&mut self) -> Result<f32, DhtError<E>> {
        self.acquire_and_wait(0)?;
        self.celsius()
    }

    /// Acquires a fresh reading and returns the relative humidity.
    pub fn read_humidity(&mut self) -> Result<f32, DhtError<E>> {
        self.acquire_and_wait(0)?;
        self.humidity()
    }

    /// Temperature of the last completed acquisition, in Celsius.
    pub fn celsius(&mut self) -> Result<f32, DhtError<E>> {
        Ok(self.converted()?.temperature)
    }

    /// Temperature of the last completed acquisition, in Fahrenheit.
    pub fn fahrenheit(&mut self) -> Result<f32, DhtError<E>> {
        Ok(self.celsius()? * 9.0 / 5.0 + 32.0)
    }

    /// Temperature of the last completed acquisition, in Kelvin.
    pub fn kelvin(&mut self) -> Result<f32, DhtError<E>> {
        Ok(self.celsius()? + 273.15)
    }

    /// Relative humidity of the last completed acquisition, in percent.
    pub fn humidity(&mut self) -> Result<f32, DhtError<E>> {
        Ok(self.converted()?.relative_humidity)
    }

    /// Dew point from the last completed acquisition, fast approximation.
    pub fn dew_point(&mut self) -> Result<f32, DhtError<E>> {
        let reading = self.converted()?;
        Ok(dewpoint::dew_point(
            reading.temperature,
            reading.relative_humidity,
        ))
    }

    /// Dew point from the last completed acquisition, high precision.
    pub fn dew_point_slow(&mut self) -> Result<f32, DhtError<E>> {
        let reading = self.converted()?;
        Ok(dewpoint::dew_point_slow(
            reading.temperature,
            reading.relative_humidity,
        ))
    }

    /// Copies the decoder's diagnostic edge-interval log into `out`.
    pub fn edge_log(&self, out: &mut [u8]) -> usize {
        self.decoder.edge_log(out)
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor
    }

    /// The compatibility callback supplied at construction, if any.
    ///
    /// The engine never invokes it.
    pub fn legacy_callback(&self) -> Option<fn()> {
        self.legacy_callback
    }

    /// Gatekeeper shared by all value queries.
    ///
    /// Stopped reports the stored terminal status unchanged; anything
    /// short of a validated frame reports `Acquiring`. On the first query
    /// after a successful acquisition the raw frame is converted once and
    /// cached.
    fn converted(&mut self) -> Result<Reading, DhtError<E>> {
        self.service_flags();
        match self.decoder.state() {
            State::Stopped => {
                let status = self.decoder.status();
                Err(DhtError::from_status(status).unwrap_or(DhtError::NotStarted))
            }
            State::Acquired => {
                if self.decoder.take_convert() {
                    self.reading = Some(self.sensor.decode(&self.decoder.frame()));
                }
                self.reading.ok_or(DhtError::Acquiring)
            }
            State::Acquiring | State::Response | State::Data => Err(DhtError::Acquiring),
        }
    }

    /// Cooperative housekeeping run at the top of every status-affecting
    /// query: enforce the overall acquisition timeout, and honor a pending
    /// detach request from the decoder.
    fn service_flags(&mut self) {
        if self.decoder.in_flight() {
            let elapsed = self.clock.now_us().wrapping_sub(self.start_us);
            if elapsed > self.timeout_us {
                self.decoder.force_timeout();
            }
        }
        if self.decoder.take_detach_request() {
            self.capture.disarm();
        }
    }
}
