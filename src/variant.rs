use crate::dht::Reading;

/// The supported DHT sensor variants.
///
/// `Dht21` also covers the AM2301, `Dht22` the AM2302; those parts share
/// the same framing and fixed-point encoding.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorType {
    Dht11,
    Dht21,
    Dht22,
}

impl SensorType {
    /// How long the signal line must be held low to request a reading.
    ///
    /// The DHT11 wants at least 18 ms; the DHT21/22 class wakes on a
    /// ~1 ms pulse before the bus is released.
    pub(crate) const fn start_hold_us(self) -> u32 {
        match self {
            Self::Dht11 => 18_000,
            Self::Dht21 | Self::Dht22 => 1_100,
        }
    }

    /// Converts a validated raw frame into calibrated readings.
    pub(crate) fn decode(self, frame: &[u8; 5]) -> Reading {
        match self {
            // DHT11 reports whole units in the high bytes.
            Self::Dht11 => Reading {
                temperature: f32::from(frame[2]),
                relative_humidity: f32::from(frame[0]),
            },
            // DHT21/22 report 16-bit values in tenths, with the sign of
            // the temperature in the top bit of the high byte.
            Self::Dht21 | Self::Dht22 => {
                let joined_humidity = u16::from_be_bytes([frame[0], frame[1]]);
                let relative_humidity = f32::from(joined_humidity) / 10.0;

                let is_temp_negative = (frame[2] >> 7) != 0;
                let temp_hi = frame[2] & 0b0111_1111;
                let joined_temp = u16::from_be_bytes([temp_hi, frame[3]]);
                let mut temperature = f32::from(joined_temp) / 10.0;
                if is_temp_negative {
                    temperature = -temperature;
                }

                Reading {
                    temperature,
                    relative_humidity,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dht22_positive_temperature() {
        // Humidity: 55.5% -> [0x02, 0x2B] => 555
        // Temperature: 24.6C -> [0x00, 0xF6] => 246
        let frame = [0x02, 0x2B, 0x00, 0xF6, 0x23];

        let reading = SensorType::Dht22.decode(&frame);

        assert_eq!(
            reading,
            Reading {
                temperature: 24.6,
                relative_humidity: 55.5,
            }
        );
    }

    #[test]
    fn dht22_negative_temperature() {
        // Humidity: 40.0% -> [0x01, 0x90] => 400
        // Temperature: -1.0C -> [0x80, 0x0A]
        // Bit 7 of temp_hi is 1 => negative
        // Clear sign bit: 0x80 & 0x7F = 0x00, so [0x00, 0x0A] = 10 => 1.0 then negated
        let frame = [0x01, 0x90, 0x80, 0x0A, 0x1B];

        let reading = SensorType::Dht22.decode(&frame);

        assert_eq!(
            reading,
            Reading {
                temperature: -1.0,
                relative_humidity: 40.0,
            }
        );
    }

    #[test]
    fn dht11_whole_unit_bytes() {
        // DHT11 carries integer values in bytes 0 and 2.
        let frame = [0x28, 0x00, 0x15, 0x00, 0x3D];

        let reading = SensorType::Dht11.decode(&frame);

        assert_eq!(
            reading,
            Reading {
                temperature: 21.0,
                relative_humidity: 40.0,
            }
        );
    }

    #[test]
    fn start_hold_per_variant() {
        assert_eq!(SensorType::Dht11.start_hold_us(), 18_000);
        assert_eq!(SensorType::Dht21.start_hold_us(), 1_100);
        assert_eq!(SensorType::Dht22.start_hold_us(), 1_100);
    }
}
