//! Die temperature readout.
//!
//! The DS3231 converts its die temperature every 64 seconds for oscillator
//! compensation. The integer part sits in a signed byte and the fraction in
//! the top two bits of the next register, in quarter degrees.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::registers::{RegAddr, TemperatureFraction};
use crate::{DS3231Error, DS3231};

/// A temperature reading as the device reports it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    integer: i8,
    quarters: u8,
}

impl Temperature {
    /// Builds a reading from the two temperature registers.
    pub fn from_registers(msb: u8, lsb: u8) -> Self {
        Self {
            integer: msb as i8,
            quarters: TemperatureFraction::from(lsb).quarters(),
        }
    }

    /// Whole degrees Celsius, signed.
    pub fn integer(&self) -> i8 {
        self.integer
    }

    /// Quarter degrees on top of the whole part (0-3).
    pub fn quarters(&self) -> u8 {
        self.quarters
    }

    /// Degrees Celsius. The fraction moves the value away from zero.
    pub fn celsius(&self) -> f32 {
        let whole = f32::from(self.integer);
        let fraction = f32::from(self.quarters) * 0.25;
        if self.integer >= 0 {
            whole + fraction
        } else {
            whole - fraction
        }
    }

    pub fn fahrenheit(&self) -> f32 {
        self.celsius() * 1.8 + 32.0
    }

    pub fn kelvin(&self) -> f32 {
        self.celsius() + 273.15
    }
}

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D> {
    /// Reads both temperature registers in one transaction.
    ///
    /// Under [`ErrorPolicy::Silent`](crate::ErrorPolicy::Silent) a failed read
    /// returns the last good reading, which may be stale.
    pub fn read_temperature(&mut self) -> Result<Temperature, DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let mut data = [0u8; 2];
                dev.read_registers(RegAddr::MSBTemp, &mut data)?;
                let temperature = Temperature::from_registers(data[0], data[1]);
                dev.last_temperature = temperature;
                Ok(temperature)
            },
            |dev| dev.last_temperature,
        )
    }

    pub fn read_celsius(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(self.read_temperature()?.celsius())
    }

    pub fn read_fahrenheit(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(self.read_temperature()?.fahrenheit())
    }

    pub fn read_kelvin(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(self.read_temperature()?.kelvin())
    }
}
