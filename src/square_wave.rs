//! INT/SQW pin, 32 kHz output and oscillator control.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::registers::{
    RegAddr, SquareWaveFrequency, Status, CONTROL_BBSQW_BIT, CONTROL_EOSC_BIT, CONTROL_INTCN_BIT,
    CONTROL_RS1_BIT, CONTROL_RS2_BIT, STATUS_EN32KHZ_BIT, STATUS_OSF_BIT,
};
use crate::{bits, DS3231Error, DS3231};

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D> {
    /// Selects what drives the shared INT/SQW pin: alarm interrupts when
    /// `enabled`, the square wave otherwise.
    pub fn set_interrupt_mode(&mut self, enabled: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_control_bit(CONTROL_INTCN_BIT, enabled)
    }

    /// Sets the square wave rate without changing whether it is output.
    pub fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let rate = u8::from(frequency);
        self.guarded(
            |dev| {
                dev.update_register(RegAddr::Control, |control| {
                    let control = bits::assign(control, CONTROL_RS2_BIT, bits::is_set(rate, 1));
                    bits::assign(control, CONTROL_RS1_BIT, bits::is_set(rate, 0))
                })?;
                debug!("DS3231: square wave {} Hz", frequency.hz());
                Ok(())
            },
            |_| (),
        )
    }

    /// Square wave on the INT/SQW pin while running from the backup battery.
    pub fn set_battery_backed_square_wave(
        &mut self,
        enabled: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_control_bit(CONTROL_BBSQW_BIT, enabled)
    }

    /// Enables the separate 32.768 kHz output pin.
    pub fn set_32khz_output(&mut self, enabled: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                dev.update_register(RegAddr::ControlStatus, |status| {
                    bits::assign(status, STATUS_EN32KHZ_BIT, enabled)
                })?;
                Ok(())
            },
            |_| (),
        )
    }

    /// Lets the oscillator run on battery power. When disabled the clock
    /// stops, and all registers freeze, as soon as main power is lost.
    pub fn set_oscillator(&mut self, enabled: bool) -> Result<(), DS3231Error<I2C::Error>> {
        // EOSC is active low
        self.update_control_bit(CONTROL_EOSC_BIT, !enabled)
    }

    /// Whether the oscillator has stopped since the flag was last cleared,
    /// meaning the time may be invalid.
    pub fn oscillator_stopped(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| Ok(Status::from(dev.read_register(RegAddr::ControlStatus)?).oscillator_stop_flag()),
            |_| false,
        )
    }

    pub fn clear_oscillator_stop_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                dev.update_register(RegAddr::ControlStatus, |status| {
                    bits::clear(status, STATUS_OSF_BIT)
                })?;
                Ok(())
            },
            |_| (),
        )
    }

    fn update_control_bit(&mut self, bit: u8, value: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                dev.update_register(RegAddr::Control, |control| {
                    bits::assign(control, bit, value)
                })?;
                Ok(())
            },
            |_| (),
        )
    }
}
