//! # DS3231 Real-Time Clock and Alarm Driver
//!
//! A `no_std` driver for the DS3231 RTC together with the AT24C32 EEPROM
//! found on common DS3231 breakout boards. Built on
//! [`embedded-hal`](https://github.com/rust-embedded/embedded-hal) 1.0.
//!
//! ## Features
//!
//! - Reading and setting time, date and individual fields
//! - 12/24-hour mode switching that preserves the wall-clock hour
//! - Daily and weekly alarms on both alarm slots
//! - Alarm persistence in the board EEPROM and restore on [`DS3231::begin`]
//! - Temperature in Celsius, Fahrenheit and Kelvin
//! - Square wave, 32 kHz output and oscillator control
//! - Interrupt-safe alarm notification via [`AlarmSignal`]
//! - Optional `log` or `defmt` logging
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ds3231_alarm::{AlarmSlot, DS3231, TimeField};
//! use chrono::Weekday;
//!
//! let mut rtc = DS3231::new(i2c, delay);
//! rtc.begin()?;
//! rtc.set_time(7, 30, 0)?;
//! rtc.set_alarm_weekly(AlarmSlot::Alarm1, 7, 45, Weekday::Mon)?;
//! rtc.toggle_alarm(AlarmSlot::Alarm1, true)?;
//! let now = rtc.read_time()?;
//! ```
//!
//! ## Error handling
//!
//! Every bus failure is reported as [`DS3231Error::I2c`] by default. With
//! [`ErrorPolicy::Silent`] the driver logs the failure, leaves its cached
//! state as it was and returns the cached value instead.
#![no_std]

#[macro_use]
mod fmt;

mod alarm;
pub mod bcd;
pub mod bits;
mod datetime;
pub mod registers;
mod signal;
mod square_wave;
mod temperature;
mod transport;

#[cfg(test)]
mod testing;

pub use alarm::{
    Alarm, AlarmRecurrence, AlarmSlot, AlarmState, TriggeredAlarms, MAX_IGNORED_ALARMS,
    SNOOZE_MINUTES,
};
pub use datetime::{ClockTime, DateField, TimeField};
pub use registers::{
    AgingOffset, Control, InterruptControl, Oscillator, SquareWaveFrequency, Status,
    TimeRepresentation,
};
pub use signal::AlarmSignal;
pub use temperature::Temperature;
pub use transport::{EEPROM_PAGE_SIZE, EEPROM_WRITE_CYCLE_MS};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use registers::{RegAddr, CONTROL_INTCN_BIT};

/// Default I2C address of the DS3231.
pub const DEFAULT_RTC_ADDRESS: u8 = 0x68;
/// Default I2C address of the AT24C32 EEPROM on DS3231 boards.
pub const DEFAULT_EEPROM_ADDRESS: u8 = 0x57;

/// Errors reported by the driver.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// The bus transaction failed
    I2c(I2CE),
    /// A register transfer longer than the time block (7 bytes) was requested
    TransferTooLong,
    /// The clock holds a value that is not a calendar date-time
    InvalidDateTime,
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

#[cfg(feature = "defmt")]
impl<I2CE: defmt::Format> defmt::Format for DS3231Error<I2CE> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DS3231Error::I2c(e) => defmt::write!(f, "I2c({})", e),
            DS3231Error::TransferTooLong => defmt::write!(f, "TransferTooLong"),
            DS3231Error::InvalidDateTime => defmt::write!(f, "InvalidDateTime"),
        }
    }
}

/// What to do when a bus transaction fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorPolicy {
    /// Return the failure to the caller
    #[default]
    Propagate,
    /// Log the failure and return the cached state
    Silent,
}

/// Driver settings that are not stored on the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub rtc_address: u8,
    pub eeprom_address: u8,
    pub error_policy: ErrorPolicy,
    /// Write an alarm to the EEPROM whenever it is toggled
    pub persist_on_change: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rtc_address: DEFAULT_RTC_ADDRESS,
            eeprom_address: DEFAULT_EEPROM_ADDRESS,
            error_policy: ErrorPolicy::Propagate,
            persist_on_change: true,
        }
    }
}

/// Device configuration applied by [`DS3231::configure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub time_representation: TimeRepresentation,
    pub square_wave_frequency: SquareWaveFrequency,
    pub interrupt_control: InterruptControl,
    pub battery_backed_square_wave: bool,
    pub oscillator_enable: Oscillator,
}

// Raw single-register accessors. These bypass the driver caches and always
// report bus errors.
macro_rules! set_and_get_register {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::paste! {
                #[doc = "Writes the raw `" $name "` register."]
                pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                    self.write_register($regaddr, value.into())
                }

                #[doc = "Reads the raw `" $name "` register."]
                pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                    Ok(<$typ>::from(self.read_register($regaddr)?))
                }
            }
        )+
    }
}

/// DS3231 driver.
///
/// Owns the I2C bus and a delay provider (used for EEPROM write cycles), and
/// caches the last known time and both alarms.
pub struct DS3231<I2C, D> {
    i2c: I2C,
    delay: D,
    settings: Settings,
    time: ClockTime,
    alarms: [Alarm; 2],
    ignored: [u8; 2],
    last_temperature: Temperature,
}

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D> {
    /// Creates a driver at the default addresses. No bus traffic happens
    /// until a method is called.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_settings(i2c, delay, Settings::default())
    }

    pub fn with_settings(i2c: I2C, delay: D, settings: Settings) -> Self {
        Self {
            i2c,
            delay,
            settings,
            time: ClockTime::default(),
            alarms: [Alarm::default(); 2],
            ignored: [0; 2],
            last_temperature: Temperature::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_error_policy(&mut self, policy: ErrorPolicy) {
        self.settings.error_policy = policy;
    }

    /// Gives back the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Applies `config` to the control register and switches the hour mode.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let mut control = Control::from(dev.read_register(RegAddr::Control)?);
                control.set_oscillator_enable(config.oscillator_enable);
                control.set_battery_backed_square_wave(config.battery_backed_square_wave);
                control.set_square_wave_frequency(config.square_wave_frequency);
                control.set_interrupt_control(config.interrupt_control);
                debug!("DS3231: control {}", u8::from(control));
                dev.write_register(RegAddr::Control, control.into())?;
                dev.enter_hour_mode(config.time_representation)
            },
            |_| (),
        )
    }

    /// Brings the device into a known state after power-up.
    ///
    /// Selects interrupt mode, clears both alarm flags, then reloads each
    /// alarm from the EEPROM, writes it to the device and applies its stored
    /// enable state. Nothing is written back to the EEPROM.
    pub fn begin(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(Self::start, |_| ())
    }

    fn start(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c| bits::set(c, CONTROL_INTCN_BIT))?;
        self.clear_trigger_flags()?;

        let mut restored = [Alarm::default(); 2];
        for slot in AlarmSlot::ALL {
            let alarm = self.load_alarm(slot)?;
            self.write_alarm(slot, alarm.hour, alarm.minutes, alarm.recurrence)?;
            restored[slot.index()] = alarm;
        }
        for slot in AlarmSlot::ALL {
            self.apply_alarm_enable(slot, restored[slot.index()].enabled, false)?;
        }
        info!("DS3231: started");
        Ok(())
    }

    set_and_get_register! {
        (control, RegAddr::Control, Control),
        (status, RegAddr::ControlStatus, Status),
        (aging_offset, RegAddr::AgingOffset, AgingOffset)
    }

    /// Runs `op`; under [`ErrorPolicy::Silent`] a bus failure is logged and
    /// replaced by `fallback`, computed from the untouched driver state.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, DS3231Error<I2C::Error>>,
        fallback: impl FnOnce(&Self) -> T,
    ) -> Result<T, DS3231Error<I2C::Error>> {
        match op(self) {
            Err(DS3231Error::I2c(_)) if self.settings.error_policy == ErrorPolicy::Silent => {
                warn!("DS3231: bus transaction failed, keeping previous state");
                Ok(fallback(self))
            }
            result => result,
        }
    }
}
