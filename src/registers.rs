//! DS3231 register map, bit positions and typed register views.
//!
//! Register addresses and bit numbers follow the datasheet. The bitfield
//! views give names to the fields of the registers whose bits carry
//! configuration or flags; plain BCD registers are handled by [`crate::bcd`].

use bitfield::bitfield;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds (BCD 00-59)
    Seconds = 0x00,
    /// Minutes (BCD 00-59)
    Minutes = 0x01,
    /// Hours with 12/24-hour and AM/PM bits
    Hours = 0x02,
    /// Day of week (1-7)
    Day = 0x03,
    /// Date of month (BCD 01-31)
    Date = 0x04,
    /// Month (BCD 01-12) with the century bit on top
    Month = 0x05,
    /// Year offset (BCD 00-99)
    Year = 0x06,
    /// First alarm 1 register (seconds)
    Alarm1Seconds = 0x07,
    Alarm1Minutes = 0x08,
    Alarm1Hours = 0x09,
    Alarm1DayDate = 0x0A,
    /// First alarm 2 register (minutes); alarm 2 has no seconds register
    Alarm2Minutes = 0x0B,
    Alarm2Hours = 0x0C,
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/status register
    ControlStatus = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature, signed integer part
    MSBTemp = 0x11,
    /// Temperature, quarter degrees in bits 7:6
    LSBTemp = 0x12,
}

/// 12/24-hour select in the hours register.
pub const HOURS_12_HOUR_BIT: u8 = 6;
/// AM/PM flag in 12-hour mode, 20-hour digit in 24-hour mode.
pub const HOURS_PM_BIT: u8 = 5;
/// Century flag in the month register.
pub const MONTH_CENTURY_BIT: u8 = 7;
/// Match-mask bit (AxMy) at the top of every alarm register.
pub const ALARM_MASK_BIT: u8 = 7;
/// DY/DT select in the alarm day/date register.
pub const ALARM_DAY_SELECT_BIT: u8 = 6;

/// Oscillator enable, active low (EOSC).
pub const CONTROL_EOSC_BIT: u8 = 7;
/// Square wave output while on battery (BBSQW).
pub const CONTROL_BBSQW_BIT: u8 = 6;
/// Square wave rate select, high bit (RS2).
pub const CONTROL_RS2_BIT: u8 = 4;
/// Square wave rate select, low bit (RS1).
pub const CONTROL_RS1_BIT: u8 = 3;
/// Interrupt control (INTCN).
pub const CONTROL_INTCN_BIT: u8 = 2;
/// Alarm 2 interrupt enable (A2IE).
pub const CONTROL_A2IE_BIT: u8 = 1;
/// Alarm 1 interrupt enable (A1IE).
pub const CONTROL_A1IE_BIT: u8 = 0;

/// Oscillator stop flag (OSF).
pub const STATUS_OSF_BIT: u8 = 7;
/// 32.768 kHz output enable (EN32kHz).
pub const STATUS_EN32KHZ_BIT: u8 = 3;
/// Alarm 2 trigger flag (A2F).
pub const STATUS_A2F_BIT: u8 = 1;
/// Alarm 1 trigger flag (A1F).
pub const STATUS_A1F_BIT: u8 = 0;

/// Hour format held in bit 6 of the hours register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// Hours 0-23
    #[default]
    TwentyFourHour = 0,
    /// Hours 1-12 plus an AM/PM flag
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => TimeRepresentation::TwentyFourHour,
            _ => TimeRepresentation::TwelveHour,
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Oscillator state while running on the backup battery (EOSC, active low).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator keeps running on battery
    #[default]
    Enabled = 0,
    /// Oscillator stops on battery; all registers freeze
    Disabled = 1,
}
impl From<u8> for Oscillator {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => Oscillator::Enabled,
            _ => Oscillator::Disabled,
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// Function of the shared INT/SQW pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Pin outputs a continuous square wave; alarms cannot assert it
    SquareWave = 0,
    /// Pin is driven low by enabled alarm flags
    #[default]
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => InterruptControl::SquareWave,
            _ => InterruptControl::Interrupt,
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave rate, the RS2:RS1 field of the control register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz
    #[default]
    Hz1 = 0b00,
    /// 1.024 kHz
    Hz1024 = 0b01,
    /// 4.096 kHz
    Hz4096 = 0b10,
    /// 8.192 kHz
    Hz8192 = 0b11,
}
impl SquareWaveFrequency {
    /// Output frequency in hertz.
    pub const fn hz(self) -> u32 {
        match self {
            SquareWaveFrequency::Hz1 => 1,
            SquareWaveFrequency::Hz1024 => 1024,
            SquareWaveFrequency::Hz4096 => 4096,
            SquareWaveFrequency::Hz8192 => 8192,
        }
    }
}
impl From<u8> for SquareWaveFrequency {
    /// Mode numbers 0-3; higher bits are ignored.
    fn from(v: u8) -> Self {
        match v & 0b11 {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            _ => SquareWaveFrequency::Hz8192,
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

/// DY/DT select of an alarm day/date register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Low bits hold a date of the month
    Date = 0,
    /// Low bits hold a day of the week
    Day = 1,
}
impl From<u8> for DayDateSelect {
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => DayDateSelect::Date,
            _ => DayDateSelect::Day,
        }
    }
}
impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Hours register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Hours(u8);
    impl Debug;
    /// 12/24-hour select
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag (12-hour) or 20-hour digit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5;
    /// BCD hour digits in 12-hour mode
    pub twelve_hour_digits, set_twelve_hour_digits: 4, 0;
    /// BCD hour digits in 24-hour mode
    pub twenty_four_hour_digits, set_twenty_four_hour_digits: 5, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Month register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Month(u8);
    impl Debug;
    /// Set for years 2100-2199
    pub century, set_century: 7;
    /// BCD month digits
    pub month_digits, set_month_digits: 4, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Day/date register of either alarm.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// AxM4: set to ignore the day/date when matching
    pub day_date_masked, set_day_date_masked: 7;
    /// DY/DT select
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// Day of week (DY/DT = 1) or BCD date (DY/DT = 0)
    pub day_or_date, set_day_or_date: 5, 0;
}
from_register_u8!(AlarmDayDate);

bitfield! {
    /// Control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Control(u8);
    impl Debug;
    /// EOSC
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// BBSQW
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// CONV
    pub convert_temperature, set_convert_temperature: 5;
    /// RS2:RS1
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INTCN
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// A2IE
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// A1IE
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

bitfield! {
    /// Control/status register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Status(u8);
    impl Debug;
    /// OSF: the oscillator stopped at some point since the flag was cleared
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// EN32kHz
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// BSY: temperature conversion in progress
    pub busy, set_busy: 2;
    /// A2F
    pub alarm2_flag, set_alarm2_flag: 1;
    /// A1F
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

bitfield! {
    /// Aging offset register, a signed trim of the oscillator capacitance.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AgingOffset(u8);
    impl Debug;
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

bitfield! {
    /// Temperature fraction register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct TemperatureFraction(u8);
    impl Debug;
    /// Quarter degrees (0-3)
    pub quarters, set_quarters: 7, 6;
}
from_register_u8!(TemperatureFraction);
