//! Time and date model for the DS3231 time-keeping registers.
//!
//! The clock keeps seconds, minutes, hours, weekday, date, month and a
//! two-digit year in seven consecutive BCD registers. The hours register
//! selects between 12-hour and 24-hour operation and the top bit of the
//! month register extends the year to the range 2000-2199.
//!
//! Values handed to the setters are reduced into range instead of being
//! rejected: hours modulo 24, minutes and seconds modulo 60, dates clamped to
//! 1-31 and years taken modulo 200 from 2000.

use chrono::{Datelike, Month, NaiveDate, NaiveDateTime, Timelike, Weekday};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::registers::{
    Hours, Month as MonthRegister, RegAddr, TimeRepresentation, HOURS_12_HOUR_BIT, HOURS_PM_BIT,
    MONTH_CENTURY_BIT,
};
use crate::{bcd, bits, DS3231Error, DS3231};

/// Snapshot of the clock as last read from or written to the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub seconds: u8,
    pub minutes: u8,
    /// Hour as the device holds it: 0-23, or 1-12 in 12-hour mode
    pub hour: u8,
    /// PM flag, only meaningful in 12-hour mode
    pub is_pm: bool,
    pub representation: TimeRepresentation,
    pub weekday: Weekday,
    pub date: u8,
    pub month: Month,
    pub year: u16,
}

impl Default for ClockTime {
    /// Friday 2021-01-01 00:00:00, 24-hour mode.
    fn default() -> Self {
        Self {
            seconds: 0,
            minutes: 0,
            hour: 0,
            is_pm: false,
            representation: TimeRepresentation::TwentyFourHour,
            weekday: Weekday::Fri,
            date: 1,
            month: Month::January,
            year: 2021,
        }
    }
}

impl ClockTime {
    /// Hour on the 24-hour clock regardless of the device mode.
    pub fn hour24(&self) -> u8 {
        match self.representation {
            TimeRepresentation::TwentyFourHour => self.hour,
            TimeRepresentation::TwelveHour => to_twenty_four_hour(self.hour, self.is_pm),
        }
    }

    /// Converts to a chrono date-time, or `None` if the fields do not form a
    /// calendar date (for example 31 February).
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            self.month.number_from_month(),
            u32::from(self.date),
        )?
        .and_hms_opt(
            u32::from(self.hour24()),
            u32::from(self.minutes),
            u32::from(self.seconds),
        )
    }

    fn set_hour24(&mut self, hour: u8, representation: TimeRepresentation) {
        self.representation = representation;
        match representation {
            TimeRepresentation::TwentyFourHour => {
                self.hour = hour;
                self.is_pm = false;
            }
            TimeRepresentation::TwelveHour => {
                (self.hour, self.is_pm) = to_twelve_hour(hour);
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockTime {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{=u16}-{=u8}-{=u8} {=u8}:{=u8}:{=u8}",
            self.year,
            month_to_register(self.month),
            self.date,
            self.hour24(),
            self.minutes,
            self.seconds
        );
    }
}

/// A time register together with its new value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeField {
    /// Hour on the 24-hour clock
    Hour(u8),
    Minute(u8),
    Second(u8),
}

/// A date register together with its new value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DateField {
    Day(Weekday),
    Date(u8),
    Month(Month),
    /// Full year, 2000-2199
    Year(u16),
}

#[cfg(feature = "defmt")]
impl defmt::Format for DateField {
    fn format(&self, f: defmt::Formatter) {
        match *self {
            DateField::Day(day) => defmt::write!(f, "Day({=u8})", weekday_to_register(day)),
            DateField::Date(date) => defmt::write!(f, "Date({=u8})", date),
            DateField::Month(month) => defmt::write!(f, "Month({=u8})", month_to_register(month)),
            DateField::Year(year) => defmt::write!(f, "Year({=u16})", year),
        }
    }
}

/// 24-hour value to the 12-hour value and PM flag the hours register holds.
///
/// Midnight is stored as 12 with the PM flag set and noon as 12 with it
/// clear; [`to_twenty_four_hour`] inverts this exactly.
pub(crate) const fn to_twelve_hour(hour: u8) -> (u8, bool) {
    match hour {
        0 => (12, true),
        12 => (12, false),
        h if h > 12 => (h - 12, true),
        h => (h, false),
    }
}

pub(crate) const fn to_twenty_four_hour(hour: u8, is_pm: bool) -> u8 {
    match (hour, is_pm) {
        (12, true) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// Hours register byte for a 24-hour value in the given mode.
pub(crate) const fn encode_hours(hour: u8, representation: TimeRepresentation) -> u8 {
    match representation {
        TimeRepresentation::TwentyFourHour => bcd::encode(hour),
        TimeRepresentation::TwelveHour => {
            let (hour, is_pm) = to_twelve_hour(hour);
            let byte = bits::set(bcd::encode(hour), HOURS_12_HOUR_BIT);
            bits::assign(byte, HOURS_PM_BIT, is_pm)
        }
    }
}

/// Splits an hours register byte into hour, PM flag and mode.
pub(crate) fn decode_hours(byte: u8) -> (u8, bool, TimeRepresentation) {
    let hours = Hours::from(byte);
    match hours.time_representation() {
        TimeRepresentation::TwelveHour => (
            bcd::decode(hours.twelve_hour_digits()),
            hours.pm_or_twenty_hours(),
            TimeRepresentation::TwelveHour,
        ),
        TimeRepresentation::TwentyFourHour => (
            bcd::decode(hours.twenty_four_hour_digits()),
            false,
            TimeRepresentation::TwentyFourHour,
        ),
    }
}

/// Offset from 2000, reduced into the 200 years the clock can hold.
pub(crate) fn year_offset(year: u16) -> u8 {
    (i32::from(year) - 2000).rem_euclid(200) as u8
}

/// Year register byte and century bit for `year`.
pub(crate) fn encode_year(year: u16) -> (u8, bool) {
    let offset = year_offset(year);
    (bcd::encode(offset % 100), offset >= 100)
}

pub(crate) fn decode_year(year_byte: u8, century: bool) -> u16 {
    2000 + if century { 100 } else { 0 } + u16::from(bcd::decode(year_byte))
}

pub(crate) fn weekday_from_register(value: u8) -> Option<Weekday> {
    match value {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Monday is 1, Sunday is 7.
pub(crate) fn weekday_to_register(day: Weekday) -> u8 {
    day.number_from_monday() as u8
}

pub(crate) fn month_from_register(value: u8) -> Option<Month> {
    Month::try_from(value).ok()
}

pub(crate) fn month_to_register(month: Month) -> u8 {
    month.number_from_month() as u8
}

fn clamp_date(date: u8) -> u8 {
    date.clamp(1, 31)
}

fn month_byte(month: Month, century: bool) -> u8 {
    bits::assign(bcd::encode(month_to_register(month)), MONTH_CENTURY_BIT, century)
}

/// Decodes the seven time registers. Weekday and month bytes that name no
/// weekday or month keep the value from `previous`.
fn decode_time(raw: &[u8; 7], previous: &ClockTime) -> ClockTime {
    let (hour, is_pm, representation) = decode_hours(raw[2]);
    let month = MonthRegister::from(raw[5]);
    let weekday = weekday_from_register(raw[3] & 0x07).unwrap_or_else(|| {
        warn!("DS3231: invalid weekday register {}", raw[3]);
        previous.weekday
    });
    let month_number = bcd::decode(month.month_digits());
    let month_value = month_from_register(month_number).unwrap_or_else(|| {
        warn!("DS3231: invalid month register {}", raw[5]);
        previous.month
    });
    ClockTime {
        seconds: bcd::decode(bits::clear(raw[0], 7)),
        minutes: bcd::decode(bits::clear(raw[1], 7)),
        hour,
        is_pm,
        representation,
        weekday,
        date: bcd::decode(raw[4] & 0x3F),
        month: month_value,
        year: decode_year(raw[6], month.century()),
    }
}

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D> {
    /// Reads the 12/24-hour mode bit from the device.
    pub fn is_in_12_hour_mode(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| Ok(dev.hour_mode()? == TimeRepresentation::TwelveHour),
            |dev| dev.time.representation == TimeRepresentation::TwelveHour,
        )
    }

    /// Switches to 12-hour mode keeping the wall-clock hour. Does nothing if
    /// the device already is in 12-hour mode.
    pub fn switch_to_12_hour_mode(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| dev.enter_hour_mode(TimeRepresentation::TwelveHour),
            |_| (),
        )
    }

    /// Switches to 24-hour mode keeping the wall-clock hour. Does nothing if
    /// the device already is in 24-hour mode.
    pub fn switch_to_24_hour_mode(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| dev.enter_hour_mode(TimeRepresentation::TwentyFourHour),
            |_| (),
        )
    }

    /// Writes a single time register.
    ///
    /// Hours are given on the 24-hour clock; in 12-hour mode the PM flag is
    /// derived from the new hour.
    pub fn set_time_field(&mut self, field: TimeField) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(|dev| dev.write_time_field(field), |_| ())
    }

    /// Writes hours, minutes and seconds in one transaction, keeping the
    /// device's hour mode.
    pub fn set_time(
        &mut self,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let (hour, minute, second) = (hour % 24, minute % 60, second % 60);
                let representation = dev.hour_mode()?;
                dev.write_registers(
                    RegAddr::Seconds,
                    &[
                        bcd::encode(second),
                        bcd::encode(minute),
                        encode_hours(hour, representation),
                    ],
                )?;
                dev.time.seconds = second;
                dev.time.minutes = minute;
                dev.time.set_hour24(hour, representation);
                Ok(())
            },
            |_| (),
        )
    }

    /// Writes a single date register.
    pub fn set_date_field(&mut self, field: DateField) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(|dev| dev.write_date_field(field), |_| ())
    }

    /// Writes weekday, date, month and year in one transaction.
    pub fn set_date(
        &mut self,
        weekday: Weekday,
        month: Month,
        date: u8,
        year: u16,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let date = clamp_date(date);
                let (year_byte, century) = encode_year(year);
                dev.write_registers(
                    RegAddr::Day,
                    &[
                        weekday_to_register(weekday),
                        bcd::encode(date),
                        month_byte(month, century),
                        year_byte,
                    ],
                )?;
                dev.time.weekday = weekday;
                dev.time.date = date;
                dev.time.month = month;
                dev.time.year = decode_year(year_byte, century);
                Ok(())
            },
            |_| (),
        )
    }

    /// Reads all seven time registers in one transaction and refreshes the
    /// cached time.
    pub fn read_time(&mut self) -> Result<ClockTime, DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let mut raw = [0u8; 7];
                dev.read_registers(RegAddr::Seconds, &mut raw)?;
                dev.time = decode_time(&raw, &dev.time);
                Ok(dev.time)
            },
            |dev| dev.time,
        )
    }

    /// The time as last read or written, without bus traffic.
    pub fn cached_time(&self) -> ClockTime {
        self.time
    }

    /// Reads the clock as a chrono date-time.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        let time = self.read_time()?;
        time.to_naive_datetime().ok_or(DS3231Error::InvalidDateTime)
    }

    /// Writes all seven time registers from a chrono date-time, keeping the
    /// device's hour mode. Years outside 2000-2199 are rejected.
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let year = u16::try_from(datetime.year())
            .ok()
            .filter(|y| (2000..=2199).contains(y))
            .ok_or(DS3231Error::InvalidDateTime)?;
        self.guarded(
            |dev| {
                let representation = dev.hour_mode()?;
                let time = ClockTime {
                    seconds: datetime.second() as u8,
                    minutes: datetime.minute() as u8,
                    hour: 0,
                    is_pm: false,
                    representation,
                    weekday: datetime.weekday(),
                    date: datetime.day() as u8,
                    month: month_from_register(datetime.month() as u8).unwrap_or(dev.time.month),
                    year,
                };
                let hour = datetime.hour() as u8;
                let (year_byte, century) = encode_year(year);
                dev.write_registers(
                    RegAddr::Seconds,
                    &[
                        bcd::encode(time.seconds),
                        bcd::encode(time.minutes),
                        encode_hours(hour, representation),
                        weekday_to_register(time.weekday),
                        bcd::encode(time.date),
                        month_byte(time.month, century),
                        year_byte,
                    ],
                )?;
                dev.time = time;
                dev.time.set_hour24(hour, representation);
                debug!("DS3231: set datetime, year {}", year);
                Ok(())
            },
            |_| (),
        )
    }

    pub(crate) fn hour_mode(&mut self) -> Result<TimeRepresentation, DS3231Error<I2C::Error>> {
        Ok(Hours::from(self.read_register(RegAddr::Hours)?).time_representation())
    }

    pub(crate) fn enter_hour_mode(
        &mut self,
        target: TimeRepresentation,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let (hour, is_pm, current) = decode_hours(self.read_register(RegAddr::Hours)?);
        if current == target {
            return Ok(());
        }
        let hour = match current {
            TimeRepresentation::TwelveHour => to_twenty_four_hour(hour, is_pm),
            TimeRepresentation::TwentyFourHour => hour,
        };
        self.write_register(RegAddr::Hours, encode_hours(hour, target))?;
        self.time.set_hour24(hour, target);
        debug!("DS3231: hour mode switched, hour {}", hour);
        Ok(())
    }

    fn write_time_field(&mut self, field: TimeField) -> Result<(), DS3231Error<I2C::Error>> {
        match field {
            TimeField::Hour(hour) => {
                let hour = hour % 24;
                let representation = self.hour_mode()?;
                self.write_register(RegAddr::Hours, encode_hours(hour, representation))?;
                self.time.set_hour24(hour, representation);
            }
            TimeField::Minute(minute) => {
                let minute = minute % 60;
                self.write_register(RegAddr::Minutes, bcd::encode(minute))?;
                self.time.minutes = minute;
            }
            TimeField::Second(second) => {
                let second = second % 60;
                self.write_register(RegAddr::Seconds, bcd::encode(second))?;
                self.time.seconds = second;
            }
        }
        Ok(())
    }

    fn write_date_field(&mut self, field: DateField) -> Result<(), DS3231Error<I2C::Error>> {
        match field {
            DateField::Day(weekday) => {
                self.write_register(RegAddr::Day, weekday_to_register(weekday))?;
                self.time.weekday = weekday;
            }
            DateField::Date(date) => {
                let date = clamp_date(date);
                self.write_register(RegAddr::Date, bcd::encode(date))?;
                self.time.date = date;
            }
            DateField::Month(month) => {
                let century = MonthRegister::from(self.read_register(RegAddr::Month)?).century();
                self.write_register(RegAddr::Month, month_byte(month, century))?;
                self.time.month = month;
            }
            DateField::Year(year) => {
                let current = self.read_register(RegAddr::Month)?;
                let (year_byte, century) = encode_year(year);
                let month = bits::assign(current, MONTH_CENTURY_BIT, century);
                self.write_registers(RegAddr::Month, &[month, year_byte])?;
                self.time.year = decode_year(year_byte, century);
            }
        }
        Ok(())
    }
}
