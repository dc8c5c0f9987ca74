//! Daily and weekly alarms on the two DS3231 alarm slots.
//!
//! Alarm 1 matches on seconds, minutes, hours and day; alarm 2 has no seconds
//! register and fires at second 00. Both are programmed here as either a
//! daily alarm (day/date ignored) or a weekly alarm (day-of-week match).
//! Alarm hours are always written in 24-hour form.
//!
//! Each slot is mirrored in the board EEPROM as five bytes
//! `[seconds, minutes, hour, day, enabled]`, alarm 1 at offset 0 and alarm 2
//! at offset 5, so alarms survive a power loss and are re-armed by
//! [`DS3231::begin`].

use chrono::Weekday;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::datetime::{weekday_from_register, weekday_to_register};
use crate::registers::{
    AlarmDayDate, Control, DayDateSelect, InterruptControl, RegAddr, Status, ALARM_MASK_BIT,
    CONTROL_A1IE_BIT, CONTROL_A2IE_BIT, CONTROL_INTCN_BIT, STATUS_A1F_BIT, STATUS_A2F_BIT,
};
use crate::signal::AlarmSignal;
use crate::{bcd, bits, DS3231Error, DS3231};

/// Default delay before an ignored alarm rings again.
pub const SNOOZE_MINUTES: u8 = 5;

/// Consecutive ignored rings after which a slot goes back to its stored alarm.
pub const MAX_IGNORED_ALARMS: u8 = 5;

/// One of the two hardware alarms.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmSlot {
    Alarm1,
    Alarm2,
}

impl AlarmSlot {
    pub const ALL: [AlarmSlot; 2] = [AlarmSlot::Alarm1, AlarmSlot::Alarm2];

    pub(crate) const fn index(self) -> usize {
        match self {
            AlarmSlot::Alarm1 => 0,
            AlarmSlot::Alarm2 => 1,
        }
    }

    const fn interrupt_enable_bit(self) -> u8 {
        match self {
            AlarmSlot::Alarm1 => CONTROL_A1IE_BIT,
            AlarmSlot::Alarm2 => CONTROL_A2IE_BIT,
        }
    }

    /// EEPROM offset of the slot's stored copy.
    pub const fn storage_address(self) -> u16 {
        match self {
            AlarmSlot::Alarm1 => 0,
            AlarmSlot::Alarm2 => Alarm::STORAGE_SIZE as u16,
        }
    }
}

/// How often an alarm fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AlarmRecurrence {
    /// Every day at the alarm time
    #[default]
    Daily,
    /// Once a week, on the given day
    Weekly(Weekday),
}

impl AlarmRecurrence {
    /// Short display label: `DAILY` or the three-letter day name.
    pub const fn label(self) -> &'static str {
        match self {
            AlarmRecurrence::Daily => "DAILY",
            AlarmRecurrence::Weekly(Weekday::Mon) => "MON",
            AlarmRecurrence::Weekly(Weekday::Tue) => "TUE",
            AlarmRecurrence::Weekly(Weekday::Wed) => "WED",
            AlarmRecurrence::Weekly(Weekday::Thu) => "THU",
            AlarmRecurrence::Weekly(Weekday::Fri) => "FRI",
            AlarmRecurrence::Weekly(Weekday::Sat) => "SAT",
            AlarmRecurrence::Weekly(Weekday::Sun) => "SUN",
        }
    }

    fn to_storage(self) -> u8 {
        match self {
            AlarmRecurrence::Daily => 0,
            AlarmRecurrence::Weekly(day) => weekday_to_register(day),
        }
    }

    fn from_storage(value: u8) -> Self {
        weekday_from_register(value).map_or(AlarmRecurrence::Daily, AlarmRecurrence::Weekly)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlarmRecurrence {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.label());
    }
}

/// Where an alarm is in its life cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    Disabled,
    EnabledDaily,
    EnabledWeekly,
}

/// Driver-side copy of one alarm slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    pub seconds: u8,
    pub minutes: u8,
    /// Hour on the 24-hour clock
    pub hour: u8,
    pub recurrence: AlarmRecurrence,
    pub enabled: bool,
}

impl Alarm {
    /// Bytes one alarm occupies in the EEPROM.
    pub const STORAGE_SIZE: usize = 5;

    pub fn state(&self) -> AlarmState {
        match (self.enabled, self.recurrence) {
            (false, _) => AlarmState::Disabled,
            (true, AlarmRecurrence::Daily) => AlarmState::EnabledDaily,
            (true, AlarmRecurrence::Weekly(_)) => AlarmState::EnabledWeekly,
        }
    }

    pub fn to_storage(&self) -> [u8; Self::STORAGE_SIZE] {
        [
            self.seconds,
            self.minutes,
            self.hour,
            self.recurrence.to_storage(),
            u8::from(self.enabled),
        ]
    }

    /// The same alarm moved `minutes` later. Minutes carry into hours,
    /// hours wrap at midnight and a weekly alarm moves to the next day
    /// (Sunday wraps to Monday).
    pub fn snoozed(&self, minutes: u8) -> Self {
        let total = u16::from(self.minutes) + u16::from(minutes);
        let hours = u16::from(self.hour) + total / 60;
        let mut recurrence = self.recurrence;
        if let AlarmRecurrence::Weekly(mut day) = recurrence {
            for _ in 0..hours / 24 {
                day = day.succ();
            }
            recurrence = AlarmRecurrence::Weekly(day);
        }
        Self {
            seconds: 0,
            minutes: (total % 60) as u8,
            hour: (hours % 24) as u8,
            recurrence,
            enabled: self.enabled,
        }
    }

    /// Decodes a stored alarm. Blank or corrupt EEPROM content (erased
    /// bytes read as 0xFF) is reduced into range: times modulo their period,
    /// unknown days as daily, any enabled byte other than 1 as disabled.
    pub fn from_storage(bytes: [u8; Self::STORAGE_SIZE]) -> Self {
        Self {
            seconds: bytes[0] % 60,
            minutes: bytes[1] % 60,
            hour: bytes[2] % 24,
            recurrence: AlarmRecurrence::from_storage(bytes[3]),
            enabled: bytes[4] == 1,
        }
    }
}

/// Which alarms have latched their trigger flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggeredAlarms {
    None,
    Alarm1,
    Alarm2,
    Both,
}

impl TriggeredAlarms {
    fn from_status(status: Status) -> Self {
        match (status.alarm1_flag(), status.alarm2_flag()) {
            (false, false) => TriggeredAlarms::None,
            (true, false) => TriggeredAlarms::Alarm1,
            (false, true) => TriggeredAlarms::Alarm2,
            (true, true) => TriggeredAlarms::Both,
        }
    }

    pub fn contains(self, slot: AlarmSlot) -> bool {
        matches!(
            (self, slot),
            (TriggeredAlarms::Both, _)
                | (TriggeredAlarms::Alarm1, AlarmSlot::Alarm1)
                | (TriggeredAlarms::Alarm2, AlarmSlot::Alarm2)
        )
    }
}

/// Alarm register bytes starting at the seconds register of alarm 1.
/// Alarm 2 uses the last three.
fn alarm_registers(hour: u8, minute: u8, recurrence: AlarmRecurrence) -> [u8; 4] {
    let mut day_date = AlarmDayDate::default();
    match recurrence {
        AlarmRecurrence::Daily => day_date.set_day_date_masked(true),
        AlarmRecurrence::Weekly(day) => {
            day_date.set_day_date_select(DayDateSelect::Day);
            day_date.set_day_or_date(weekday_to_register(day));
        }
    }
    [
        bits::clear(0, ALARM_MASK_BIT),
        bits::clear(bcd::encode(minute), ALARM_MASK_BIT),
        bits::clear(bcd::encode(hour), ALARM_MASK_BIT),
        day_date.into(),
    ]
}

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D> {
    /// Cached copy of an alarm slot.
    pub fn alarm(&self, slot: AlarmSlot) -> Alarm {
        self.alarms[slot.index()]
    }

    pub fn is_alarm_enabled(&self, slot: AlarmSlot) -> bool {
        self.alarms[slot.index()].enabled
    }

    /// Programs `slot` to fire every day at `hour:minute`.
    pub fn set_alarm_daily(
        &mut self,
        slot: AlarmSlot,
        hour: u8,
        minute: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_alarm(slot, hour, minute, AlarmRecurrence::Daily)
    }

    /// Programs `slot` to fire every week on `day` at `hour:minute`.
    pub fn set_alarm_weekly(
        &mut self,
        slot: AlarmSlot,
        hour: u8,
        minute: u8,
        day: Weekday,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_alarm(slot, hour, minute, AlarmRecurrence::Weekly(day))
    }

    /// Programs `slot` with the given recurrence. The enable state is left as
    /// it is and the EEPROM copy is not touched; see
    /// [`persist_alarm`](Self::persist_alarm).
    pub fn set_alarm(
        &mut self,
        slot: AlarmSlot,
        hour: u8,
        minute: u8,
        recurrence: AlarmRecurrence,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(|dev| dev.write_alarm(slot, hour, minute, recurrence), |_| ())
    }

    /// Enables or disables the interrupt of `slot`.
    ///
    /// Both trigger flags are cleared first so a stale flag cannot fire the
    /// moment the alarm is enabled. If the INT/SQW pin is in square wave mode
    /// it is switched to interrupt mode in the same control write.
    pub fn toggle_alarm(
        &mut self,
        slot: AlarmSlot,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let persist = self.settings.persist_on_change;
        self.guarded(|dev| dev.apply_alarm_enable(slot, enable, persist), |_| ())
    }

    /// Writes the registers of a stored alarm and applies its enable flag.
    pub fn arm_alarm(&mut self, slot: AlarmSlot, alarm: &Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        let persist = self.settings.persist_on_change;
        self.guarded(
            |dev| {
                dev.write_alarm(slot, alarm.hour, alarm.minutes, alarm.recurrence)?;
                dev.apply_alarm_enable(slot, alarm.enabled, persist)
            },
            |_| (),
        )
    }

    /// Reads the two trigger flags.
    pub fn triggered_alarms(&mut self) -> Result<TriggeredAlarms, DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let status = Status::from(dev.read_register(RegAddr::ControlStatus)?);
                Ok(TriggeredAlarms::from_status(status))
            },
            |_| TriggeredAlarms::None,
        )
    }

    /// Clears both trigger flags. The interrupt control bit is not touched.
    pub fn clear_alarm_flags(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(Self::clear_trigger_flags, |_| ())
    }

    /// Handles a pending alarm interrupt.
    ///
    /// Without a pending notification this returns [`TriggeredAlarms::None`]
    /// and does no bus traffic. Otherwise the trigger flags are read once and
    /// only the flags seen set are cleared, so an alarm latching in between
    /// stays pending.
    pub fn service_alarms(
        &mut self,
        signal: &AlarmSignal,
    ) -> Result<TriggeredAlarms, DS3231Error<I2C::Error>> {
        if !signal.take() {
            return Ok(TriggeredAlarms::None);
        }
        self.guarded(
            |dev| {
                let status = dev.read_register(RegAddr::ControlStatus)?;
                let triggered = TriggeredAlarms::from_status(Status::from(status));
                if triggered != TriggeredAlarms::None {
                    let mut cleared = status;
                    if triggered.contains(AlarmSlot::Alarm1) {
                        cleared = bits::clear(cleared, STATUS_A1F_BIT);
                    }
                    if triggered.contains(AlarmSlot::Alarm2) {
                        cleared = bits::clear(cleared, STATUS_A2F_BIT);
                    }
                    dev.write_register(RegAddr::ControlStatus, cleared)?;
                    info!("DS3231: alarm triggered");
                }
                Ok(triggered)
            },
            |_| TriggeredAlarms::None,
        )
    }

    /// Saves the cached copy of `slot` to the EEPROM.
    pub fn persist_alarm(&mut self, slot: AlarmSlot) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let alarm = dev.alarms[slot.index()];
                dev.store_alarm(slot, &alarm)
            },
            |_| (),
        )
    }

    /// Loads the stored copy of `slot` from the EEPROM into the cache.
    /// The device registers are not touched.
    pub fn restore_alarm(&mut self, slot: AlarmSlot) -> Result<Alarm, DS3231Error<I2C::Error>> {
        self.guarded(
            |dev| {
                let alarm = dev.load_alarm(slot)?;
                dev.alarms[slot.index()] = alarm;
                Ok(alarm)
            },
            |dev| dev.alarms[slot.index()],
        )
    }

    /// Re-arms `slot` to ring again `minutes` after its current time because
    /// the last ring went unacknowledged. Only the alarm registers are
    /// written; the EEPROM keeps the real alarm.
    ///
    /// After [`MAX_IGNORED_ALARMS`] consecutive calls the slot is re-armed
    /// from its stored copy instead and the count starts over. Returns the
    /// alarm now in the registers.
    pub fn snooze_alarm(
        &mut self,
        slot: AlarmSlot,
        minutes: u8,
    ) -> Result<Alarm, DS3231Error<I2C::Error>> {
        let ignored = self.ignored[slot.index()].saturating_add(1);
        self.guarded(
            |dev| {
                if ignored >= MAX_IGNORED_ALARMS {
                    warn!("DS3231: alarm {} ignored {} times", slot.index() + 1, ignored);
                    dev.rearm_stored_alarm(slot)?;
                    dev.ignored[slot.index()] = 0;
                } else {
                    let next = dev.alarms[slot.index()].snoozed(minutes);
                    dev.write_alarm(slot, next.hour, next.minutes, next.recurrence)?;
                    dev.ignored[slot.index()] = ignored;
                }
                Ok(dev.alarms[slot.index()])
            },
            |dev| dev.alarms[slot.index()],
        )
    }

    /// Marks the last ring of `slot` as acknowledged. A slot that was
    /// snoozed is re-armed from its stored copy; otherwise nothing is
    /// written.
    pub fn acknowledge_alarm(&mut self, slot: AlarmSlot) -> Result<Alarm, DS3231Error<I2C::Error>> {
        if self.ignored[slot.index()] == 0 {
            return Ok(self.alarms[slot.index()]);
        }
        self.guarded(
            |dev| {
                dev.rearm_stored_alarm(slot)?;
                dev.ignored[slot.index()] = 0;
                Ok(dev.alarms[slot.index()])
            },
            |dev| dev.alarms[slot.index()],
        )
    }

    /// How many rings of `slot` in a row have been snoozed.
    pub fn ignored_alarm_count(&self, slot: AlarmSlot) -> u8 {
        self.ignored[slot.index()]
    }

    fn rearm_stored_alarm(&mut self, slot: AlarmSlot) -> Result<(), DS3231Error<I2C::Error>> {
        let stored = self.load_alarm(slot)?;
        self.write_alarm(slot, stored.hour, stored.minutes, stored.recurrence)
    }

    pub(crate) fn write_alarm(
        &mut self,
        slot: AlarmSlot,
        hour: u8,
        minute: u8,
        recurrence: AlarmRecurrence,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let (hour, minute) = (hour % 24, minute % 60);
        let registers = alarm_registers(hour, minute, recurrence);
        match slot {
            AlarmSlot::Alarm1 => self.write_registers(RegAddr::Alarm1Seconds, &registers)?,
            AlarmSlot::Alarm2 => self.write_registers(RegAddr::Alarm2Minutes, &registers[1..])?,
        }
        let alarm = &mut self.alarms[slot.index()];
        alarm.seconds = 0;
        alarm.minutes = minute;
        alarm.hour = hour;
        alarm.recurrence = recurrence;
        debug!("DS3231: alarm {} set to {}:{}", slot.index() + 1, hour, minute);
        Ok(())
    }

    pub(crate) fn apply_alarm_enable(
        &mut self,
        slot: AlarmSlot,
        enable: bool,
        persist: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.clear_trigger_flags()?;

        let current = self.read_register(RegAddr::Control)?;
        let mut control = bits::assign(current, slot.interrupt_enable_bit(), enable);
        if Control::from(control).interrupt_control() == InterruptControl::SquareWave {
            debug!("DS3231: leaving square wave mode for alarm interrupts");
            control = bits::set(control, CONTROL_INTCN_BIT);
        }

        let mut alarm = self.alarms[slot.index()];
        alarm.enabled = enable;
        if persist {
            self.store_alarm(slot, &alarm)?;
        }
        self.write_register(RegAddr::Control, control)?;
        self.alarms[slot.index()] = alarm;
        Ok(())
    }

    pub(crate) fn clear_trigger_flags(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |status| {
            bits::clear(bits::clear(status, STATUS_A1F_BIT), STATUS_A2F_BIT)
        })?;
        Ok(())
    }

    pub(crate) fn load_alarm(&mut self, slot: AlarmSlot) -> Result<Alarm, DS3231Error<I2C::Error>> {
        let mut bytes = [0u8; Alarm::STORAGE_SIZE];
        self.eeprom_read(slot.storage_address(), &mut bytes)?;
        Ok(Alarm::from_storage(bytes))
    }

    fn store_alarm(&mut self, slot: AlarmSlot, alarm: &Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        self.eeprom_write(slot.storage_address(), &alarm.to_storage())
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use crate::testing::{driver, driver_with, EEPROM, RTC};
    use crate::Settings;
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::Transaction as I2cTrans;

    fn volatile() -> Settings {
        Settings {
            persist_on_change: false,
            ..Settings::default()
        }
    }

    #[test]
    fn test_alarm_register_encoding() {
        assert_eq!(
            alarm_registers(7, 30, AlarmRecurrence::Daily),
            [0x00, 0x30, 0x07, 0x80]
        );
        assert_eq!(
            alarm_registers(22, 15, AlarmRecurrence::Weekly(Weekday::Wed)),
            [0x00, 0x15, 0x22, 0x43]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(AlarmRecurrence::Daily.label(), "DAILY");
        assert_eq!(AlarmRecurrence::Weekly(Weekday::Mon).label(), "MON");
        assert_eq!(AlarmRecurrence::Weekly(Weekday::Sun).label(), "SUN");
    }

    #[test]
    fn test_alarm_state() {
        let mut alarm = Alarm::default();
        assert_eq!(alarm.state(), AlarmState::Disabled);
        alarm.enabled = true;
        assert_eq!(alarm.state(), AlarmState::EnabledDaily);
        alarm.recurrence = AlarmRecurrence::Weekly(Weekday::Fri);
        assert_eq!(alarm.state(), AlarmState::EnabledWeekly);
    }

    #[test]
    fn test_storage_layout() {
        let alarm = Alarm {
            seconds: 0,
            minutes: 45,
            hour: 6,
            recurrence: AlarmRecurrence::Weekly(Weekday::Sat),
            enabled: true,
        };
        assert_eq!(alarm.to_storage(), [0, 45, 6, 6, 1]);
        assert_eq!(Alarm::from_storage([0, 45, 6, 6, 1]), alarm);
        assert_eq!(AlarmSlot::Alarm1.storage_address(), 0);
        assert_eq!(AlarmSlot::Alarm2.storage_address(), 5);
    }

    #[test]
    fn test_blank_eeprom_decodes_to_a_disabled_alarm() {
        let alarm = Alarm::from_storage([0xFF; 5]);
        assert_eq!(alarm.seconds, 255 % 60);
        assert_eq!(alarm.minutes, 255 % 60);
        assert_eq!(alarm.hour, 255 % 24);
        assert_eq!(alarm.recurrence, AlarmRecurrence::Daily);
        assert!(!alarm.enabled);
    }

    #[test]
    fn test_triggered_alarms_contains() {
        assert!(TriggeredAlarms::Both.contains(AlarmSlot::Alarm2));
        assert!(TriggeredAlarms::Alarm1.contains(AlarmSlot::Alarm1));
        assert!(!TriggeredAlarms::Alarm1.contains(AlarmSlot::Alarm2));
        assert!(!TriggeredAlarms::None.contains(AlarmSlot::Alarm1));
    }

    #[test]
    fn test_set_daily_alarm_1() {
        let mut dev = driver_with(
            &[I2cTrans::write(RTC, vec![0x07, 0x00, 0x30, 0x07, 0x80])],
            volatile(),
        );
        dev.set_alarm_daily(AlarmSlot::Alarm1, 7, 30).unwrap();
        let alarm = dev.alarm(AlarmSlot::Alarm1);
        assert_eq!((alarm.hour, alarm.minutes, alarm.seconds), (7, 30, 0));
        assert_eq!(alarm.recurrence, AlarmRecurrence::Daily);
        dev.i2c.done();
    }

    #[test]
    fn test_set_weekly_alarm_2_skips_seconds() {
        let mut dev = driver_with(
            &[I2cTrans::write(RTC, vec![0x0B, 0x15, 0x22, 0x43])],
            volatile(),
        );
        dev.set_alarm_weekly(AlarmSlot::Alarm2, 22, 15, Weekday::Wed)
            .unwrap();
        assert_eq!(
            dev.alarm(AlarmSlot::Alarm2).recurrence,
            AlarmRecurrence::Weekly(Weekday::Wed)
        );
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_reduces_values() {
        let mut dev = driver_with(
            &[I2cTrans::write(RTC, vec![0x07, 0x00, 0x15, 0x01, 0x80])],
            volatile(),
        );
        dev.set_alarm_daily(AlarmSlot::Alarm1, 25, 75).unwrap();
        let alarm = dev.alarm(AlarmSlot::Alarm1);
        assert_eq!((alarm.hour, alarm.minutes), (1, 15));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_leaves_eeprom_alone() {
        let mut dev = driver(&[
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x35, 0x07, 0x80]),
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x45, 0x06, 0x46]),
        ]);
        dev.set_alarm_daily(AlarmSlot::Alarm1, 7, 35).unwrap();
        dev.set_alarm_weekly(AlarmSlot::Alarm1, 6, 45, Weekday::Sat)
            .unwrap();
        assert_eq!(dev.delay.calls, 0);
        dev.i2c.done();
    }

    #[test]
    fn test_toggle_clears_flags_and_sets_enable_bit() {
        let mut dev = driver_with(
            &[
                I2cTrans::write_read(RTC, vec![0x0F], vec![0x8B]),
                I2cTrans::write(RTC, vec![0x0F, 0x88]),
                I2cTrans::write_read(RTC, vec![0x0E], vec![0x1C]),
                I2cTrans::write(RTC, vec![0x0E, 0x1E]),
            ],
            volatile(),
        );
        dev.toggle_alarm(AlarmSlot::Alarm2, true).unwrap();
        assert!(dev.is_alarm_enabled(AlarmSlot::Alarm2));
        assert!(!dev.is_alarm_enabled(AlarmSlot::Alarm1));
        dev.i2c.done();
    }

    #[test]
    fn test_toggle_forces_interrupt_mode() {
        let mut dev = driver_with(
            &[
                I2cTrans::write_read(RTC, vec![0x0F], vec![0x00]),
                I2cTrans::write(RTC, vec![0x0F, 0x00]),
                // square wave mode, 4.096 kHz
                I2cTrans::write_read(RTC, vec![0x0E], vec![0x10]),
                I2cTrans::write(RTC, vec![0x0E, 0x15]),
            ],
            volatile(),
        );
        dev.toggle_alarm(AlarmSlot::Alarm1, true).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_toggle_persists_before_control_write() {
        let mut dev = driver(&[
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x00]),
            I2cTrans::write(RTC, vec![0x0F, 0x00]),
            I2cTrans::write_read(RTC, vec![0x0E], vec![0x05]),
            I2cTrans::write(EEPROM, vec![0x00, 0x00, 0, 0, 0, 0, 0]),
            I2cTrans::write(RTC, vec![0x0E, 0x04]),
        ]);
        dev.toggle_alarm(AlarmSlot::Alarm1, false).unwrap();
        assert!(!dev.is_alarm_enabled(AlarmSlot::Alarm1));
        assert_eq!(dev.delay.calls, 1);
        dev.i2c.done();
    }

    #[test]
    fn test_failed_toggle_keeps_cache() {
        let mut dev = driver_with(
            &[
                I2cTrans::write_read(RTC, vec![0x0F], vec![0x00]),
                I2cTrans::write(RTC, vec![0x0F, 0x00]),
                I2cTrans::write_read(RTC, vec![0x0E], vec![0x04]),
                I2cTrans::write(RTC, vec![0x0E, 0x05]).with_error(ErrorKind::Other),
            ],
            volatile(),
        );
        assert!(dev.toggle_alarm(AlarmSlot::Alarm1, true).is_err());
        assert!(!dev.is_alarm_enabled(AlarmSlot::Alarm1));
        dev.i2c.done();
    }

    #[test]
    fn test_triggered_and_clear_flags() {
        let mut dev = driver(&[
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x02]),
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x0B]),
            I2cTrans::write(RTC, vec![0x0F, 0x08]),
        ]);
        assert_eq!(dev.triggered_alarms().unwrap(), TriggeredAlarms::Alarm2);
        dev.clear_alarm_flags().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_service_alarms_needs_a_signal() {
        let signal = AlarmSignal::new();
        let mut dev = driver(&[
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x03]),
            I2cTrans::write(RTC, vec![0x0F, 0x00]),
        ]);
        assert_eq!(dev.service_alarms(&signal).unwrap(), TriggeredAlarms::None);
        signal.notify();
        assert_eq!(dev.service_alarms(&signal).unwrap(), TriggeredAlarms::Both);
        assert_eq!(dev.service_alarms(&signal).unwrap(), TriggeredAlarms::None);
        dev.i2c.done();
    }

    #[test]
    fn test_service_alarms_clears_only_what_it_reports() {
        let signal = AlarmSignal::new();
        let mut dev = driver(&[
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x89]),
            I2cTrans::write(RTC, vec![0x0F, 0x88]),
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x02]),
            I2cTrans::write(RTC, vec![0x0F, 0x00]),
            I2cTrans::write_read(RTC, vec![0x0F], vec![0x00]),
        ]);
        signal.notify();
        assert_eq!(dev.service_alarms(&signal).unwrap(), TriggeredAlarms::Alarm1);
        // alarm 2 latched after the read above and is still reported
        signal.notify();
        assert_eq!(dev.service_alarms(&signal).unwrap(), TriggeredAlarms::Alarm2);
        // spurious notification, nothing to clear
        signal.notify();
        assert_eq!(dev.service_alarms(&signal).unwrap(), TriggeredAlarms::None);
        dev.i2c.done();
    }

    #[test]
    fn test_persist_and_restore_round_trip() {
        let mut dev = driver_with(
            &[
                I2cTrans::write(RTC, vec![0x07, 0x00, 0x30, 0x07, 0x80]),
                I2cTrans::write_read(RTC, vec![0x0F], vec![0x00]),
                I2cTrans::write(RTC, vec![0x0F, 0x00]),
                I2cTrans::write_read(RTC, vec![0x0E], vec![0x04]),
                I2cTrans::write(RTC, vec![0x0E, 0x05]),
                I2cTrans::write(EEPROM, vec![0x00, 0x00, 0, 30, 7, 0, 1]),
                I2cTrans::write_read(EEPROM, vec![0x00, 0x00], vec![0, 30, 7, 0, 1]),
            ],
            volatile(),
        );
        dev.set_alarm_daily(AlarmSlot::Alarm1, 7, 30).unwrap();
        dev.toggle_alarm(AlarmSlot::Alarm1, true).unwrap();
        dev.persist_alarm(AlarmSlot::Alarm1).unwrap();
        let persisted = dev.alarm(AlarmSlot::Alarm1);

        let restored = dev.restore_alarm(AlarmSlot::Alarm1).unwrap();
        assert_eq!((restored.hour, restored.minutes), (7, 30));
        assert_eq!(restored.recurrence, AlarmRecurrence::Daily);
        assert!(restored.enabled);
        assert_eq!(restored, persisted);
        dev.i2c.done();
    }

    #[test]
    fn test_persist_and_restore() {
        let mut dev = driver_with(
            &[
                I2cTrans::write(RTC, vec![0x0B, 0x05, 0x18, 0x80]),
                I2cTrans::write(EEPROM, vec![0x00, 0x05, 0, 5, 18, 0, 0]),
                I2cTrans::write_read(EEPROM, vec![0x00, 0x05], vec![0, 5, 18, 0, 1]),
            ],
            volatile(),
        );
        dev.set_alarm_daily(AlarmSlot::Alarm2, 18, 5).unwrap();
        dev.persist_alarm(AlarmSlot::Alarm2).unwrap();
        let restored = dev.restore_alarm(AlarmSlot::Alarm2).unwrap();
        assert!(restored.enabled);
        assert_eq!(dev.alarm(AlarmSlot::Alarm2), restored);
        dev.i2c.done();
    }

    #[test]
    fn test_snoozed_carries_minutes_into_hours() {
        let alarm = Alarm {
            minutes: 30,
            hour: 7,
            enabled: true,
            ..Alarm::default()
        };
        let later = alarm.snoozed(SNOOZE_MINUTES);
        assert_eq!((later.hour, later.minutes), (7, 35));
        assert!(later.enabled);

        let later = Alarm { minutes: 58, ..alarm }.snoozed(SNOOZE_MINUTES);
        assert_eq!((later.hour, later.minutes), (8, 3));
        assert_eq!(later.recurrence, AlarmRecurrence::Daily);
    }

    #[test]
    fn test_snoozed_past_midnight_moves_weekly_day() {
        let sunday = Alarm {
            minutes: 57,
            hour: 23,
            recurrence: AlarmRecurrence::Weekly(Weekday::Sun),
            ..Alarm::default()
        };
        let later = sunday.snoozed(SNOOZE_MINUTES);
        assert_eq!((later.hour, later.minutes), (0, 2));
        assert_eq!(later.recurrence, AlarmRecurrence::Weekly(Weekday::Mon));

        let daily = Alarm {
            recurrence: AlarmRecurrence::Daily,
            ..sunday
        };
        let later = daily.snoozed(SNOOZE_MINUTES);
        assert_eq!((later.hour, later.minutes), (0, 2));
        assert_eq!(later.recurrence, AlarmRecurrence::Daily);
    }

    #[test]
    fn test_snooze_writes_registers_only() {
        let mut dev = driver(&[
            I2cTrans::write(RTC, vec![0x0B, 0x57, 0x23, 0x47]),
            I2cTrans::write(RTC, vec![0x0B, 0x02, 0x00, 0x41]),
        ]);
        dev.set_alarm_weekly(AlarmSlot::Alarm2, 23, 57, Weekday::Sun)
            .unwrap();
        let armed = dev.snooze_alarm(AlarmSlot::Alarm2, SNOOZE_MINUTES).unwrap();
        assert_eq!((armed.hour, armed.minutes), (0, 2));
        assert_eq!(armed.recurrence, AlarmRecurrence::Weekly(Weekday::Mon));
        assert_eq!(dev.ignored_alarm_count(AlarmSlot::Alarm2), 1);
        assert_eq!(dev.ignored_alarm_count(AlarmSlot::Alarm1), 0);
        assert_eq!(dev.delay.calls, 0);
        dev.i2c.done();
    }

    #[test]
    fn test_fifth_ignored_ring_restores_stored_alarm() {
        let mut dev = driver(&[
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x30, 0x07, 0x80]),
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x35, 0x07, 0x80]),
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x40, 0x07, 0x80]),
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x45, 0x07, 0x80]),
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x50, 0x07, 0x80]),
            I2cTrans::write_read(EEPROM, vec![0x00, 0x00], vec![0, 30, 7, 0, 1]),
            I2cTrans::write(RTC, vec![0x07, 0x00, 0x30, 0x07, 0x80]),
        ]);
        dev.set_alarm_daily(AlarmSlot::Alarm1, 7, 30).unwrap();
        for count in 1..MAX_IGNORED_ALARMS {
            dev.snooze_alarm(AlarmSlot::Alarm1, SNOOZE_MINUTES).unwrap();
            assert_eq!(dev.ignored_alarm_count(AlarmSlot::Alarm1), count);
        }
        let armed = dev.snooze_alarm(AlarmSlot::Alarm1, SNOOZE_MINUTES).unwrap();
        assert_eq!((armed.hour, armed.minutes), (7, 30));
        assert_eq!(dev.ignored_alarm_count(AlarmSlot::Alarm1), 0);
        dev.i2c.done();
    }

    #[test]
    fn test_acknowledge_restores_snoozed_alarm() {
        let mut dev = driver(&[
            I2cTrans::write(RTC, vec![0x0B, 0x00, 0x06, 0x45]),
            I2cTrans::write(RTC, vec![0x0B, 0x05, 0x06, 0x45]),
            I2cTrans::write_read(EEPROM, vec![0x00, 0x05], vec![0, 0, 6, 5, 1]),
            I2cTrans::write(RTC, vec![0x0B, 0x00, 0x06, 0x45]),
        ]);
        dev.set_alarm_weekly(AlarmSlot::Alarm2, 6, 0, Weekday::Fri)
            .unwrap();
        dev.snooze_alarm(AlarmSlot::Alarm2, SNOOZE_MINUTES).unwrap();
        let armed = dev.acknowledge_alarm(AlarmSlot::Alarm2).unwrap();
        assert_eq!((armed.hour, armed.minutes), (6, 0));
        assert_eq!(dev.ignored_alarm_count(AlarmSlot::Alarm2), 0);
        // nothing left to restore
        dev.acknowledge_alarm(AlarmSlot::Alarm2).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_arm_alarm() {
        let alarm = Alarm {
            seconds: 0,
            minutes: 0,
            hour: 12,
            recurrence: AlarmRecurrence::Weekly(Weekday::Tue),
            enabled: true,
        };
        let mut dev = driver_with(
            &[
                I2cTrans::write(RTC, vec![0x07, 0x00, 0x00, 0x12, 0x42]),
                I2cTrans::write_read(RTC, vec![0x0F], vec![0x00]),
                I2cTrans::write(RTC, vec![0x0F, 0x00]),
                I2cTrans::write_read(RTC, vec![0x0E], vec![0x04]),
                I2cTrans::write(RTC, vec![0x0E, 0x05]),
            ],
            volatile(),
        );
        dev.arm_alarm(AlarmSlot::Alarm1, &alarm).unwrap();
        assert_eq!(dev.alarm(AlarmSlot::Alarm1), alarm);
        dev.i2c.done();
    }
}
