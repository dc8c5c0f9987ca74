//! Shared test doubles.

use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

use crate::{Settings, DS3231};

pub(crate) const RTC: u8 = 0x68;
pub(crate) const EEPROM: u8 = 0x57;

/// Delay that records how often and how long it was asked to wait.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingDelay {
    pub calls: usize,
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}

pub(crate) fn driver(expectations: &[I2cTrans]) -> DS3231<I2cMock, RecordingDelay> {
    DS3231::new(I2cMock::new(expectations), RecordingDelay::default())
}

pub(crate) fn driver_with(
    expectations: &[I2cTrans],
    settings: Settings,
) -> DS3231<I2cMock, RecordingDelay> {
    DS3231::with_settings(I2cMock::new(expectations), RecordingDelay::default(), settings)
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
    let d = a - b;
    d < 1e-3 && d > -1e-3
}
