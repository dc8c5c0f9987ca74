//! Register and EEPROM transfers.
//!
//! Register transfers address the DS3231 with a one-byte register pointer.
//! EEPROM transfers address the AT24C32 with a two-byte, big-endian memory
//! address. EEPROM writes never cross a 32-byte page and carry at most 30 data
//! bytes per transaction; each one is followed by a write-cycle delay.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::registers::RegAddr;
use crate::{DS3231Error, DS3231};

/// Longest register transfer, the seven time-keeping registers.
pub(crate) const MAX_REGISTER_TRANSFER: usize = 7;

/// AT24C32 page size in bytes.
pub const EEPROM_PAGE_SIZE: u16 = 32;
/// Most data bytes in one EEPROM write transaction.
pub(crate) const EEPROM_MAX_WRITE: usize = 30;
/// Most bytes in one EEPROM read transaction.
pub(crate) const EEPROM_MAX_READ: usize = 32;
/// Wait after each EEPROM write transaction, in milliseconds.
pub const EEPROM_WRITE_CYCLE_MS: u32 = 10;

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D> {
    /// Reads `buffer.len()` consecutive registers starting at `start`.
    ///
    /// `buffer` is only written once the whole transfer has succeeded.
    pub(crate) fn read_registers(
        &mut self,
        start: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        if buffer.len() > MAX_REGISTER_TRANSFER {
            return Err(DS3231Error::TransferTooLong);
        }
        let mut data = [0u8; MAX_REGISTER_TRANSFER];
        let data = &mut data[..buffer.len()];
        self.i2c
            .write_read(self.settings.rtc_address, &[start as u8], data)?;
        trace!("DS3231: read {} bytes at {}", data.len(), start as u8);
        buffer.copy_from_slice(data);
        Ok(())
    }

    pub(crate) fn read_register(&mut self, reg: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.read_registers(reg, &mut data)?;
        Ok(data[0])
    }

    /// Writes `data` to consecutive registers starting at `start` in one
    /// transaction.
    pub(crate) fn write_registers(
        &mut self,
        start: RegAddr,
        data: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        if data.len() > MAX_REGISTER_TRANSFER {
            return Err(DS3231Error::TransferTooLong);
        }
        let mut frame = [0u8; MAX_REGISTER_TRANSFER + 1];
        frame[0] = start as u8;
        frame[1..=data.len()].copy_from_slice(data);
        self.i2c
            .write(self.settings.rtc_address, &frame[..=data.len()])?;
        trace!("DS3231: wrote {} bytes at {}", data.len(), start as u8);
        Ok(())
    }

    pub(crate) fn write_register(
        &mut self,
        reg: RegAddr,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_registers(reg, &[value])
    }

    /// Read-modify-write of one register. Returns the written value.
    pub(crate) fn update_register(
        &mut self,
        reg: RegAddr,
        f: impl FnOnce(u8) -> u8,
    ) -> Result<u8, DS3231Error<I2C::Error>> {
        let value = f(self.read_register(reg)?);
        self.write_register(reg, value)?;
        Ok(value)
    }

    /// Reads `buffer.len()` bytes of EEPROM starting at `address`.
    pub fn read_eeprom(
        &mut self,
        address: u16,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(|dev| dev.eeprom_read(address, buffer), |_| ())
    }

    /// Writes `data` to EEPROM starting at `address`, split at page
    /// boundaries.
    pub fn write_eeprom(&mut self, address: u16, data: &[u8]) -> Result<(), DS3231Error<I2C::Error>> {
        self.guarded(|dev| dev.eeprom_write(address, data), |_| ())
    }

    pub(crate) fn eeprom_read(
        &mut self,
        address: u16,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let mut address = address;
        for chunk in buffer.chunks_mut(EEPROM_MAX_READ) {
            self.i2c
                .write_read(self.settings.eeprom_address, &address.to_be_bytes(), chunk)?;
            address = address.wrapping_add(chunk.len() as u16);
        }
        Ok(())
    }

    pub(crate) fn eeprom_write(
        &mut self,
        address: u16,
        data: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let mut address = address;
        let mut remaining = data;
        while !remaining.is_empty() {
            let page_room = usize::from(EEPROM_PAGE_SIZE - address % EEPROM_PAGE_SIZE);
            let len = remaining.len().min(EEPROM_MAX_WRITE).min(page_room);
            let (chunk, rest) = remaining.split_at(len);

            let mut frame = [0u8; 2 + EEPROM_MAX_WRITE];
            frame[..2].copy_from_slice(&address.to_be_bytes());
            frame[2..2 + len].copy_from_slice(chunk);
            self.i2c
                .write(self.settings.eeprom_address, &frame[..2 + len])?;
            self.delay.delay_ms(EEPROM_WRITE_CYCLE_MS);
            debug!("DS3231: eeprom wrote {} bytes at {}", len, address);

            address = address.wrapping_add(len as u16);
            remaining = rest;
        }
        Ok(())
    }
}
