//! Abracon AB18X5 (AB1804, AB1805, AB1814, AB1815) Real Time Clock (RTC) driver
//!
//! Talks to the RTC over SPI using the `embedded_hal` 0.2 blocking traits,
//! with a dedicated chip select pin owned by the driver.
//! Every operation is a direct register transfer; nothing is cached.
#![cfg_attr(not(test), no_std)]

pub use rtcc::{
  DateTimeAccess, NaiveDate, NaiveDateTime, Datelike, Timelike,
};

use core::fmt;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::spi::{Mode, MODE_0};

// Logging goes through defmt when the `defmt` feature is enabled, otherwise it compiles out
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "defmt")]
    defmt::trace!($($arg)*);
  };
}

macro_rules! warn {
  ($($arg:tt)*) => {
    #[cfg(feature = "defmt")]
    defmt::warn!($($arg)*);
  };
}

pub mod datetime;
pub mod registers;

pub use datetime::{
  decode_alarm, decode_time, encode_alarm, encode_time, Alarm, AlarmRepeat, Time,
};
pub use registers::{
  AnalogStatus, BatteryModeIo, BatteryReference, BrefControl, CalRcHi, CalXt,
  ConfigurationKey, Control1, Control2, CountdownControl, ExtensionRam, Identification,
  InterruptMask, InterruptMode, OscillatorControl, OscillatorStatus, Out1Select, Out2Select,
  OutputControl, SleepControl, SquareWave, Status, TimerFrequency, Trickle, TrickleDiode,
  TrickleResistor, Watchdog, WatchdogFrequency,
};

use datetime::{ALARM_BLOCK_LEN, TIME_BLOCK_LEN};
use registers::*;

/// SPI mode expected by the RTC: CPOL = 0, CPHA = 0, MSB first
pub const SPI_MODE: Mode = MODE_0;

/// SPI clock rate the driver has been used with. The part accepts up to 2 MHz.
pub const SPI_FREQUENCY_HZ: u32 = 1_000_000;

/// Last value of the 12/24 bit written through this driver.
/// Advisory only: it is not read back from the chip.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockFormat {
  Hour12,
  Hour24,
}

/// Last oscillator selection written through this driver.
/// Advisory only: it is not read back from the chip.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
  Unset,
  Crystal,
  Rc,
}

/// Driver errors
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE, PinE> {
  /// The SPI exchange failed
  Spi(SpiE),
  /// Driving the chip select pin failed
  ChipSelect(PinE),
  /// The identification block does not belong to an AB18X5 part
  UnsupportedPart(Identification),
  /// Value cannot be represented by the RTC (eg year outside 2000..2099)
  InvalidInputData,
  /// The time registers hold an impossible calendar date
  InvalidDateTime,
  /// The hex dump sink refused output
  Format,
}

/// AB18X5
/// Ultra-Low Power Real-Time Clock with SPI interface
/// rust no_std driver (utilizes the embedded_hal spi and digital interfaces)
pub struct AB18X5<SPI, CS> {
  spi: SPI,
  cs: CS,
  id: Identification,
  clock_format: ClockFormat,
  clock_source: ClockSource,
}

impl<SPI, CS, E, PinE> AB18X5<SPI, CS>
  where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
{
  /// New driver instance. Deasserts chip select, then reads the identification
  /// block and fails with `Error::UnsupportedPart` unless it names an AB1804,
  /// AB1805, AB1814 or AB1815.
  pub fn new(spi: SPI, mut cs: CS) -> Result<Self, Error<E, PinE>> {
    cs.set_high().map_err(Error::ChipSelect)?;
    let mut rtc = AB18X5 {
      spi,
      cs,
      id: Identification::default(),
      clock_format: ClockFormat::Hour24,
      clock_source: ClockSource::Unset,
    };

    let id = rtc.get_id()?;
    if !id.is_supported() {
      warn!("unsupported RTC id: {=u8} {=u8}", id.part_upper, id.part_lower);
      return Err(Error::UnsupportedPart(id));
    }
    rtc.id = id;
    Ok(rtc)
  }

  /// Release the SPI bus and chip select pin
  pub fn destroy(self) -> (SPI, CS) {
    (self.spi, self.cs)
  }

  /// Identification block read at initialization
  pub fn id(&self) -> Identification {
    self.id
  }

  pub fn clock_format(&self) -> ClockFormat {
    self.clock_format
  }

  pub fn clock_source(&self) -> ClockSource {
    self.clock_source
  }

  // One chip select bracketed exchange: the address byte, then `body`.
  // Chip select is released on every path once it has been asserted.
  fn transaction<F>(&mut self, address: u8, body: F) -> Result<(), Error<E, PinE>>
    where
      F: FnOnce(&mut SPI) -> Result<(), E>,
  {
    self.cs.set_low().map_err(Error::ChipSelect)?;
    let result = self.spi.write(&[address]).and_then(|_| body(&mut self.spi));
    let released = self.cs.set_high().map_err(Error::ChipSelect);
    result.map_err(Error::Spi)?;
    released
  }

  /// Read `buf.len()` consecutive registers starting at `offset`
  pub fn read_registers(&mut self, offset: u8, buf: &mut [u8]) -> Result<(), Error<E, PinE>> {
    buf.fill(0);
    self.transaction(read_address(offset), |spi| spi.transfer(buf).map(|_| ()))
  }

  /// Write `data` to consecutive registers starting at `offset`
  pub fn write_registers(&mut self, offset: u8, data: &[u8]) -> Result<(), Error<E, PinE>> {
    self.transaction(write_address(offset), |spi| spi.write(data))
  }

  fn read_reg(&mut self, offset: u8) -> Result<u8, Error<E, PinE>> {
    let mut buf = [0u8];
    self.read_registers(offset, &mut buf)?;
    Ok(buf[0])
  }

  fn write_reg(&mut self, offset: u8, value: u8) -> Result<(), Error<E, PinE>> {
    self.write_registers(offset, &[value])
  }

  fn get<R: Register>(&mut self) -> Result<R, Error<E, PinE>> {
    self.read_reg(R::ADDRESS).map(R::from_bits)
  }

  fn set<R: Register>(&mut self, reg: R) -> Result<(), Error<E, PinE>> {
    self.write_reg(R::ADDRESS, reg.bits())
  }

  /// Read and decode the 7 byte identification block
  pub fn get_id(&mut self) -> Result<Identification, Error<E, PinE>> {
    let mut buf = [0u8; ID_BLOCK_LEN];
    self.read_registers(REG_ID0, &mut buf)?;
    Ok(Identification::from_bytes(&buf))
  }

  /// Read the whole time block (hundredths through weekday) in one transfer
  pub fn get_time(&mut self) -> Result<Time, Error<E, PinE>> {
    let mut buf = [0u8; TIME_BLOCK_LEN];
    self.read_registers(REG_TIME_HUNDREDTHS, &mut buf)?;
    Ok(datetime::decode_time(&buf))
  }

  /// Write the whole time block in one transfer.
  /// The counters only accept writes while Control1 WRTC is set (the reset default).
  /// Years outside 2000..=2099 fail with `Error::InvalidInputData`.
  pub fn set_time(&mut self, time: &Time) -> Result<(), Error<E, PinE>> {
    if !(datetime::EPOCH_YEAR..=datetime::EPOCH_YEAR + 99).contains(&time.year) {
      return Err(Error::InvalidInputData);
    }
    self.write_registers(REG_TIME_HUNDREDTHS, &datetime::encode_time(time))
  }

  /// Zero the hundredths counter
  pub fn clear_hundredths(&mut self) -> Result<(), Error<E, PinE>> {
    self.write_reg(REG_TIME_HUNDREDTHS, 0)
  }

  /// Read the alarm and how often it repeats
  pub fn get_alarm(&mut self) -> Result<(Alarm, AlarmRepeat), Error<E, PinE>> {
    let countdown: CountdownControl = self.get()?;
    let mut buf = [0u8; ALARM_BLOCK_LEN];
    self.read_registers(REG_ALARM_HUNDREDTHS, &mut buf)?;
    Ok(datetime::decode_alarm(&buf, countdown.rpt()))
  }

  /// Write the alarm block, then update the repeat field of countdown control.
  /// The alarm only drives an interrupt once AIE is set in the interrupt mask.
  pub fn set_alarm(&mut self, alarm: &Alarm, repeat: AlarmRepeat) -> Result<(), Error<E, PinE>> {
    let (buf, rpt) = datetime::encode_alarm(alarm, repeat);
    self.write_registers(REG_ALARM_HUNDREDTHS, &buf)?;
    let mut countdown: CountdownControl = self.get()?;
    countdown.set_rpt(rpt);
    self.set(countdown)
  }

  /// Check the alarm flag, and if it's set, clear it.
  /// Returns whether the alarm had fired.
  pub fn check_and_clear_alarm(&mut self) -> Result<bool, Error<E, PinE>> {
    let mut status = self.get_status()?;
    let fired = status.alm();
    if fired {
      status.set_alm(false);
      self.set_status(status)?;
    }
    Ok(fired)
  }

  /// Request sleep mode after `timeout` (0..7) SLTO periods of about 7.8 ms.
  /// With PSW/nIRQ2 configured as `Out2Select::Sleep` this switches the host power off.
  pub fn sleep(&mut self, timeout: u8) -> Result<(), Error<E, PinE>> {
    let mut sleep = self.get_sleep_control()?;
    sleep.set_slto(timeout);
    sleep.set_slp(true);
    self.set_sleep_control(sleep)
  }

  pub fn get_status(&mut self) -> Result<Status, Error<E, PinE>> {
    self.get()
  }

  /// Flags are cleared by writing 0. With Control1 ARST set, reading status
  /// also clears them.
  pub fn set_status(&mut self, status: Status) -> Result<(), Error<E, PinE>> {
    self.set(status)
  }

  pub fn get_control1(&mut self) -> Result<Control1, Error<E, PinE>> {
    self.get()
  }

  pub fn set_control1(&mut self, control1: Control1) -> Result<(), Error<E, PinE>> {
    self.set(control1)?;
    self.clock_format = if control1.twelve_hour() { ClockFormat::Hour12 } else { ClockFormat::Hour24 };
    Ok(())
  }

  pub fn get_control2(&mut self) -> Result<Control2, Error<E, PinE>> {
    self.get()
  }

  pub fn set_control2(&mut self, control2: Control2) -> Result<(), Error<E, PinE>> {
    self.set(control2)
  }

  pub fn get_interrupt_mask(&mut self) -> Result<InterruptMask, Error<E, PinE>> {
    self.get()
  }

  pub fn set_interrupt_mask(&mut self, mask: InterruptMask) -> Result<(), Error<E, PinE>> {
    self.set(mask)
  }

  pub fn get_square_wave(&mut self) -> Result<SquareWave, Error<E, PinE>> {
    self.get()
  }

  pub fn set_square_wave(&mut self, sqw: SquareWave) -> Result<(), Error<E, PinE>> {
    self.set(sqw)
  }

  pub fn get_cal_xt(&mut self) -> Result<CalXt, Error<E, PinE>> {
    self.get()
  }

  pub fn set_cal_xt(&mut self, cal: CalXt) -> Result<(), Error<E, PinE>> {
    self.set(cal)
  }

  pub fn get_cal_rc_hi(&mut self) -> Result<CalRcHi, Error<E, PinE>> {
    self.get()
  }

  pub fn set_cal_rc_hi(&mut self, cal: CalRcHi) -> Result<(), Error<E, PinE>> {
    self.set(cal)
  }

  /// Low byte of the RC oscillator calibration offset
  pub fn get_cal_rc_low(&mut self) -> Result<u8, Error<E, PinE>> {
    self.read_reg(REG_CAL_RC_LOW)
  }

  pub fn set_cal_rc_low(&mut self, offset: u8) -> Result<(), Error<E, PinE>> {
    self.write_reg(REG_CAL_RC_LOW, offset)
  }

  pub fn get_sleep_control(&mut self) -> Result<SleepControl, Error<E, PinE>> {
    self.get()
  }

  pub fn set_sleep_control(&mut self, sleep: SleepControl) -> Result<(), Error<E, PinE>> {
    self.set(sleep)
  }

  pub fn get_countdown_control(&mut self) -> Result<CountdownControl, Error<E, PinE>> {
    self.get()
  }

  pub fn set_countdown_control(&mut self, countdown: CountdownControl) -> Result<(), Error<E, PinE>> {
    self.set(countdown)
  }

  /// Current countdown timer value
  pub fn get_countdown_timer(&mut self) -> Result<u8, Error<E, PinE>> {
    self.read_reg(REG_COUNTDOWN_TIMER)
  }

  pub fn set_countdown_timer(&mut self, value: u8) -> Result<(), Error<E, PinE>> {
    self.write_reg(REG_COUNTDOWN_TIMER, value)
  }

  /// Value reloaded into the countdown timer when it repeats
  pub fn get_timer_initial_value(&mut self) -> Result<u8, Error<E, PinE>> {
    self.read_reg(REG_TIMER_INITIAL)
  }

  pub fn set_timer_initial_value(&mut self, value: u8) -> Result<(), Error<E, PinE>> {
    self.write_reg(REG_TIMER_INITIAL, value)
  }

  pub fn get_watchdog(&mut self) -> Result<Watchdog, Error<E, PinE>> {
    self.get()
  }

  pub fn set_watchdog(&mut self, watchdog: Watchdog) -> Result<(), Error<E, PinE>> {
    self.set(watchdog)
  }

  pub fn get_oscillator_control(&mut self) -> Result<OscillatorControl, Error<E, PinE>> {
    self.get()
  }

  /// Writes the oscillator control unlock key, then the register
  pub fn set_oscillator_control(&mut self, osc: OscillatorControl) -> Result<(), Error<E, PinE>> {
    self.set_configuration_key(ConfigurationKey::OscillatorControl)?;
    self.set(osc)?;
    self.clock_source = if osc.osel() { ClockSource::Rc } else { ClockSource::Crystal };
    Ok(())
  }

  pub fn get_oscillator_status(&mut self) -> Result<OscillatorStatus, Error<E, PinE>> {
    self.get()
  }

  pub fn set_oscillator_status(&mut self, status: OscillatorStatus) -> Result<(), Error<E, PinE>> {
    self.set(status)
  }

  /// Write a value to the configuration key register (0x1F)
  pub fn set_configuration_key(&mut self, key: ConfigurationKey) -> Result<(), Error<E, PinE>> {
    trace!("configuration key {=u8:#x}", key as u8);
    self.write_reg(REG_CONFIGURATION_KEY, key as u8)
  }

  /// Reset the chip as if powered up
  pub fn software_reset(&mut self) -> Result<(), Error<E, PinE>> {
    self.set_configuration_key(ConfigurationKey::SoftwareReset)
  }

  pub fn get_trickle(&mut self) -> Result<Trickle, Error<E, PinE>> {
    self.get()
  }

  /// The chip ignores this write unless `ConfigurationKey::RegisterControl`
  /// was written immediately before it.
  pub fn set_trickle(&mut self, trickle: Trickle) -> Result<(), Error<E, PinE>> {
    self.set(trickle)
  }

  pub fn get_bref_control(&mut self) -> Result<BrefControl, Error<E, PinE>> {
    self.get()
  }

  /// The chip ignores this write unless `ConfigurationKey::RegisterControl`
  /// was written immediately before it.
  pub fn set_bref_control(&mut self, bref: BrefControl) -> Result<(), Error<E, PinE>> {
    self.set(bref)
  }

  /// Whether the autocalibration filter capacitor is enabled
  pub fn get_autocalibration_filter(&mut self) -> Result<bool, Error<E, PinE>> {
    Ok(self.read_reg(REG_AFCTRL)? == AFCTRL_ENABLE)
  }

  /// Enable or disable the autocalibration filter capacitor
  pub fn set_autocalibration_filter(&mut self, enable: bool) -> Result<(), Error<E, PinE>> {
    self.write_reg(REG_AFCTRL, if enable { AFCTRL_ENABLE } else { AFCTRL_DISABLE })
  }

  pub fn get_battery_mode_io(&mut self) -> Result<BatteryModeIo, Error<E, PinE>> {
    self.get()
  }

  /// Writes the register control unlock key, then the register.
  /// Only IOBM is written; the reserved bits are forced to zero.
  pub fn set_battery_mode_io(&mut self, mode: BatteryModeIo) -> Result<(), Error<E, PinE>> {
    self.set_configuration_key(ConfigurationKey::RegisterControl)?;
    let io = if mode.iobm() { BatteryModeIo::ENABLED } else { BatteryModeIo::DISABLED };
    self.set(io)
  }

  pub fn get_analog_status(&mut self) -> Result<AnalogStatus, Error<E, PinE>> {
    self.get()
  }

  pub fn set_analog_status(&mut self, status: AnalogStatus) -> Result<(), Error<E, PinE>> {
    self.set(status)
  }

  pub fn get_output_control(&mut self) -> Result<OutputControl, Error<E, PinE>> {
    self.get()
  }

  /// The chip ignores this write unless `ConfigurationKey::RegisterControl`
  /// was written immediately before it.
  pub fn set_output_control(&mut self, output: OutputControl) -> Result<(), Error<E, PinE>> {
    self.set(output)
  }

  pub fn get_extension_ram(&mut self) -> Result<ExtensionRam, Error<E, PinE>> {
    self.get()
  }

  pub fn set_extension_ram(&mut self, ext: ExtensionRam) -> Result<(), Error<E, PinE>> {
    self.set(ext)
  }

  /// Dump registers 0x00..0x7F to `out`, eight per line:
  /// `# 0x08: 0x00 0x00 ...`
  pub fn hex_dump<W: fmt::Write>(&mut self, out: &mut W) -> Result<(), Error<E, PinE>> {
    let mut row = [0u8; 8];
    for offset in (0..0x80u8).step_by(row.len()) {
      self.read_registers(offset, &mut row)?;
      write!(out, "# 0x{:02x}:", offset).map_err(|_| Error::Format)?;
      for byte in row {
        write!(out, " 0x{:02x}", byte).map_err(|_| Error::Format)?;
      }
      out.write_str("\n").map_err(|_| Error::Format)?;
    }
    Ok(())
  }
}

impl<SPI, CS, E, PinE> DateTimeAccess for AB18X5<SPI, CS>
  where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
{
  type Error = Error<E, PinE>;

  /// Hundredths are reported as milliseconds.
  /// Assumes the chip runs in 24 hour mode: with Control1 12/24 set the PM
  /// bit lands in the hour, giving wrong hours or `Error::InvalidDateTime`.
  fn datetime(&mut self) -> Result<NaiveDateTime, Self::Error> {
    let time = self.get_time()?;
    NaiveDate::from_ymd_opt(time.year as i32, time.month as u32, time.day as u32)
      .and_then(|date| {
        date.and_hms_milli_opt(
          time.hour as u32,
          time.minute as u32,
          time.second as u32,
          time.hundredths as u32 * 10,
        )
      })
      .ok_or(Error::InvalidDateTime)
  }

  /// Only years 2000 to 2099 are representable; others fail with `Error::InvalidInputData`.
  fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), Self::Error> {
    let year = datetime.year();
    if !(2000..=2099).contains(&year) {
      return Err(Error::InvalidInputData);
    }
    // leap seconds report nanoseconds past 1e9
    let hundredths = (datetime.nanosecond() / 10_000_000).min(99);
    let time = Time {
      hundredths: hundredths as u8,
      second: datetime.second() as u8,
      minute: datetime.minute() as u8,
      hour: datetime.hour() as u8,
      day: datetime.day() as u8,
      month: datetime.month() as u8,
      year: year as u16,
      weekday: datetime.weekday().num_days_from_sunday() as u8,
    };
    self.set_time(&time)
  }
}
