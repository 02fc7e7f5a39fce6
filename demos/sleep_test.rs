extern crate ab18x5_rtc;

use std::fmt::Debug;
use std::time::Duration;

use ab18x5_rtc::{
  AB18X5, Alarm, AlarmRepeat, DateTimeAccess, Datelike, InterruptMode, Out2Select, Timelike,
  SPI_FREQUENCY_HZ,
};
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Spidev, SysfsPin};

/// Seconds between going to sleep and the wake alarm
const WAKE_AFTER_SECS: i64 = 60;

/// Example putting the host to sleep through the RTC power switch,
/// assuming linux environment (such as Raspberry Pi 3+)
/// with the AB18X5 attached to spidev0.0, its nCE pin driven from GPIO 25,
/// and the host supply switched by the PSW/nIRQ2 pin.

fn rtc_err<E: Debug>(e: E) -> anyhow::Error {
  anyhow::anyhow!("RTC error: {:?}", e)
}

// Configure the RTC for power switched sleep with an alarm wakeup
fn initialize_clock<SPI, CS, E, PinE>(rtc: &mut AB18X5<SPI, CS>) -> anyhow::Result<()>
  where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
    E: Debug,
    PinE: Debug,
{
  let mut osc = rtc.get_oscillator_control().map_err(rtc_err)?;
  println!("# retrieved oscillator_control: {:#04x}", u8::from(osc));
  // Run from the RC oscillator, and gate the I/O interface while asleep
  // so floating pins can't corrupt the clock
  osc.set_osel(true);
  osc.set_pwgt(true);
  rtc.set_oscillator_control(osc).map_err(rtc_err)?;

  // hundredths don't tick over on the RC oscillator
  rtc.clear_hundredths().map_err(rtc_err)?;

  let mut control1 = rtc.get_control1().map_err(rtc_err)?;
  control1.set_twelve_hour(false);
  control1.set_pwr2(true);
  rtc.set_control1(control1).map_err(rtc_err)?;

  let mut mask = rtc.get_interrupt_mask().map_err(rtc_err)?;
  mask.set_aie(true);
  mask.set_interrupt_mode(InterruptMode::Level);
  rtc.set_interrupt_mask(mask).map_err(rtc_err)?;

  let mut control2 = rtc.get_control2().map_err(rtc_err)?;
  control2.set_out2_select(Out2Select::Sleep);
  rtc.set_control2(control2).map_err(rtc_err)?;

  Ok(())
}

fn do_psw_sleep<SPI, CS, E, PinE>(rtc: &mut AB18X5<SPI, CS>) -> anyhow::Result<()>
  where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
    E: Debug,
    PinE: Debug,
{
  let now = rtc.datetime().map_err(rtc_err)?;
  let wake_at = now + chrono::Duration::seconds(WAKE_AFTER_SECS);
  println!("# Current Time: {}", now);
  println!("# Wake At: {}", wake_at);

  rtc.check_and_clear_alarm().map_err(rtc_err)?;

  let alarm = Alarm {
    hundredths: 0,
    second: wake_at.second() as u8,
    minute: wake_at.minute() as u8,
    hour: wake_at.hour() as u8,
    day: wake_at.day() as u8,
    month: wake_at.month() as u8,
    weekday: wake_at.weekday().num_days_from_sunday() as u8,
  };
  rtc.set_alarm(&alarm, AlarmRepeat::OncePerDay).map_err(rtc_err)?;

  let mut out = String::new();
  rtc.hex_dump(&mut out).map_err(rtc_err)?;
  print!("{}", out);
  spin_sleep::sleep(Duration::from_millis(100));

  // SLTO = 1 gives the host about 8 ms after SLP before the power switch opens
  rtc.sleep(1).map_err(rtc_err)?;
  println!("Sleep Sent");
  spin_sleep::sleep(Duration::from_secs(3));
  Ok(())
}

fn main() -> anyhow::Result<()> {
  let mut spi = Spidev::open("/dev/spidev0.0")?;
  let options = SpidevOptions::new()
    .bits_per_word(8)
    .max_speed_hz(SPI_FREQUENCY_HZ)
    .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
    .build();
  spi.configure(&options)?;

  let cs = SysfsPin::new(25);
  cs.export()?;
  cs.set_direction(Direction::High)?;

  let mut rtc = AB18X5::new(spi, cs).map_err(rtc_err)?;
  let id = rtc.id();
  println!("# Found: AB{}{:02}", id.part_upper, id.part_lower);

  initialize_clock(&mut rtc)?;
  spin_sleep::sleep(Duration::from_secs(1));

  do_psw_sleep(&mut rtc)
}
