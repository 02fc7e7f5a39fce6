extern crate ab18x5_rtc;

use ab18x5_rtc::{AB18X5, SPI_FREQUENCY_HZ};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Spidev, SysfsPin};

/// Example dumping every RTC register,
/// assuming linux environment (such as Raspberry Pi 3+)
/// with the AB18X5 attached to spidev0.0.
/// Chip select is driven from GPIO 25 (physical pin 22) rather than CE0,
/// so connect GPIO 25 to the nCE pin of the RTC.
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

  let mut rtc = AB18X5::new(spi, cs)
    .map_err(|e| anyhow::anyhow!("RTC init failed: {:?}", e))?;
  let id = rtc.id();
  println!("# Found: AB{}{:02} rev {}.{}",
           id.part_upper, id.part_lower, id.major_revision(), id.minor_revision());

  let mut out = String::new();
  rtc.hex_dump(&mut out)
    .map_err(|e| anyhow::anyhow!("dump failed: {:?}", e))?;
  print!("{}", out);

  Ok(())
}
