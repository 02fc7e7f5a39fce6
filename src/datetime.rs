//! Conversion between the binary time/alarm structs and the packed BCD
//! register blocks at 0x00 (time) and 0x08 (alarm).

/// Two-digit years on the chip count from this year
pub const EPOCH_YEAR: u16 = 2000;

/// Length of the time block, hundredths through weekday
pub const TIME_BLOCK_LEN: usize = 8;

/// Length of the alarm block, hundredths through weekday (no year)
pub const ALARM_BLOCK_LEN: usize = 7;

// Reserved/control bits share these registers with the numeric value
const SECONDS_MASK: u8 = 0x7F;
const MINUTES_MASK: u8 = 0x7F;
const HOURS_MASK: u8 = 0x3F;
const DATE_MASK: u8 = 0x3F;
const MONTH_MASK: u8 = 0x1F;
const WEEKDAY_MASK: u8 = 0x07;

// Alarm hundredths patterns used with RPT = 7
const TENTHS_PATTERN: u8 = 0xF0;
const HUNDREDTHS_PATTERN: u8 = 0xFF;

/// Width of the RPT field in the countdown control register
const RPT_MAX: u8 = 0b111;

/// Converts a binary value (0..99) to BCD format
pub fn bin_to_bcd(value: u8) -> u8 {
  ((value / 10) << 4) | (value % 10)
}

/// Converts a BCD value to binary format
pub fn bcd_to_bin(value: u8) -> u8 {
  ((value & 0xF0) >> 4) * 10 + (value & 0x0F)
}

/// Contents of the time block, in binary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
  pub hundredths: u8,
  pub second: u8,
  pub minute: u8,
  /// 0..23 in 24-hour mode
  pub hour: u8,
  /// Day of month, 1..31
  pub day: u8,
  /// 1..12
  pub month: u8,
  /// Absolute year, 2000..2099
  pub year: u16,
  /// Day of week, 0..6
  pub weekday: u8,
}

/// Contents of the alarm block, in binary. Same layout as [`Time`] without a year.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
  pub hundredths: u8,
  pub second: u8,
  pub minute: u8,
  pub hour: u8,
  pub day: u8,
  pub month: u8,
  pub weekday: u8,
}

/// How often the alarm fires.
///
/// `Disabled` through `OncePerSecond` map directly onto the RPT field of the
/// countdown control register. `OncePerTenth` and `OncePerHundredth` have no RPT
/// value of their own: they use RPT = 7 together with special patterns in the
/// alarm hundredths register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AlarmRepeat {
  Disabled = 0,
  OncePerYear = 1,
  OncePerMonth = 2,
  OncePerWeek = 3,
  OncePerDay = 4,
  OncePerHour = 5,
  OncePerMinute = 6,
  OncePerSecond = 7,
  OncePerTenth = 8,
  OncePerHundredth = 9,
}

impl AlarmRepeat {
  /// Maps a raw RPT field value onto a repeat mode. Only the low three bits are used.
  pub fn from_rpt(rpt: u8) -> Self {
    match rpt & RPT_MAX {
      0 => AlarmRepeat::Disabled,
      1 => AlarmRepeat::OncePerYear,
      2 => AlarmRepeat::OncePerMonth,
      3 => AlarmRepeat::OncePerWeek,
      4 => AlarmRepeat::OncePerDay,
      5 => AlarmRepeat::OncePerHour,
      6 => AlarmRepeat::OncePerMinute,
      _ => AlarmRepeat::OncePerSecond,
    }
  }

  /// The value this mode places in the RPT field
  pub fn rpt(self) -> u8 {
    match self {
      AlarmRepeat::OncePerTenth | AlarmRepeat::OncePerHundredth => RPT_MAX,
      other => other as u8,
    }
  }
}

/// Decode the 8 byte time block read from 0x00
pub fn decode_time(buf: &[u8; TIME_BLOCK_LEN]) -> Time {
  Time {
    hundredths: bcd_to_bin(buf[0]),
    second: bcd_to_bin(SECONDS_MASK & buf[1]),
    minute: bcd_to_bin(MINUTES_MASK & buf[2]),
    hour: bcd_to_bin(HOURS_MASK & buf[3]),
    day: bcd_to_bin(DATE_MASK & buf[4]),
    month: bcd_to_bin(MONTH_MASK & buf[5]),
    year: EPOCH_YEAR + bcd_to_bin(buf[6]) as u16,
    weekday: bcd_to_bin(WEEKDAY_MASK & buf[7]),
  }
}

/// Encode a time value into the 8 byte block written at 0x00.
/// Only years 2000..=2099 survive: others are clamped to 2000 then reduced modulo 100.
pub fn encode_time(time: &Time) -> [u8; TIME_BLOCK_LEN] {
  let two_digit_year = (time.year.saturating_sub(EPOCH_YEAR) % 100) as u8;
  [
    bin_to_bcd(time.hundredths),
    SECONDS_MASK & bin_to_bcd(time.second),
    MINUTES_MASK & bin_to_bcd(time.minute),
    HOURS_MASK & bin_to_bcd(time.hour),
    DATE_MASK & bin_to_bcd(time.day),
    MONTH_MASK & bin_to_bcd(time.month),
    bin_to_bcd(two_digit_year),
    WEEKDAY_MASK & bin_to_bcd(time.weekday),
  ]
}

/// Encode an alarm into the 7 byte block written at 0x08.
/// Returns the block and the value to place in the RPT field.
pub fn encode_alarm(alarm: &Alarm, repeat: AlarmRepeat) -> ([u8; ALARM_BLOCK_LEN], u8) {
  let mut buf = [
    bin_to_bcd(alarm.hundredths),
    SECONDS_MASK & bin_to_bcd(alarm.second),
    MINUTES_MASK & bin_to_bcd(alarm.minute),
    HOURS_MASK & bin_to_bcd(alarm.hour),
    DATE_MASK & bin_to_bcd(alarm.day),
    MONTH_MASK & bin_to_bcd(alarm.month),
    WEEKDAY_MASK & bin_to_bcd(alarm.weekday),
  ];

  match repeat {
    AlarmRepeat::OncePerTenth => buf[0] |= TENTHS_PATTERN,
    AlarmRepeat::OncePerHundredth => buf[0] = HUNDREDTHS_PATTERN,
    _ => {}
  }

  (buf, repeat.rpt())
}

/// Decode the 7 byte alarm block read from 0x08, given the current RPT field value.
///
/// With RPT = 7 the raw hundredths byte tells apart the three sub-minute modes:
/// 0xFF is once per hundredth, 0xF_ is once per tenth, anything else once per second.
pub fn decode_alarm(buf: &[u8; ALARM_BLOCK_LEN], rpt: u8) -> (Alarm, AlarmRepeat) {
  let raw_hundredths = buf[0];
  let mut repeat = AlarmRepeat::from_rpt(rpt);

  let hundredths = if repeat == AlarmRepeat::OncePerSecond {
    if raw_hundredths == HUNDREDTHS_PATTERN {
      repeat = AlarmRepeat::OncePerHundredth;
      0
    } else if raw_hundredths & 0xF0 == TENTHS_PATTERN {
      repeat = AlarmRepeat::OncePerTenth;
      raw_hundredths & 0x0F
    } else {
      bcd_to_bin(raw_hundredths)
    }
  } else {
    bcd_to_bin(raw_hundredths)
  };

  let alarm = Alarm {
    hundredths,
    second: bcd_to_bin(SECONDS_MASK & buf[1]),
    minute: bcd_to_bin(MINUTES_MASK & buf[2]),
    hour: bcd_to_bin(HOURS_MASK & buf[3]),
    day: bcd_to_bin(DATE_MASK & buf[4]),
    month: bcd_to_bin(MONTH_MASK & buf[5]),
    weekday: bcd_to_bin(WEEKDAY_MASK & buf[6]),
  };

  (alarm, repeat)
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALL_MODES: [AlarmRepeat; 10] = [
    AlarmRepeat::Disabled,
    AlarmRepeat::OncePerYear,
    AlarmRepeat::OncePerMonth,
    AlarmRepeat::OncePerWeek,
    AlarmRepeat::OncePerDay,
    AlarmRepeat::OncePerHour,
    AlarmRepeat::OncePerMinute,
    AlarmRepeat::OncePerSecond,
    AlarmRepeat::OncePerTenth,
    AlarmRepeat::OncePerHundredth,
  ];

  fn sample_time() -> Time {
    Time {
      hundredths: 0,
      second: 45,
      minute: 30,
      hour: 13,
      day: 15,
      month: 6,
      year: 2024,
      weekday: 6,
    }
  }

  #[test]
  fn test_bcd_round_trip() {
    for n in 0..100u8 {
      assert_eq!(bcd_to_bin(bin_to_bcd(n)), n);
    }
    assert_eq!(bin_to_bcd(59), 0x59);
    assert_eq!(bcd_to_bin(0x23), 23);
  }

  #[test]
  fn test_encode_time_wire_layout() {
    let buf = encode_time(&sample_time());
    assert_eq!(buf, [0x00, 0x45, 0x30, 0x13, 0x15, 0x06, 0x24, 0x06]);
  }

  #[test]
  fn test_time_round_trip() {
    let time = sample_time();
    assert_eq!(decode_time(&encode_time(&time)), time);

    let edge = Time {
      hundredths: 99,
      second: 59,
      minute: 59,
      hour: 23,
      day: 31,
      month: 12,
      year: 2099,
      weekday: 0,
    };
    assert_eq!(decode_time(&encode_time(&edge)), edge);
  }

  #[test]
  fn test_decode_time_ignores_control_bits() {
    // OSF-style flags and 12/24 / century bits set in the reserved positions
    let buf = [0x12, 0x80 | 0x34, 0x80 | 0x56, 0xC0 | 0x21, 0xC0 | 0x28, 0xE0 | 0x11, 0x99, 0xF8 | 0x03];
    let time = decode_time(&buf);
    assert_eq!(time.hundredths, 12);
    assert_eq!(time.second, 34);
    assert_eq!(time.minute, 56);
    assert_eq!(time.hour, 21);
    assert_eq!(time.day, 28);
    assert_eq!(time.month, 11);
    assert_eq!(time.year, 2099);
    assert_eq!(time.weekday, 3);
  }

  #[test]
  fn test_encode_time_masks_out_of_range_fields() {
    let mut time = sample_time();
    time.weekday = 0x0F; // only 3 bits belong to the weekday register
    let buf = encode_time(&time);
    assert_eq!(buf[7] & !WEEKDAY_MASK, 0);
    // neighbours are unaffected
    assert_eq!(&buf[..7], &encode_time(&sample_time())[..7]);
  }

  #[test]
  fn test_alarm_repeat_round_trip() {
    let alarm = Alarm {
      hundredths: 0,
      second: 5,
      minute: 4,
      hour: 3,
      day: 2,
      month: 1,
      weekday: 4,
    };
    for mode in ALL_MODES {
      let (buf, rpt) = encode_alarm(&alarm, mode);
      assert!(rpt <= 7);
      let (decoded, decoded_mode) = decode_alarm(&buf, rpt);
      assert_eq!(decoded_mode, mode);
      assert_eq!(decoded.second, alarm.second);
      assert_eq!(decoded.weekday, alarm.weekday);
    }
  }

  #[test]
  fn test_alarm_sub_second_patterns() {
    let alarm = Alarm { hundredths: 7, ..Default::default() };

    let (buf, rpt) = encode_alarm(&alarm, AlarmRepeat::OncePerTenth);
    assert_eq!(rpt, 7);
    assert_eq!(buf[0], 0xF7);
    let (decoded, _) = decode_alarm(&buf, rpt);
    assert_eq!(decoded.hundredths, 7);

    let (buf, rpt) = encode_alarm(&alarm, AlarmRepeat::OncePerHundredth);
    assert_eq!(rpt, 7);
    assert_eq!(buf[0], 0xFF);

    let (buf, rpt) = encode_alarm(&alarm, AlarmRepeat::OncePerSecond);
    assert_eq!(rpt, 7);
    assert_eq!(buf[0], 0x07);
  }

  #[test]
  fn test_hundredths_pattern_only_counts_with_rpt_seven() {
    let buf = [0xFF, 0, 0, 0, 0, 0, 0];
    let (_, mode) = decode_alarm(&buf, 4);
    assert_eq!(mode, AlarmRepeat::OncePerDay);
  }
}
