//! AB18X5 register map and one-byte views of the configuration registers.
//!
//! Bit positions follow the AB18X5 datasheet register descriptions.

use bitfield::bitfield;

// Register addresses
pub const REG_TIME_HUNDREDTHS: u8 = 0x00;
pub const REG_ALARM_HUNDREDTHS: u8 = 0x08;
pub const REG_STATUS: u8 = 0x0F;
pub const REG_CONTROL1: u8 = 0x10;
pub const REG_CONTROL2: u8 = 0x11;
pub const REG_INTERRUPT_MASK: u8 = 0x12;
pub const REG_SQW: u8 = 0x13;
pub const REG_CAL_XT: u8 = 0x14;
pub const REG_CAL_RC_HI: u8 = 0x15;
pub const REG_CAL_RC_LOW: u8 = 0x16;
pub const REG_SLEEP_CONTROL: u8 = 0x17;
pub const REG_COUNTDOWN_CONTROL: u8 = 0x18;
pub const REG_COUNTDOWN_TIMER: u8 = 0x19;
pub const REG_TIMER_INITIAL: u8 = 0x1A;
pub const REG_WATCHDOG: u8 = 0x1B;
pub const REG_OSCILLATOR_CONTROL: u8 = 0x1C;
pub const REG_OSCILLATOR_STATUS: u8 = 0x1D;
pub const REG_CONFIGURATION_KEY: u8 = 0x1F;
pub const REG_TRICKLE: u8 = 0x20;
pub const REG_BREF_CONTROL: u8 = 0x21;
pub const REG_AFCTRL: u8 = 0x26;
pub const REG_BATMODE_IO: u8 = 0x27;
pub const REG_ID0: u8 = 0x28;
pub const REG_ANALOG_STATUS: u8 = 0x2F;
pub const REG_OUTPUT_CONTROL: u8 = 0x30;
pub const REG_EXTENSION_RAM: u8 = 0x3F;

/// ID0 through ID6
pub const ID_BLOCK_LEN: usize = 7;

// Direction bit of the SPI address byte
const WRITE_BIT: u8 = 1 << 7;

/// Address byte for reading from `offset`
pub const fn read_address(offset: u8) -> u8 {
  offset & !WRITE_BIT
}

/// Address byte for writing to `offset`
pub const fn write_address(offset: u8) -> u8 {
  offset | WRITE_BIT
}

/// Values accepted by the configuration key register (0x1F).
/// Each one unlocks a single following write, or triggers an action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConfigurationKey {
  /// Unlocks the next write to the oscillator control register
  OscillatorControl = 0xA1,
  /// Performs a software reset
  SoftwareReset = 0x3C,
  /// Unlocks the next write to the trickle, BREF, AFCTRL, battery-mode I/O
  /// or output control registers
  RegisterControl = 0x9D,
}

/// Autocalibration filter control (0x26) values
pub const AFCTRL_DISABLE: u8 = 0x00;
pub const AFCTRL_ENABLE: u8 = 0xA0;

/// A single byte configuration register
pub trait Register: Copy {
  /// Register offset
  const ADDRESS: u8;

  fn from_bits(bits: u8) -> Self;

  fn bits(self) -> u8;
}

// Address, raw constructor and u8 conversions for a one byte bitfield register
macro_rules! impl_register {
  ($name:ident = $addr:expr) => {
    impl $name {
      pub const fn new(bits: u8) -> Self {
        Self(bits)
      }
    }

    impl Register for $name {
      const ADDRESS: u8 = $addr;

      fn from_bits(bits: u8) -> Self {
        Self(bits)
      }

      fn bits(self) -> u8 {
        self.0
      }
    }

    impl From<u8> for $name {
      fn from(bits: u8) -> Self {
        Self(bits)
      }
    }

    impl From<$name> for u8 {
      fn from(reg: $name) -> u8 {
        reg.0
      }
    }
  };
}

bitfield! {
  /// Status (0x0F). Interrupt flags; cleared by writing 0.
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct Status(u8);
  impl Debug;
  /// External interrupt 1 (EX1)
  pub ex1, set_ex1: 0;
  /// External interrupt 2 (EX2)
  pub ex2, set_ex2: 1;
  /// Alarm match (ALM)
  pub alm, set_alm: 2;
  /// Countdown timer reached zero (TIM)
  pub tim, set_tim: 3;
  /// Battery low (BL)
  pub bl, set_bl: 4;
  /// Watchdog timer triggered (WDT)
  pub wdt, set_wdt: 5;
  /// System is powered from VBAT (BAT)
  pub bat, set_bat: 6;
  /// Century bit (CB)
  pub cb, set_cb: 7;
}
impl_register!(Status = REG_STATUS);

bitfield! {
  /// Control1 (0x10)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct Control1(u8);
  impl Debug;
  /// Write RTC: counter registers are writable when set (WRTC)
  pub wrtc, set_wrtc: 0;
  /// PSW/nIRQ2 pin is a power switch (PWR2)
  pub pwr2, set_pwr2: 1;
  /// Reading status clears its flags (ARST)
  pub arst, set_arst: 2;
  /// nRST polarity (RSP)
  pub rsp, set_rsp: 3;
  /// Static level for FOUT/nIRQ (OUT)
  pub out, set_out: 4;
  /// Static level for PSW/nIRQ2 (OUTB)
  pub outb, set_outb: 5;
  /// 12 hour mode when set, 24 hour mode when clear (12/24)
  pub twelve_hour, set_twelve_hour: 6;
  /// Stop the clock (STOP)
  pub stop, set_stop: 7;
}
impl_register!(Control1 = REG_CONTROL1);

/// FOUT/nIRQ pin function (Control2 OUT1S)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Out1Select {
  /// nIRQ if at least one interrupt is enabled, else OUT
  NirqOrOut = 0,
  /// SQW if SQWE is set, else OUT
  SqwOrOut = 1,
  /// SQW if SQWE is set, else nIRQ if an interrupt is enabled, else OUT
  SqwOrNirqOrOut = 2,
  /// nAIRQ if AIE is set, else OUT
  NairqOrOut = 3,
}

impl Out1Select {
  fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0 => Out1Select::NirqOrOut,
      1 => Out1Select::SqwOrOut,
      2 => Out1Select::SqwOrNirqOrOut,
      _ => Out1Select::NairqOrOut,
    }
  }
}

/// PSW/nIRQ2 pin function (Control2 OUT2S)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Out2Select {
  NirqOrOutb = 0,
  SqwOrOutb = 1,
  Reserved = 2,
  NairqOrOutb = 3,
  TirqOrOutb = 4,
  NtirqOrOutb = 5,
  /// Power switch controlled by sleep
  Sleep = 6,
  Outb = 7,
}

impl Out2Select {
  fn from_bits(bits: u8) -> Self {
    match bits & 0b111 {
      0 => Out2Select::NirqOrOutb,
      1 => Out2Select::SqwOrOutb,
      2 => Out2Select::Reserved,
      3 => Out2Select::NairqOrOutb,
      4 => Out2Select::TirqOrOutb,
      5 => Out2Select::NtirqOrOutb,
      6 => Out2Select::Sleep,
      _ => Out2Select::Outb,
    }
  }
}

bitfield! {
  /// Control2 (0x11)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct Control2(u8);
  impl Debug;
  pub out1s, set_out1s: 1, 0;
  pub out2s, set_out2s: 4, 2;
  /// nEXTR pin is a reset input (RS1E)
  pub rs1e, set_rs1e: 5;
  /// PSW/nIRQ2 is push-pull when set, open drain when clear (OUTPP)
  pub outpp, set_outpp: 7;
}
impl_register!(Control2 = REG_CONTROL2);

impl Control2 {
  pub fn out1_select(&self) -> Out1Select {
    Out1Select::from_bits(self.out1s())
  }

  pub fn set_out1_select(&mut self, select: Out1Select) {
    self.set_out1s(select as u8)
  }

  pub fn out2_select(&self) -> Out2Select {
    Out2Select::from_bits(self.out2s())
  }

  pub fn set_out2_select(&mut self, select: Out2Select) {
    self.set_out2s(select as u8)
  }
}

/// Interrupt output mode (Interrupt Mask IM)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptMode {
  /// Level, held until the flag is cleared
  Level = 0,
  /// 1/8192 s pulse
  Pulse8192 = 1,
  /// 1/64 s pulse
  Pulse64 = 2,
  /// 1/4 s pulse
  Pulse4 = 3,
}

bitfield! {
  /// Interrupt Mask (0x12)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct InterruptMask(u8);
  impl Debug;
  /// External interrupt 1 enable (EX1E)
  pub ex1e, set_ex1e: 0;
  /// External interrupt 2 enable (EX2E)
  pub ex2e, set_ex2e: 1;
  /// Alarm interrupt enable (AIE)
  pub aie, set_aie: 2;
  /// Timer interrupt enable (TIE)
  pub tie, set_tie: 3;
  /// Battery low interrupt enable (BLIE)
  pub blie, set_blie: 4;
  pub im, set_im: 6, 5;
  /// Century enable (CEB)
  pub ceb, set_ceb: 7;
}
impl_register!(InterruptMask = REG_INTERRUPT_MASK);

impl InterruptMask {
  pub fn interrupt_mode(&self) -> InterruptMode {
    match self.im() {
      0 => InterruptMode::Level,
      1 => InterruptMode::Pulse8192,
      2 => InterruptMode::Pulse64,
      _ => InterruptMode::Pulse4,
    }
  }

  pub fn set_interrupt_mode(&mut self, mode: InterruptMode) {
    self.set_im(mode as u8)
  }
}

bitfield! {
  /// Square wave output control (0x13)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct SquareWave(u8);
  impl Debug;
  /// Square wave frequency select (SQFS)
  pub sqfs, set_sqfs: 4, 0;
  /// Square wave output enable (SQWE)
  pub sqwe, set_sqwe: 7;
}
impl_register!(SquareWave = REG_SQW);

bitfield! {
  /// Calibration for the crystal oscillator (0x14)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct CalXt(u8);
  impl Debug;
  /// Calibration offset, two's complement (OFFSETX)
  pub offsetx, set_offsetx: 6, 0;
  /// Calibration mode (CMDX)
  pub cmdx, set_cmdx: 7;
}
impl_register!(CalXt = REG_CAL_XT);

bitfield! {
  /// Calibration for the RC oscillator, upper bits (0x15).
  /// The low byte of the offset lives at 0x16.
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct CalRcHi(u8);
  impl Debug;
  pub offsetr, set_offsetr: 5, 0;
  pub cmdr, set_cmdr: 7, 6;
}
impl_register!(CalRcHi = REG_CAL_RC_HI);

bitfield! {
  /// Sleep control (0x17)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct SleepControl(u8);
  impl Debug;
  /// Delay before entering sleep, in 7.8 ms steps (SLTO)
  pub slto, set_slto: 2, 0;
  /// Sleep state was entered (SLST)
  pub slst, set_slst: 3;
  /// EX1 wakes on rising edge when set (EX1P)
  pub ex1p, set_ex1p: 4;
  /// EX2 wakes on rising edge when set (EX2P)
  pub ex2p, set_ex2p: 5;
  /// Assert nRST while asleep (SLRES)
  pub slres, set_slres: 6;
  /// Request sleep (SLP)
  pub slp, set_slp: 7;
}
impl_register!(SleepControl = REG_SLEEP_CONTROL);

/// Countdown timer clock (Countdown Control TFS)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TimerFrequency {
  Hz4096 = 0,
  Hz64 = 1,
  Hz1 = 2,
  /// 1/60 Hz
  PerMinute = 3,
}

bitfield! {
  /// Countdown timer control (0x18). Also holds the alarm repeat field.
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct CountdownControl(u8);
  impl Debug;
  pub tfs, set_tfs: 1, 0;
  /// Alarm repeat function (RPT)
  pub rpt, set_rpt: 4, 2;
  /// Timer repeat (TRPT)
  pub trpt, set_trpt: 5;
  /// Timer interrupt is a pulse (TM)
  pub tm, set_tm: 6;
  /// Timer enable (TE)
  pub te, set_te: 7;
}
impl_register!(CountdownControl = REG_COUNTDOWN_CONTROL);

impl CountdownControl {
  pub fn timer_frequency(&self) -> TimerFrequency {
    match self.tfs() {
      0 => TimerFrequency::Hz4096,
      1 => TimerFrequency::Hz64,
      2 => TimerFrequency::Hz1,
      _ => TimerFrequency::PerMinute,
    }
  }

  pub fn set_timer_frequency(&mut self, frequency: TimerFrequency) {
    self.set_tfs(frequency as u8)
  }
}

/// Watchdog clock (Watchdog WRB)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WatchdogFrequency {
  Hz16 = 0b00,
  Hz4 = 0b01,
  Hz1 = 0b10,
  /// 1/4 Hz
  QuarterHz = 0b11,
}

bitfield! {
  /// Watchdog timer (0x1B)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct Watchdog(u8);
  impl Debug;
  pub wrb, set_wrb: 1, 0;
  /// Watchdog period in WRB clock cycles (BMB)
  pub bmb, set_bmb: 6, 2;
  /// Reset instead of interrupt on timeout (WDS)
  pub wds, set_wds: 7;
}
impl_register!(Watchdog = REG_WATCHDOG);

impl Watchdog {
  pub fn frequency(&self) -> WatchdogFrequency {
    match self.wrb() {
      0b00 => WatchdogFrequency::Hz16,
      0b01 => WatchdogFrequency::Hz4,
      0b10 => WatchdogFrequency::Hz1,
      _ => WatchdogFrequency::QuarterHz,
    }
  }

  pub fn set_frequency(&mut self, frequency: WatchdogFrequency) {
    self.set_wrb(frequency as u8)
  }
}

bitfield! {
  /// Oscillator control (0x1C). Writes need the 0xA1 configuration key first.
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct OscillatorControl(u8);
  impl Debug;
  /// Autocalibration fail interrupt enable (ACIE)
  pub acie, set_acie: 0;
  /// Oscillator fail interrupt enable (OFIE)
  pub ofie, set_ofie: 1;
  /// Gate the I/O interface while asleep (PWGT)
  pub pwgt, set_pwgt: 2;
  /// Switch to RC on crystal failure (FOS)
  pub fos, set_fos: 3;
  /// Switch to RC when on battery (AOS)
  pub aos, set_aos: 4;
  /// Autocalibration mode (ACAL)
  pub acal, set_acal: 6, 5;
  /// Use the RC oscillator instead of the crystal (OSEL)
  pub osel, set_osel: 7;
}
impl_register!(OscillatorControl = REG_OSCILLATOR_CONTROL);

bitfield! {
  /// Oscillator status (0x1D)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct OscillatorStatus(u8);
  impl Debug;
  /// Autocalibration failed (ACF)
  pub acf, set_acf: 0;
  /// Oscillator failed (OF)
  pub of, set_of: 1;
  /// Running from the RC oscillator (OMODE)
  pub omode, _: 4;
  /// Lock OUT2 (LKO2)
  pub lko2, set_lko2: 5;
  /// Crystal calibration extension (XTCAL)
  pub xtcal, set_xtcal: 7, 6;
}
impl_register!(OscillatorStatus = REG_OSCILLATOR_STATUS);

/// Trickle charger diode selection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TrickleDiode {
  Disabled = 0b00,
  /// 0.3 V schottky diode
  Schottky = 0b01,
  /// 0.6 V standard diode
  Standard = 0b10,
}

/// Trickle charger output resistor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TrickleResistor {
  Disabled = 0b00,
  R3k = 0b01,
  R6k = 0b10,
  R11k = 0b11,
}

/// TCS value which enables the trickle charger
const TRICKLE_ENABLE: u8 = 0b1010;

bitfield! {
  /// Trickle charger (0x20)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct Trickle(u8);
  impl Debug;
  pub rout, set_rout: 1, 0;
  pub diode_bits, set_diode_bits: 3, 2;
  pub tcs, set_tcs: 7, 4;
}
impl_register!(Trickle = REG_TRICKLE);

impl Trickle {
  /// Charging is enabled only with the exact TCS pattern 0b1010
  pub fn enabled(&self) -> bool {
    self.tcs() == TRICKLE_ENABLE
  }

  pub fn set_enabled(&mut self, enable: bool) {
    self.set_tcs(if enable { TRICKLE_ENABLE } else { 0 })
  }

  /// `None` for the unassigned diode pattern
  pub fn diode(&self) -> Option<TrickleDiode> {
    match self.diode_bits() {
      0b00 => Some(TrickleDiode::Disabled),
      0b01 => Some(TrickleDiode::Schottky),
      0b10 => Some(TrickleDiode::Standard),
      _ => None,
    }
  }

  pub fn set_diode(&mut self, diode: TrickleDiode) {
    self.set_diode_bits(diode as u8)
  }

  pub fn resistor(&self) -> TrickleResistor {
    match self.rout() {
      0b00 => TrickleResistor::Disabled,
      0b01 => TrickleResistor::R3k,
      0b10 => TrickleResistor::R6k,
      _ => TrickleResistor::R11k,
    }
  }

  pub fn set_resistor(&mut self, resistor: TrickleResistor) {
    self.set_rout(resistor as u8)
  }
}

/// Battery reference voltage, falling/rising thresholds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BatteryReference {
  /// 2.5 V / 3.0 V
  V2_5 = 0b0111,
  /// 2.1 V / 2.5 V
  V2_1 = 0b1011,
  /// 1.8 V / 2.2 V
  V1_8 = 0b1101,
  /// 1.4 V / 1.6 V
  V1_4 = 0b1111,
}

bitfield! {
  /// Battery reference control (0x21)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct BrefControl(u8);
  impl Debug;
  pub bref, set_bref: 7, 4;
}
impl_register!(BrefControl = REG_BREF_CONTROL);

impl BrefControl {
  /// `None` if BREF holds one of the unassigned patterns
  pub fn reference(&self) -> Option<BatteryReference> {
    match self.bref() {
      0b0111 => Some(BatteryReference::V2_5),
      0b1011 => Some(BatteryReference::V2_1),
      0b1101 => Some(BatteryReference::V1_8),
      0b1111 => Some(BatteryReference::V1_4),
      _ => None,
    }
  }

  pub fn set_reference(&mut self, reference: BatteryReference) {
    self.set_bref(reference as u8)
  }
}

bitfield! {
  /// Battery-mode I/O (0x27). Writes need the 0x9D configuration key first.
  /// Bits 6:0 are reserved and must be written as zero.
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct BatteryModeIo(u8);
  impl Debug;
  /// Keep the I/O interface enabled when on battery (IOBM)
  pub iobm, set_iobm: 7;
}
impl_register!(BatteryModeIo = REG_BATMODE_IO);

impl BatteryModeIo {
  /// Only the IOBM bit set
  pub const ENABLED: BatteryModeIo = BatteryModeIo(1 << 7);
  pub const DISABLED: BatteryModeIo = BatteryModeIo(0);
}

bitfield! {
  /// Analog status (0x2F), read only
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct AnalogStatus(u8);
  impl Debug;
  /// VCC is above the minimum operating voltage (VINIT)
  pub vinit, _: 1;
  /// VBAT is above the brownout threshold (BBOD)
  pub bbod, _: 6;
  /// VBAT is above the BREF threshold (BREFD)
  pub brefd, _: 7;
}
impl_register!(AnalogStatus = REG_ANALOG_STATUS);

bitfield! {
  /// Output control (0x30)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct OutputControl(u8);
  impl Debug;
  /// FOUT/nIRQ enabled while asleep (O1EN)
  pub o1en, set_o1en: 0;
  /// nIRQ2/PSW enabled while asleep (O3EN)
  pub o3en, set_o3en: 1;
  /// CLKOUT/nIRQ3 enabled while asleep (O4EN)
  pub o4en, set_o4en: 2;
  /// nRST enabled while asleep (RSEN)
  pub rsen, set_rsen: 3;
  /// EXTI disabled while asleep (EXDS)
  pub exds, set_exds: 4;
  /// WDI disabled while asleep (WDDS)
  pub wdds, set_wdds: 5;
  /// EXTI disabled when on battery (EXBM)
  pub exbm, set_exbm: 6;
  /// WDI disabled when on battery (WDBM)
  pub wdbm, set_wdbm: 7;
}
impl_register!(OutputControl = REG_OUTPUT_CONTROL);

bitfield! {
  /// Extension RAM address (0x3F)
  #[derive(Copy, Clone, Default, PartialEq, Eq)]
  #[cfg_attr(feature = "defmt", derive(defmt::Format))]
  pub struct ExtensionRam(u8);
  impl Debug;
  /// Upper bits of the standard RAM address (XADS)
  pub xads, set_xads: 1, 0;
  /// Upper bit of the alternate RAM address (XADA)
  pub xada, set_xada: 2;
  /// EXTI pin level (EXIN)
  pub exin, _: 4;
  /// WDI pin level (WDIN)
  pub wdin, _: 5;
  /// Battery switch polarity (BPOL)
  pub bpol, set_bpol: 6;
  /// CLKOUT/nIRQ3 enabled when on battery (O4BM)
  pub o4bm, set_o4bm: 7;
}
impl_register!(ExtensionRam = REG_EXTENSION_RAM);

/// Decoded identification block (0x28..=0x2E)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identification {
  /// Upper part number digits, 18 for every AB18X5
  pub part_upper: u8,
  /// Lower part number digits: 4, 5, 14 or 15
  pub part_lower: u8,
  /// Raw revision byte, see `major_revision` and `minor_revision`
  pub revision: u8,
  pub lot: u8,
  pub unique_lot: u8,
  pub wafer_upper: u8,
  pub wafer_lower: u8,
}

impl Identification {
  pub fn from_bytes(buf: &[u8; ID_BLOCK_LEN]) -> Self {
    use crate::datetime::bcd_to_bin;
    Identification {
      part_upper: bcd_to_bin(buf[0]),
      part_lower: bcd_to_bin(buf[1]),
      revision: buf[2],
      lot: bcd_to_bin(buf[3]),
      unique_lot: bcd_to_bin(buf[4]),
      wafer_upper: bcd_to_bin(buf[5]),
      wafer_lower: bcd_to_bin(buf[6]),
    }
  }

  pub fn major_revision(&self) -> u8 {
    self.revision >> 3
  }

  pub fn minor_revision(&self) -> u8 {
    self.revision & 0b111
  }

  /// True for AB1804, AB1805, AB1814 and AB1815 parts
  pub fn is_supported(&self) -> bool {
    self.part_upper == 18 && matches!(self.part_lower, 4 | 5 | 14 | 15)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_direction_bit() {
    assert_eq!(read_address(REG_STATUS), 0x0F);
    assert_eq!(write_address(REG_STATUS), 0x8F);
    assert_eq!(read_address(0xFF), 0x7F);
  }

  #[test]
  fn test_status_bits() {
    let status = Status::new(0b0000_0100);
    assert!(status.alm());
    assert!(!status.tim());
    let mut cleared = status;
    cleared.set_alm(false);
    cleared.set_cb(true);
    assert_eq!(cleared.bits(), 0b1000_0000);
  }

  #[test]
  fn test_field_does_not_touch_neighbours() {
    let mut ctdwn = CountdownControl::new(0xFF);
    ctdwn.set_rpt(0b010);
    assert_eq!(ctdwn.bits(), 0b1110_1011);
    assert_eq!(ctdwn.rpt(), 0b010);

    // oversized values are truncated to the field width
    let mut ctdwn = CountdownControl::new(0);
    ctdwn.set_rpt(0xFF);
    assert_eq!(ctdwn.bits(), 0b0001_1100);
  }

  #[test]
  fn test_control2_pin_selects() {
    let mut control2 = Control2::default();
    control2.set_out2_select(Out2Select::Sleep);
    control2.set_out1_select(Out1Select::NairqOrOut);
    assert_eq!(control2.bits(), 0b0001_1011);
    assert_eq!(control2.out2_select(), Out2Select::Sleep);
    assert_eq!(control2.out1_select(), Out1Select::NairqOrOut);
  }

  #[test]
  fn test_interrupt_mask_mode() {
    let mut mask = InterruptMask::default();
    mask.set_aie(true);
    mask.set_interrupt_mode(InterruptMode::Pulse4);
    assert_eq!(mask.bits(), 0b0110_0100);
    assert_eq!(mask.interrupt_mode(), InterruptMode::Pulse4);
  }

  #[test]
  fn test_oscillator_control_bits() {
    let mut osc = OscillatorControl::default();
    osc.set_osel(true);
    osc.set_pwgt(true);
    assert_eq!(osc.bits(), 0b1000_0100);
    osc.set_acal(0b11);
    assert_eq!(osc.bits(), 0b1110_0100);
  }

  #[test]
  fn test_trickle() {
    let mut trickle = Trickle::default();
    trickle.set_enabled(true);
    trickle.set_diode(TrickleDiode::Schottky);
    trickle.set_resistor(TrickleResistor::R3k);
    assert_eq!(trickle.bits(), 0b1010_0101);
    assert!(trickle.enabled());
    assert_eq!(Trickle::new(0b0011_1100).diode(), None);
    assert!(!Trickle::new(0b1011_0000).enabled());
  }

  #[test]
  fn test_output_control_sleep_disables() {
    let mut output = OutputControl::default();
    output.set_exds(true);
    assert_eq!(output.bits(), 0b0001_0000);
    output.set_wdds(true);
    assert_eq!(output.bits(), 0b0011_0000);
    assert!(OutputControl::new(0b0010_0000).wdds());
    assert!(!OutputControl::new(0b0010_0000).exds());
  }

  #[test]
  fn test_battery_reference() {
    let mut bref = BrefControl::default();
    bref.set_reference(BatteryReference::V2_1);
    assert_eq!(bref.bits(), 0b1011_0000);
    assert_eq!(BrefControl::new(0xF0).reference(), Some(BatteryReference::V1_4));
    assert_eq!(BrefControl::new(0x00).reference(), None);
  }

  #[test]
  fn test_watchdog_fields() {
    let mut wdt = Watchdog::default();
    wdt.set_wds(true);
    wdt.set_bmb(31);
    wdt.set_frequency(WatchdogFrequency::QuarterHz);
    assert_eq!(wdt.bits(), 0xFF);
    assert_eq!(wdt.frequency(), WatchdogFrequency::QuarterHz);
  }

  #[test]
  fn test_identification() {
    let id = Identification::from_bytes(&[0x18, 0x15, 0b0001_1010, 0x01, 0x02, 0x03, 0x04]);
    assert_eq!(id.part_upper, 18);
    assert_eq!(id.part_lower, 15);
    assert_eq!(id.major_revision(), 3);
    assert_eq!(id.minor_revision(), 2);
    assert!(id.is_supported());

    for lower in [0x04, 0x05, 0x14] {
      assert!(Identification::from_bytes(&[0x18, lower, 0, 0, 0, 0, 0]).is_supported());
    }
    assert!(!Identification::from_bytes(&[0x18, 0x03, 0, 0, 0, 0, 0]).is_supported());
    assert!(!Identification::from_bytes(&[0x17, 0x05, 0, 0, 0, 0, 0]).is_supported());
  }
}
