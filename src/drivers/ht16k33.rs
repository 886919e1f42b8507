//! HT16K33 4-character 14-segment display over I2C.
//!
//! The controller hands this driver a float; the driver formats it to
//! fit the four character cells (one decimal when it fits, integer
//! otherwise, `----` when nothing fits), maps characters through a
//! 14-segment font, and merges each decimal point into the preceding
//! cell's DP segment — so `21.5` occupies three cells, not four.
//!
//! Generic over any [`embedded_hal::i2c::I2c`] bus.

use core::fmt::Write as _;

use embedded_hal::i2c::I2c;
use heapless::String;
use log::debug;

use crate::app::ports::DisplayPort;
use crate::error::IoError;

/// System setup command: low bit starts the internal oscillator.
const CMD_SYSTEM_SETUP: u8 = 0x20;
/// Display setup command: low bit switches the LED drivers on.
const CMD_DISPLAY_SETUP: u8 = 0x80;
/// Dimming command: low nibble is the duty level (0-15).
const CMD_BRIGHTNESS: u8 = 0xE0;

/// Character cells on the display.
const CELLS: usize = 4;
/// Decimal-point segment, OR-ed into the preceding cell.
const SEG_DOT: u16 = 1 << 14;

/// An open HT16K33 on one I2C bus.
pub struct AlphaDisplay<I2C> {
    i2c: I2C,
    addr: u8,
    brightness: u8,
    buffer: [u16; CELLS],
    closed: bool,
}

impl<I2C: I2c> AlphaDisplay<I2C> {
    /// Wrap a bus without touching the device; the first commands go out
    /// on `set_enabled(true)`.
    pub fn new(i2c: I2C, addr: u8, brightness: u8) -> Self {
        Self {
            i2c,
            addr,
            brightness: brightness.min(15),
            buffer: [0; CELLS],
            closed: false,
        }
    }

    fn command(&mut self, cmd: u8) -> Result<(), IoError> {
        self.i2c.write(self.addr, &[cmd]).map_err(|e| {
            debug!("display command 0x{cmd:02X} error: {e:?}");
            IoError::Write
        })
    }

    /// Push the cell buffer to display RAM (address 0x00 onwards).
    fn flush(&mut self) -> Result<(), IoError> {
        let mut frame = [0u8; 1 + CELLS * 2];
        for (i, cell) in self.buffer.iter().enumerate() {
            let [lo, hi] = cell.to_le_bytes();
            frame[1 + i * 2] = lo;
            frame[2 + i * 2] = hi;
        }
        self.i2c.write(self.addr, &frame).map_err(|e| {
            debug!("display flush error: {e:?}");
            IoError::Write
        })
    }
}

impl<I2C: I2c> DisplayPort for AlphaDisplay<I2C> {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        if enabled {
            self.command(CMD_SYSTEM_SETUP | 0x01)?;
            self.command(CMD_DISPLAY_SETUP | 0x01)?;
            self.command(CMD_BRIGHTNESS | self.brightness)
        } else {
            self.command(CMD_DISPLAY_SETUP)?;
            self.command(CMD_SYSTEM_SETUP)
        }
    }

    fn show(&mut self, value: f32) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        self.buffer = frame_for(value);
        self.flush()
    }

    fn clear(&mut self) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        self.buffer = [0; CELLS];
        self.flush()
    }

    fn close(&mut self) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        // LED drivers off, oscillator to standby.
        let parked = self
            .command(CMD_DISPLAY_SETUP)
            .and_then(|()| self.command(CMD_SYSTEM_SETUP));
        self.closed = true;
        parked
    }
}

// ═══════════════════════════════════════════════════════════════
//  Formatting (pure, bus-free)
// ═══════════════════════════════════════════════════════════════

/// Render `value` into the four cell bitmaps.
pub(crate) fn frame_for(value: f32) -> [u16; CELLS] {
    let text = format_value(value);
    let mut cells = [0u16; CELLS];
    let mut i = 0;
    for c in text.chars() {
        if c == '.' {
            if i > 0 {
                cells[i - 1] |= SEG_DOT;
            }
            continue;
        }
        if i >= CELLS {
            break;
        }
        cells[i] = glyph(c);
        i += 1;
    }
    cells
}

/// Format with one decimal when that fits the four cells (the decimal
/// point shares a cell), whole degrees otherwise, dashes as a last
/// resort.
fn format_value(value: f32) -> String<16> {
    let mut s: String<16> = String::new();
    if write!(s, "{value:.1}").is_ok() && cell_width(&s) <= CELLS {
        return s;
    }
    s.clear();
    if write!(s, "{value:.0}").is_ok() && cell_width(&s) <= CELLS {
        return s;
    }
    s.clear();
    let _ = s.push_str("----");
    s
}

/// Cells a string occupies: every character except the merged dots.
fn cell_width(s: &str) -> usize {
    s.chars().filter(|&c| c != '.').count()
}

/// 14-segment bitmaps. Unknown characters render blank.
fn glyph(c: char) -> u16 {
    match c {
        '0' => 0x0C3F,
        '1' => 0x0006,
        '2' => 0x00DB,
        '3' => 0x008F,
        '4' => 0x00E6,
        '5' => 0x00ED,
        '6' => 0x00FD,
        '7' => 0x1401,
        '8' => 0x00FF,
        '9' => 0x00E7,
        '-' => 0x00C0,
        _ => 0x0000,
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
