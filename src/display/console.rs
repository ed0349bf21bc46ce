/// Terminal rendition of the character LCD and its backlight
use log::info;
use std::io::{self, Stdout, Write};

use crate::display::{BacklightSink, DisplaySink, HardwareError};

/// Draws the character grid as a framed box on a terminal
///
/// Rows beyond the grid are dropped and long lines are truncated, the same
/// way text runs off the edge of a real HD44780.
pub struct ConsoleDisplay<W = Stdout> {
    out: W,
    columns: usize,
    rows: usize,
}

impl ConsoleDisplay<Stdout> {
    pub fn stdout(columns: usize, rows: usize) -> Result<Self, HardwareError> {
        ConsoleDisplay::new(io::stdout(), columns, rows)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, columns: usize, rows: usize) -> Result<Self, HardwareError> {
        if columns == 0 || rows == 0 {
            return Err(HardwareError::new(
                "display",
                format!("invalid geometry {}x{}", columns, rows),
            ));
        }
        Ok(ConsoleDisplay { out, columns, rows })
    }

    fn border(&self) -> String {
        format!("+{}+", "-".repeat(self.columns))
    }

    /// Fit text into the grid, padding every row to full width
    pub fn layout(&self, text: &str) -> Vec<String> {
        let mut lines: Vec<String> = text
            .split('\n')
            .take(self.rows)
            .map(|line| {
                let mut row: String = line.chars().take(self.columns).collect();
                let width = row.chars().count();
                row.extend(std::iter::repeat(' ').take(self.columns - width));
                row
            })
            .collect();
        while lines.len() < self.rows {
            lines.push(" ".repeat(self.columns));
        }
        lines
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn io_error(e: io::Error) -> HardwareError {
    HardwareError::new("display", e.to_string())
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn clear(&mut self) -> Result<(), HardwareError> {
        writeln!(self.out).map_err(io_error)
    }

    fn write(&mut self, text: &str) -> Result<(), HardwareError> {
        let mut frame = Vec::with_capacity(self.rows + 2);
        frame.push(self.border());
        frame.extend(self.layout(text).into_iter().map(|row| format!("|{}|", row)));
        frame.push(self.border());

        writeln!(self.out, "{}", frame.join("\n")).map_err(io_error)?;
        self.out.flush().map_err(io_error)
    }
}

/// Backlight that only reports its power changes
#[derive(Debug, Default)]
pub struct ConsoleBacklight {
    on: bool,
}

impl ConsoleBacklight {
    #[cfg(test)]
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl BacklightSink for ConsoleBacklight {
    fn set_power(&mut self, on: bool) -> Result<(), HardwareError> {
        if on != self.on {
            info!("Backlight {}", if on { "on" } else { "off" });
        }
        self.on = on;
        Ok(())
    }
}
