//! Terminal implementations of the reporting and confirmation seams.

use std::io::{self, BufRead, IsTerminal, Stderr, StdinLock, Stdout, Write};

use compose_batch_core::error::{Error, Result};
use compose_batch_core::interaction::{is_affirmative, Confirmer, ReportLevel, Reporter};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use log::warn;

fn level_color(level: ReportLevel) -> Color {
    match level {
        ReportLevel::Info => Color::Blue,
        ReportLevel::Success => Color::Green,
        ReportLevel::Warning => Color::Yellow,
        ReportLevel::Error => Color::Red,
    }
}

/// Prints reports one per line, colored by level when writing to a terminal.
pub struct ConsoleReporter<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_report(&mut self, level: ReportLevel, message: &str) -> io::Result<()> {
        if self.colored {
            queue!(
                self.out,
                SetForegroundColor(level_color(level)),
                Print(message),
                ResetColor,
                Print("\n")
            )?;
        } else {
            writeln!(self.out, "{message}")?;
        }
        self.out.flush()
    }
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let colored = out.is_terminal();
        Self::new(out, colored)
    }
}

impl ConsoleReporter<Stderr> {
    pub fn stderr() -> Self {
        let out = io::stderr();
        let colored = out.is_terminal();
        Self::new(out, colored)
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, level: ReportLevel, message: &str) {
        // Reporting must never change the outcome of a run
        if let Err(e) = self.write_report(level, message) {
            warn!("Could not write {level} report: {e}");
        }
    }
}

/// Asks yes/no questions on one stream and reads single-line answers from
/// another. Only `y` (any case) counts as yes; end of input counts as no.
pub struct LineConfirmer<R: BufRead, W: Write> {
    input: R,
    output: W,
}

pub type StdinConfirmer = LineConfirmer<StdinLock<'static>, Stdout>;

impl<R: BufRead, W: Write> LineConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl StdinConfirmer {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirmer for LineConfirmer<R, W> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        write!(self.output, "{message} [y/N]: ").map_err(Error::Stdio)?;
        self.output.flush().map_err(Error::Stdio)?;

        let mut input = String::new();
        let read = self.input.read_line(&mut input).map_err(Error::Stdio)?;

        if read == 0 {
            // Keep the next report off the prompt line
            writeln!(self.output).map_err(Error::Stdio)?;
        }

        Ok(is_affirmative(&input))
    }
}
