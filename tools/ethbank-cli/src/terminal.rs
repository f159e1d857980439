use std::io::{self, Write};

use ethbank_client::surface::{InputField, Surface};

/// Prints everything the session reports, one line per update. Event log
/// lines are printed as they arrive, newest last.
pub struct TerminalSurface<W = io::Stdout> {
    out: W,
}

impl TerminalSurface {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::warn!("Failed to write to terminal: {e}");
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn set_status(&mut self, text: &str) {
        self.line(&format!("[status] {text}"));
    }

    fn notify(&mut self, message: &str) {
        self.line(&format!("[!] {message}"));
    }

    fn show_balance(&mut self, text: &str) {
        self.line(text);
    }

    fn prepend_log(&mut self, line: &str) {
        self.line(line);
    }

    fn clear_input(&mut self, field: InputField) {
        tracing::trace!("Input {field:?} consumed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_lines() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.set_status("Connected: 0xabc");
        surface.notify("Deposit successful!");
        surface.show_balance("Balance: 1.5 ETH");
        surface.clear_input(InputField::DepositAmount);

        let printed = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(
            printed,
            "[status] Connected: 0xabc\n[!] Deposit successful!\nBalance: 1.5 ETH\n"
        );
    }
}
