use std::{error::Error, io, io::Write};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    cursor::SetCursorStyle,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;

pub type ChatTerminal<W = io::Stdout> = Terminal<CrosstermBackend<W>>;

pub fn setup_terminal() -> Result<ChatTerminal, Box<dyn Error>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        SetCursorStyle::SteadyBar
    )?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;

    Ok(terminal)
}

pub fn restore_terminal<W: Write>(terminal: &mut ChatTerminal<W>) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Audible error cue: the terminal bell.
pub fn ring_bell<W: Write>(writer: &mut W) -> io::Result<()> {
    execute!(writer, Print('\x07'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_terminal_round_trips_when_available() {
        // Headless CI has no terminal to switch; only check the happy path.
        if let Ok(mut terminal) = setup_terminal() {
            let _ = restore_terminal(&mut terminal);
        }
    }

    #[test]
    fn bell_is_a_single_bel_byte() {
        let mut out = Vec::new();
        ring_bell(&mut out).expect("write to vec");
        assert_eq!(out, b"\x07");
    }
}
