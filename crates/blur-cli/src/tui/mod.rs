pub mod events;
pub mod state;
pub mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::CliError;
use events::handle_key;
use state::TablePicker;
use ui::draw_picker;

/// Let the operator choose among `candidates` on the terminal.
///
/// Returns the chosen tables in list order, or `None` when the picker was
/// cancelled.
pub fn pick_tables(candidates: &[String]) -> Result<Option<Vec<String>>, CliError> {
    let mut picker = TablePicker::new(candidates);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut picker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| picker.selection())
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    picker: &mut TablePicker,
) -> Result<(), CliError> {
    while !picker.is_done() {
        terminal.draw(|frame| draw_picker(frame, picker))?;

        if event::poll(Duration::from_millis(250))? {
            if let event::Event::Key(key) = event::read()? {
                handle_key(picker, key);
            }
        }
    }
    Ok(())
}
