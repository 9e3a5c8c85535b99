use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use techgrid_core::data::DetectionSource;
use techgrid_core::presence::PresenceTable;

pub mod grid;

pub use grid::{DetailKind, PresenceGrid};

/// Run the presence grid until the user quits. Blocks the calling thread.
pub fn run<S: DetectionSource + ?Sized>(source: &S, table: PresenceTable) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut grid = PresenceGrid::new(table);
    let result = event_loop(&mut terminal, &mut grid, source);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend, S: DetectionSource + ?Sized>(
    terminal: &mut Terminal<B>,
    grid: &mut PresenceGrid,
    source: &S,
) -> Result<()> {
    loop {
        terminal.draw(|f| grid.render(f))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && grid.handle_key(key, source)
        {
            break;
        }
    }
    Ok(())
}
