//! sitewatch — a terminal dashboard for a site-monitoring backend.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ SyncEvent  ┌──────────┐  draw()  ┌──────────┐
//! │ sync.rs  │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!      ▲                       ▲
//!      │ SyncRequest           │ handle_key_event()
//!      │                  ┌──────────┐
//!      └───────────────── │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`site`** — the two site record types and their category.
//! * **`recency`** — classifies a last-update timestamp into a display bucket.
//! * **`collection`** — shared per-category storage, replaced wholesale on
//!   each refresh.
//! * **`gateway`** — REST client for the backend.
//! * **`sync`** — spawns the coordinator thread that refreshes on a timer and
//!   runs user mutations, one operation at a time.
//! * **`app`** — owns all display state (focus, selection, draft, mode).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations and sync requests.
//! * **`logging`** — file logger setup.
//! * **`main`** — wires everything together: parse args, set up the terminal,
//!   and run the event loop.

mod app;
mod collection;
mod gateway;
mod input;
mod logging;
mod recency;
mod site;
mod sync;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use collection::SiteCollection;
use gateway::HttpSiteGateway;
use sync::Phase;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.  This prevents the common TUI bug where a panic leaves the
/// terminal in a broken state.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.  Without this, a panic inside the event loop would leave
/// raw mode enabled and the alternate screen active.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    install_panic_hook();
    logging::init();

    // -- parse arguments -----------------------------------------------------
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:3000".into());
    log::info!("starting against {base_url}");

    // -- shared collections + sync coordinator -------------------------------
    let notification = SiteCollection::shared();
    let pending = SiteCollection::shared();

    let gateway = HttpSiteGateway::new(base_url)?;
    let (handle, events) = sync::spawn(gateway, Arc::clone(&notification), Arc::clone(&pending))?;
    let requests = handle.requests();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(notification, pending);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any outcomes from the coordinator.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process sync outcomes
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }
        app.busy = handle.phase() != Phase::Idle;

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key, &requests);
            }
        }

        if app.quit {
            break;
        }
    }

    // Restore the terminal before joining the coordinator: an in-flight
    // backend call may take up to its timeout to finish, and the screen
    // should not stay in raw mode while we wait.
    drop(guard);
    drop(requests);
    handle.shutdown();
    log::info!("stopped");
    Ok(())
}
