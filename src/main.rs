use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::time::Duration;

use tui_geoguess::app::App;
use tui_geoguess::config::{Args, Config};
use tui_geoguess::interaction::PointerEvent;
use tui_geoguess::{data, ui};

/// Braille pixels moved per pan key press
const PAN_STEP_X: f64 = 20.0;
const PAN_STEP_Y: f64 = 24.0;

fn main() -> Result<()> {
    let config = Config::from_args(Args::parse());
    init_logging(&config)?;
    log::info!("starting with data dir {}", config.data_dir.display());

    let rx = data::spawn_loader(&config)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &config, rx);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}

/// Logs go to a file; the terminal belongs to the map
fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file {}", config.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn terminal_area(terminal: &DefaultTerminal) -> Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

/// Translate terminal mouse input into pointer events on the map
fn handle_mouse(app: &mut App, inner: Rect, mouse: MouseEvent) {
    let at = ui::cell_to_screen(inner, mouse.column, mouse.row);
    let inside = inner.contains((mouse.column, mouse.row).into());

    let event = match mouse.kind {
        MouseEventKind::ScrollUp if inside => PointerEvent::Wheel { at, delta_y: -1.0 },
        MouseEventKind::ScrollDown if inside => PointerEvent::Wheel { at, delta_y: 1.0 },
        MouseEventKind::Down(MouseButton::Left) if inside => PointerEvent::Down(at),
        MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move(at),
        MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up(at),
        _ => return,
    };
    app.pointer(event);
}

fn run(terminal: &mut DefaultTerminal, config: &Config, rx: std::sync::mpsc::Receiver<data::DataEvent>) -> Result<()> {
    let mut inner = ui::map_inner(terminal_area(terminal)?);
    let mut app = App::new(config, inner.width as usize, inner.height as usize);
    app.attach_loader(rx);

    // Main loop
    loop {
        app.poll_background();

        if app.needs_redraw() {
            terminal.draw(|frame| ui::render(frame, &mut app))?;
        }

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(PAN_STEP_X, 0.0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(-PAN_STEP_X, 0.0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0.0, PAN_STEP_Y),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0.0, -PAN_STEP_Y),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_step(true),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_step(false),

                            // Layer toggles
                            KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_cities(),
                            KeyCode::Char('t') | KeyCode::Char('T') => app.toggle_country_labels(),
                            KeyCode::Char('b') | KeyCode::Char('B') => app.toggle_boundaries(),

                            // Game
                            KeyCode::Char('n') | KeyCode::Char('N') => app.new_challenge(),
                            KeyCode::Enter => app.submit_guess(),
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, inner, mouse);
                }
                Event::Resize(width, height) => {
                    inner = ui::map_inner(Rect::new(0, 0, width, height));
                    app.resize(inner.width as usize, inner.height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
