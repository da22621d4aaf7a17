use crate::app::App;
use crate::canvas::{BrailleCanvas, BrailleSurface, Ink, TextCell};
use crate::game::ChallengeState;
use crate::geo::ScreenPoint;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

const PANEL_WIDTH: u16 = 34;

/// Screen regions: map block, side panel, status bar
pub struct AppLayout {
    pub map: Rect,
    pub panel: Rect,
    pub status: Rect,
}

pub fn layout(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map + panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(PANEL_WIDTH)])
        .split(rows[0]);
    AppLayout {
        map: cols[0],
        panel: cols[1],
        status: rows[1],
    }
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " World Map ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Character area the braille map is drawn into
pub fn map_inner(area: Rect) -> Rect {
    map_block().inner(layout(area).map)
}

/// Terminal cell to braille pixel coordinates relative to the map area.
/// Cells outside the area map to negative or out-of-range pixels.
pub fn cell_to_screen(inner: Rect, col: u16, row: u16) -> ScreenPoint {
    let dx = col as f64 - inner.x as f64;
    let dy = row as f64 - inner.y as f64;
    ScreenPoint::new(dx * 2.0, dy * 4.0)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let regions = layout(frame.area());

    render_map(frame, app, regions.map);
    render_panel(frame, app, regions.panel);
    render_status_bar(frame, app, regions.status);
}

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let surface = app.surface();
    if surface.cols() != inner.width as usize || surface.rows() != inner.height as usize {
        app.resize(inner.width as usize, inner.height as usize);
    }
    let surface = app.render_map();
    frame.render_widget(MapWidget { surface }, inner);
}

fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::BaseMap => Color::DarkGray,
        Ink::Boundary => Color::Cyan,
        Ink::CityDot => Color::White,
        Ink::CityLabel => Color::White,
        Ink::CountryLabel => Color::Yellow,
        Ink::GuessMarker => Color::LightBlue,
        Ink::AnswerMarker => Color::LightRed,
        Ink::Connector => Color::Red,
    }
}

/// Braille layers with their text overlaid, back to front
struct MapWidget<'a> {
    surface: &'a BrailleSurface,
}

impl MapWidget<'_> {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }

    fn render_text(&self, cell: &TextCell, style: Style, area: Rect, buf: &mut Buffer) {
        if cell.row < 0 || cell.row >= area.height as i32 {
            return;
        }
        let y = area.y + cell.row as u16;
        for (i, ch) in cell.text.chars().enumerate() {
            let col = cell.col + i as i32;
            if col < 0 {
                continue;
            }
            if col >= area.width as i32 {
                break;
            }
            buf[(area.x + col as u16, y)].set_char(ch).set_style(style);
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for ink in Ink::ALL {
            let color = ink_color(ink);
            self.render_layer(self.surface.layer(ink), color, area, buf);
            let style = match ink {
                Ink::CountryLabel => Style::default().fg(color).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(color),
            };
            for cell in self.surface.texts(ink) {
                self.render_text(cell, style, area, buf);
            }
        }
    }
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Challenge ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let dim = Style::default().fg(Color::DarkGray);
    let game = &app.game;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Round ", dim),
            Span::styled(
                format!("{}/{}", game.round(), game.max_rounds),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled("  Score ", dim),
            Span::styled(game.total_score().to_string(), Style::default().fg(Color::Green)),
        ]),
        Line::default(),
    ];

    match game.challenge() {
        ChallengeState::Empty => {
            lines.push(Line::styled("[ No image ]", dim));
            lines.push(Line::styled("Press n for a new city", dim));
        }
        ChallengeState::Pending => {
            lines.push(Line::styled("[ Generating… ]", Style::default().fg(Color::Magenta)));
        }
        ChallengeState::Ready(challenge) => {
            lines.push(Line::from(vec![
                Span::styled("Photo: ", dim),
                Span::raw(challenge.image.clone()),
            ]));
            if game.can_submit() {
                lines.push(Line::styled("Click the map, Enter to guess", dim));
            }
        }
    }

    if let Some(result) = game.last_result() {
        let c = &result.challenge;
        lines.push(Line::default());
        lines.push(Line::styled(
            c.city.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::styled(
            c.country.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
        lines.push(Line::styled(format!("Lat {:.2}, Lon {:.2}", c.latitude, c.longitude), dim));
        lines.push(Line::from(vec![
            Span::styled("Distance ", dim),
            Span::styled(format!("{:.2} km", result.distance_km), Style::default().fg(Color::Cyan)),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("Round {}/{}: ", result.round, game.max_rounds), dim),
            Span::styled(format!("+{}", result.points), Style::default().fg(Color::Green)),
            Span::styled(format!("  total {}", result.total_score), dim),
        ]));
        if game.is_finished() {
            lines.push(Line::default());
            lines.push(Line::styled(
                format!("Game over! Final score: {}", result.total_score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::styled("Press n to play again", dim));
        }
    }

    if let Some(notice) = &app.notice {
        lines.push(Line::default());
        lines.push(Line::styled(notice.clone(), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn toggle_span(on: bool, on_label: &'static str, off_label: &'static str) -> Span<'static> {
    Span::styled(
        if on { on_label } else { off_label },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        toggle_span(settings.show_cities, "[C]ities ", "[c]ities "),
        toggle_span(settings.show_country_labels, "[T]countries ", "[t]countries "),
        toggle_span(settings.show_boundaries, "[B]orders ", "[b]orders "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.selection_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | n:new city enter:guess hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::DataEvent;
    use crate::game::{Challenge, Haversine};
    use crate::geo::GeoPoint;
    use crate::map::BoundaryFeature;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_layout_partitions_area() {
        let area = Rect::new(0, 0, 120, 40);
        let regions = layout(area);
        assert_eq!(regions.status.height, 1);
        assert_eq!(regions.panel.width, PANEL_WIDTH);
        assert_eq!(regions.map.width + regions.panel.width, 120);
        let inner = map_inner(area);
        assert_eq!(inner.width, regions.map.width - 2);
        assert_eq!(inner.height, regions.map.height - 2);
    }

    #[test]
    fn test_cell_to_screen() {
        let inner = Rect::new(1, 1, 80, 30);
        assert_eq!(cell_to_screen(inner, 1, 1), ScreenPoint::new(0.0, 0.0));
        assert_eq!(cell_to_screen(inner, 11, 6), ScreenPoint::new(20.0, 20.0));
        assert_eq!(cell_to_screen(inner, 0, 0), ScreenPoint::new(-2.0, -4.0));
    }

    #[test]
    fn test_render_draws_map_and_panel() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let inner = map_inner(Rect::new(0, 0, 120, 40));
        let mut app = App::new(&Config::default(), inner.width as usize, inner.height as usize);
        let square = [(-60.0, -30.0), (60.0, -30.0), (60.0, 30.0), (-60.0, 30.0), (-60.0, -30.0)];
        let ring = square.iter().map(|&(lon, lat)| GeoPoint::new(lat, lon)).collect();
        app.apply_data(DataEvent::Boundaries(vec![BoundaryFeature { rings: vec![ring] }]));

        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        assert!(!app.needs_redraw());

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("World Map"));
        assert!(text.contains("No image"));
        assert!(text.chars().any(|ch| ('\u{2801}'..='\u{28FF}').contains(&ch)));
    }

    #[test]
    fn test_result_overlay_rounds_coordinates() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let inner = map_inner(Rect::new(0, 0, 120, 40));
        let mut app = App::new(&Config::default(), inner.width as usize, inner.height as usize);
        app.game.begin_challenge();
        app.game.challenge_arrived(Challenge {
            city: "Paris".into(),
            country: "France".into(),
            latitude: 48.8566,
            longitude: 2.3522,
            image: "cities/paris.jpg".into(),
        });
        app.game.submit(Some(GeoPoint::new(51.5, -0.1)), &Haversine).unwrap();

        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Lat 48.86, Lon 2.35"));
        assert!(!text.contains("48.8566"));
        assert!(text.contains("Paris"));
    }
}
