use ratatui::{prelude::*, widgets::*};

use crate::app::{AlertKind, App};
use crate::clock::ClockSnapshot;
use crate::editor::EditState;
use crate::overlay::{Button, CONTACT_EMAIL, Click, OverlayContent, OverlayKind};

const CONTACT_TEXT: &str = "Wenn wir Ihr Interesse geweckt haben und Sie sich bewerben möchten \
oder zusätzliche Informationen wünschen, können Sie uns gerne kontaktieren unter:";

// ============================================================================
// Layout & Hit Testing
// ============================================================================

pub struct IdleLayout {
    pub header: Rect,
    pub theme_chip: Rect,
    pub message_icon: Rect,
    pub title: Rect,
    pub welcome: Rect,
    pub time: Rect,
    pub ring: Rect,
    pub date: Rect,
    pub buttons: [Rect; 3],
    pub footer: Rect,
}

/// What a click on the idle view landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleTarget {
    Button(Button),
    MessageIcon,
    ThemeChip,
}

pub fn idle_layout(area: Rect) -> IdleLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(area);
    let header = chunks[0];

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    let row = centered_rect(70, 100, sections[11]);
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(row);

    IdleLayout {
        header,
        theme_chip: Rect {
            x: header.x + 2,
            y: header.y + 1,
            width: 16u16.min(header.width.saturating_sub(4)),
            height: 1u16.min(header.height),
        },
        message_icon: Rect {
            x: header.x + header.width.saturating_sub(6),
            y: header.y + 1,
            width: 3u16.min(header.width),
            height: 1u16.min(header.height),
        },
        title: sections[1],
        welcome: sections[3],
        time: sections[5],
        ring: centered_rect(40, 100, sections[7]),
        date: sections[9],
        buttons: [cells[0], cells[1], cells[2]],
        footer: chunks[2],
    }
}

pub fn overlay_area(viewport: Rect, kind: OverlayKind) -> Rect {
    match kind {
        OverlayKind::Frame => centered_rect(94, 90, viewport),
        OverlayKind::Contact => centered_rect(60, 50, viewport),
    }
}

pub fn close_button_area(overlay: Rect) -> Rect {
    Rect {
        x: overlay.x + overlay.width.saturating_sub(6),
        y: overlay.y,
        width: 4u16.min(overlay.width),
        height: 1u16.min(overlay.height),
    }
}

fn badge_area(overlay: Rect) -> Rect {
    Rect {
        x: overlay.x + overlay.width.saturating_sub(7),
        y: overlay.y + overlay.height.saturating_sub(2),
        width: 5u16.min(overlay.width),
        height: 1u16.min(overlay.height),
    }
}

pub fn editor_area(viewport: Rect) -> Rect {
    centered_rect(60, 40, viewport)
}

pub fn contains(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

/// Close button first, then the overlay body, everything else is backdrop.
pub fn classify_overlay_click(viewport: Rect, kind: OverlayKind, column: u16, row: u16) -> Click {
    let overlay = overlay_area(viewport, kind);
    if contains(close_button_area(overlay), column, row) {
        Click::CloseButton
    } else if contains(overlay, column, row) {
        Click::Body
    } else {
        Click::Backdrop
    }
}

pub fn idle_target(viewport: Rect, column: u16, row: u16) -> Option<IdleTarget> {
    let layout = idle_layout(viewport);
    if contains(layout.message_icon, column, row) {
        return Some(IdleTarget::MessageIcon);
    }
    if contains(layout.theme_chip, column, row) {
        return Some(IdleTarget::ThemeChip);
    }
    Button::ALL
        .into_iter()
        .zip(layout.buttons)
        .find(|(_, area)| contains(*area, column, row))
        .map(|(button, _)| IdleTarget::Button(button))
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(f: &mut Frame, app: &App) {
    let area = f.size();
    let palette = app.background.theme().palette();

    f.render_widget(Block::default().style(Style::default().bg(palette.backdrop)), area);
    render_idle(f, app, &app.clock);

    if let Some(session) = app.overlay.session() {
        f.buffer_mut().set_style(area, Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM));
        render_overlay(f, app, &session.content, area);
    }

    if app.editor.is_open() {
        render_editor(f, app, area);
    }

    render_alert(f, app, area);
}

fn render_idle(f: &mut Frame, app: &App, clock: &ClockSnapshot) {
    let layout = idle_layout(f.size());
    let theme = app.background.theme();
    let palette = theme.palette();

    // Header
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.border))
            .title(Span::styled(" 🏫 RKIOSK ", Style::default()
                .fg(palette.accent).add_modifier(Modifier::BOLD)))
            .title_alignment(Alignment::Center),
        layout.header,
    );
    let pulse = if app.animation_frame < 10 { "●" } else { "○" };
    f.render_widget(
        Paragraph::new(format!("{} {}", pulse, theme.label())).style(Style::default().fg(palette.border)),
        layout.theme_chip,
    );
    f.render_widget(
        Paragraph::new("✉").style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        layout.message_icon,
    );

    // Title
    let title = vec![
        Line::from(Span::styled("Herzlich Willkommen", Style::default()
            .fg(palette.text).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(app.school_name.as_str(), Style::default().fg(Color::Gray))),
    ];
    f.render_widget(Paragraph::new(title).alignment(Alignment::Center), layout.title);

    // Welcome message
    if !app.welcome.is_empty() {
        f.render_widget(
            Paragraph::new(app.welcome.as_str())
                .style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD | Modifier::ITALIC))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            layout.welcome,
        );
    }

    // Clock
    f.render_widget(
        Paragraph::new(clock.time())
            .style(Style::default().fg(palette.text).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        layout.time,
    );
    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.border)))
            .gauge_style(Style::default().fg(palette.text).bg(palette.backdrop))
            .label("")
            .ratio(clock.minute_progress()),
        layout.ring,
    );
    f.render_widget(
        Paragraph::new(clock.date()).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        layout.date,
    );

    // Buttons
    for (button, area) in Button::ALL.into_iter().zip(layout.buttons) {
        let active = app.active_button == Some(button);
        let style = if active {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        f.render_widget(
            Paragraph::new(format!("[{}] {}", button.hotkey(), button.label()))
                .style(style)
                .alignment(Alignment::Center)
                .block(Block::default()
                    .borders(Borders::ALL)
                    .border_type(if active { BorderType::Thick } else { BorderType::Rounded })
                    .border_style(style)),
            area,
        );
    }

    // Controls
    let controls = vec![
        Line::from(vec![
            span_key("1-3", app), Span::raw(" Öffnen  •  "),
            span_key("W", app), Span::raw(" Nachricht  •  "),
            span_key("B", app), Span::raw(" Hintergrund  •  "),
            span_key("Esc", app), Span::raw(" Schließen  •  "),
            span_key("Q", app), Span::raw(" Beenden"),
        ]),
        Line::from(Span::styled(format!("▶ {}  {}", theme.assets().video, playhead(app)), Style::default()
            .fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];
    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        layout.footer,
    );
}

/// Time since the background media was (re)started.
fn playhead(app: &App) -> String {
    let secs = app.background.started_at().elapsed().as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn span_key<'a>(text: &'a str, app: &App) -> Span<'a> {
    Span::styled(text, Style::default()
        .fg(app.background.theme().palette().accent).add_modifier(Modifier::BOLD))
}

fn render_overlay(f: &mut Frame, app: &App, content: &OverlayContent, viewport: Rect) {
    let area = overlay_area(viewport, content.kind());
    let palette = app.background.theme().palette();
    f.render_widget(Clear, area);

    let body = match content {
        OverlayContent::Frame(url) => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(url.host_str().unwrap_or("Seite").to_string(), Style::default()
                .fg(palette.accent).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(Span::styled(url.as_str().to_string(), Style::default()
                .fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        ])
        .alignment(Alignment::Center),
        OverlayContent::Contact => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Kontakt", Style::default()
                .fg(palette.accent).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(CONTACT_TEXT),
            Line::from(""),
            Line::from(Span::styled(CONTACT_EMAIL, Style::default()
                .fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
    };

    f.render_widget(
        body.style(Style::default().fg(Color::White).bg(Color::Black)).block(Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.border))),
        area,
    );

    f.render_widget(
        Paragraph::new("[✕]").style(Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD)),
        close_button_area(area),
    );

    if let Some(remaining) = app.overlay.remaining() {
        f.render_widget(
            Paragraph::new(format!(" {} ", remaining))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).bg(Color::DarkGray).add_modifier(Modifier::BOLD)),
            badge_area(area),
        );
    }
}

fn render_editor(f: &mut Frame, app: &App, viewport: Rect) {
    let area = editor_area(viewport);
    let palette = app.background.theme().palette();
    f.render_widget(Clear, area);

    let (title, lines) = match app.editor.state() {
        EditState::PinPrompt { entered } => {
            let masked: String = (0..crate::pin::MAX_PIN_LEN)
                .map(|i| if i < entered.chars().count() { '●' } else { '_' })
                .collect();
            (" PIN ", vec![
                Line::from(""),
                Line::from(Span::styled("🔒 PIN eingeben", Style::default()
                    .fg(palette.accent).add_modifier(Modifier::BOLD))),
                Line::from(""),
                Line::from(Span::styled(masked, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
                Line::from(""),
                Line::from(Span::styled("Enter: Bestätigen  •  Esc: Abbrechen", Style::default()
                    .fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
            ])
        }
        EditState::MessageForm { draft } => (" Nachricht ", vec![
            Line::from(""),
            Line::from(Span::styled("✏️  Willkommensnachricht", Style::default()
                .fg(palette.accent).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(vec![
                Span::styled(draft.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]),
            Line::from(""),
            Line::from(Span::styled("Enter: Speichern  •  Esc: Abbrechen", Style::default()
                .fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
        ]),
        EditState::Closed => return,
    };

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::White).bg(Color::Black))
            .block(Block::default()
                .title(title)
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.border))),
        area,
    );
}

fn render_alert(f: &mut Frame, app: &App, viewport: Rect) {
    let Some(alert) = &app.alert else { return };
    let color = match alert.kind {
        AlertKind::Error => Color::Red,
        AlertKind::Info => Color::Green,
    };
    let width = (alert.text.chars().count() as u16 + 4).min(viewport.width);
    let area = Rect {
        x: viewport.x + (viewport.width - width) / 2,
        y: viewport.y + viewport.height.saturating_sub(5),
        width,
        height: 3u16.min(viewport.height),
    };
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(alert.text.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White).bg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)),
        area,
    );
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect { x: 0, y: 0, width: 120, height: 40 };

    fn center(r: Rect) -> (u16, u16) {
        (r.x + r.width / 2, r.y + r.height / 2)
    }

    #[test]
    fn overlay_body_click_is_body() {
        for kind in [OverlayKind::Frame, OverlayKind::Contact] {
            let (col, row) = center(overlay_area(VIEWPORT, kind));
            assert_eq!(classify_overlay_click(VIEWPORT, kind, col, row), Click::Body);
        }
    }

    #[test]
    fn corner_click_is_backdrop() {
        assert_eq!(classify_overlay_click(VIEWPORT, OverlayKind::Contact, 0, 0), Click::Backdrop);
        assert_eq!(classify_overlay_click(VIEWPORT, OverlayKind::Frame, 119, 39), Click::Backdrop);
    }

    #[test]
    fn close_button_wins_over_body() {
        let overlay = overlay_area(VIEWPORT, OverlayKind::Frame);
        let button = close_button_area(overlay);
        assert!(contains(overlay, button.x, button.y));
        assert_eq!(
            classify_overlay_click(VIEWPORT, OverlayKind::Frame, button.x, button.y),
            Click::CloseButton
        );
    }

    #[test]
    fn idle_targets_resolve_buttons_and_icons() {
        let layout = idle_layout(VIEWPORT);
        for (button, area) in Button::ALL.into_iter().zip(layout.buttons) {
            let (col, row) = center(area);
            assert_eq!(idle_target(VIEWPORT, col, row), Some(IdleTarget::Button(button)));
        }
        let icon = layout.message_icon;
        assert_eq!(idle_target(VIEWPORT, icon.x, icon.y), Some(IdleTarget::MessageIcon));
        let chip = layout.theme_chip;
        assert_eq!(idle_target(VIEWPORT, chip.x, chip.y), Some(IdleTarget::ThemeChip));
        let (col, row) = center(layout.time);
        assert_eq!(idle_target(VIEWPORT, col, row), None);
    }
}
