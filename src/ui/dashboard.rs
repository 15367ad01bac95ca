use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Gauge, List, ListItem, Paragraph},
};

use super::{
    draw_help, draw_title,
    layout::{calculate_screen_chunks, split_columns},
    notice_line,
};
use crate::app::{App, DashboardView};
use crate::utils::truncate_string;

fn completion_color(percent: u8) -> Color {
    match percent {
        75..=100 => Color::Green,
        40..=74 => Color::Yellow,
        _ => Color::Red,
    }
}

fn draw_completion(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Subject completion");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if view.completion.is_empty() {
        f.render_widget(Paragraph::new("No subjects configured."), inner);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            view.completion
                .iter()
                .map(|_| Constraint::Length(2))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (entry, row) in view.completion.iter().zip(rows.iter()) {
        let gauge = Gauge::default()
            .block(Block::default().title(entry.subject.clone()))
            .gauge_style(Style::default().fg(completion_color(entry.percent)))
            .percent(entry.percent.min(100) as u16)
            .label(format!("{}%", entry.percent));
        f.render_widget(gauge, *row);
    }
}

fn draw_trend(f: &mut Frame, area: Rect, view: &DashboardView) {
    let placeholder = view.trend.iter().all(|p| p.placeholder);
    let title = if placeholder {
        "Performance (sample data, no scores yet)"
    } else {
        "Performance (monthly average)"
    };

    let labels: Vec<String> = view
        .trend
        .iter()
        .map(|p| p.label.chars().take(3).collect())
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(view.trend.iter())
        .map(|(label, point)| (label.as_str(), point.score as u64))
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(data.as_slice())
        .bar_width(5)
        .bar_gap(2)
        .max(100)
        .bar_style(Style::default().fg(if placeholder {
            Color::DarkGray
        } else {
            Color::Cyan
        }))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(if placeholder { Color::DarkGray } else { Color::Cyan }),
        );
    f.render_widget(chart, area);
}

fn draw_recent(f: &mut Frame, area: Rect, view: &DashboardView) {
    let width = area.width.saturating_sub(16) as usize;
    let items: Vec<ListItem> = if view.recent.is_empty() {
        vec![ListItem::new("Complete a quiz or theory exam to see it here.").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        view.recent
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%Y-%m-%d ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{:>3}% ", entry.score),
                        Style::default()
                            .fg(completion_color(entry.score))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::from(truncate_string(
                        &format!("{} ({})", entry.chapter, entry.kind.label()),
                        width,
                    )),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Recent activity"));
    f.render_widget(list, area);
}

pub fn draw_dashboard(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());
    draw_title(f, layout.header_area, "Progress Dashboard");
    let view = &app.dashboard;

    let body = if view.storage_available {
        layout.body_area
    } else {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(layout.body_area);
        f.render_widget(
            Paragraph::new(notice_line(
                "Progress storage is unavailable; nothing will be saved.",
                Color::Red,
            )),
            parts[0],
        );
        parts[1]
    };

    let (left, right) = split_columns(body, 45);
    draw_completion(f, left, view);

    let right_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(right);
    draw_trend(f, right_rows[0], view);
    draw_recent(f, right_rows[1], view);

    draw_help(f, layout.help_area, &[("r", "Refresh"), ("Esc", "Menu")]);
}
