use chrono::Local;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use sopkoll_core::provider::SensorReading;

use crate::app::App;

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new(format!(
        "{} – upcoming waste pickups for {}",
        app.provider.name(),
        app.provider.address()
    ))
    .block(Block::default().borders(Borders::ALL).title("Sopkoll"));
    frame.render_widget(header, *header_area);

    draw_schedule(frame, app, *content_area);

    // Status bar
    let nav_hint = "r force refresh · q/Ctrl-C quit";

    let fetched_hint = app.fetched_at.map_or_else(
        || "never fetched".to_owned(),
        |fetched_at| {
            format!(
                "fetched {}",
                fetched_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            )
        },
    );

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        if app.stale {
            format!("{msg} (showing stale data, {fetched_hint}) · {nav_hint}")
        } else {
            format!("{msg} · {nav_hint}")
        }
    } else {
        format!("{fetched_hint} · {nav_hint}")
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_schedule(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = "Schedule";

    if app.is_loading && app.readings.is_empty() {
        let paragraph = Paragraph::new("Loading schedule…")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    if app.readings.is_empty() {
        let paragraph = Paragraph::new("No pickups known yet. Press r to refresh.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = app.readings.iter().map(|reading| {
        let date = reading.record.pickup_date.format("%Y-%m-%d").to_string();
        let weekday = reading.derived.pickup_weekday.clone();
        let relative = relative_day_label(reading);
        let this_week = if reading.derived.is_this_week {
            "yes"
        } else {
            ""
        };
        let bin = bin_label(reading);

        let mut style = Style::default().fg(reading_color(reading));
        if reading.derived.is_today || reading.derived.days_until_pickup.is_none() {
            style = style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(reading.record.waste_type.to_string()),
            Cell::from(date),
            Cell::from(weekday),
            Cell::from(relative),
            Cell::from(this_week),
            Cell::from(bin),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(16),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Waste type", "Next pickup", "Day", "In", "This week", "Bin"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn relative_day_label(reading: &SensorReading) -> String {
    match reading.derived.days_until_pickup {
        None => "overdue".to_owned(),
        Some(0) => "today".to_owned(),
        Some(1) => "tomorrow".to_owned(),
        Some(days) => format!("in {days} days"),
    }
}

fn bin_label(reading: &SensorReading) -> String {
    let size = match (reading.record.bin_size, reading.record.bin_size_unit.as_deref()) {
        (Some(bin_size), Some(unit)) => format!("{bin_size} {unit}"),
        (Some(bin_size), None) => bin_size.to_string(),
        _ => String::new(),
    };

    match reading.record.frequency.as_deref() {
        Some(frequency) if !frequency.is_empty() && !size.is_empty() => {
            format!("{size} · {frequency}")
        }
        Some(frequency) if !frequency.is_empty() => frequency.to_owned(),
        _ => size,
    }
}

fn reading_color(reading: &SensorReading) -> Color {
    match reading.derived.days_until_pickup {
        None => Color::Red,
        Some(0) => Color::Yellow,
        Some(1) => Color::Green,
        Some(days) if days <= 7 => Color::Cyan,
        Some(_) => Color::Gray,
    }
}
