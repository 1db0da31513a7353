//! TUI rendering traits for holiday types.
//!
//! Extension traits that add colored terminal rendering to holiday-core types
//! using owo_colors.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use holiday_core::evaluator::{Classification, HolidayStatus, ViewEntry};
use holiday_core::holiday::{self, HolidayRecord};
use holiday_core::ledger::NotifiedEntry;
use holiday_core::notification::{Notification, NotificationKind};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for HolidayRecord {
    fn render(&self) -> String {
        format!(
            "{} {}",
            self.name,
            format!("({}, {})", self.date.format("%Y-%m-%d"), self.weekday_name()).dimmed()
        )
    }
}

impl Render for ViewEntry {
    fn render(&self) -> String {
        let date = self.record.date.format("%d %B").to_string();
        let line = format!(
            "{}  {} ({})",
            date,
            self.record.name,
            self.record.weekday_name()
        );
        match self.status {
            HolidayStatus::Past => line.dimmed().to_string(),
            HolidayStatus::Today => format!("{} {}", line.bold().yellow(), "← today".yellow()),
            HolidayStatus::Upcoming => line,
        }
    }
}

impl Render for Notification {
    fn render(&self) -> String {
        let symbol = match self.kind {
            NotificationKind::Today => "🎉",
            NotificationKind::Tomorrow => "📅",
            NotificationKind::Upcoming { .. } => "🔔",
        };
        let body = self.body().replace('\n', " · ");
        format!("{} {} {}", symbol, self.title().bold(), body)
    }
}

impl Render for Classification {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push(render_next(self));

        render_bucket(&mut lines, "Today", &self.today);
        render_bucket(&mut lines, "Tomorrow", &self.tomorrow);
        render_bucket(&mut lines, "Coming up", &self.within_window);

        lines.join("\n")
    }
}

fn render_next(classification: &Classification) -> String {
    match (&classification.next_upcoming, classification.countdown()) {
        (Some(next), Some(countdown)) => format!(
            "{} {} {}",
            "Next holiday:".bold(),
            next.render(),
            countdown.to_string().green()
        ),
        _ => "No upcoming holidays found".dimmed().to_string(),
    }
}

fn render_bucket(lines: &mut Vec<String>, label: &str, records: &[HolidayRecord]) {
    if records.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(label.bold().to_string());
    for record in records {
        lines.push(format!("   {}", record.render()));
    }
}

pub fn render_month(year: i32, month: u32, entries: &[ViewEntry]) -> String {
    let title = month_title(year, month);
    if entries.is_empty() {
        return format!("No holidays found for {title}.").dimmed().to_string();
    }

    let mut lines = vec![format!("Holidays in {title}:").bold().to_string()];
    lines.extend(entries.iter().map(|e| format!("   {}", e.render())));
    lines.join("\n")
}

pub fn render_year(year: i32, months: &BTreeMap<u32, Vec<ViewEntry>>) -> String {
    if months.is_empty() {
        return format!("No holidays found for {year}.").dimmed().to_string();
    }

    let mut lines = vec![format!("Holidays in {year}:").bold().to_string()];
    for (month, entries) in months {
        lines.push(String::new());
        lines.push(format!("📅 {}", month_name(*month)).bold().to_string());
        lines.extend(entries.iter().map(|e| format!("   {}", e.render())));
    }
    lines.join("\n")
}

/// One ledger line: holiday name and date, then when it was notified.
pub fn render_notified(key: &str, entry: &NotifiedEntry) -> String {
    let holiday = match holiday::parse_key(key) {
        Some((date, name)) => format!("{} {}", name, format!("({})", date.format("%Y-%m-%d")).dimmed()),
        None => key.to_string(),
    };
    format!("   {} {}", holiday, render_timestamp(entry.notified_at).dimmed())
}

fn render_timestamp(at: DateTime<Utc>) -> String {
    format!("notified {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"))
}

fn month_title(year: i32, month: u32) -> String {
    format!("{} {}", month_name(month), year)
}

fn month_name(month: u32) -> String {
    NaiveDate::from_ymd_opt(2000, month, 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_else(|| month.to_string())
}
