//! officeholidays.com country pages.
//!
//! Each year lives at `<base_url>/<year>` and lists holidays in a
//! `table.country-table` whose rows are `weekday | date | name | ...`. The
//! date cell usually wraps a `<time datetime="YYYY-MM-DD">`; older pages only
//! carry the text form `Jan 01`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::{HolidayError, HolidayResult};
use crate::holiday::HolidayRecord;
use crate::source::HolidaySource;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main-page dates further in the past than this belong to next year.
const MAIN_PAGE_ROLLOVER_DAYS: i64 = 180;

pub struct OfficeHolidaysSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl OfficeHolidaysSource {
    pub fn new(base_url: &str, timeout: Duration) -> HolidayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HolidayError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(OfficeHolidaysSource {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            clock: Arc::new(SystemClock),
        })
    }

    /// Date used to decide the main-page fallback and to pin yearless dates.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn from_config(config: &AppConfig) -> HolidayResult<Self> {
        Self::new(
            &config.source_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// GET `url`, returning `None` for a 404 (page not published).
    async fn get_page(&self, url: &str) -> HolidayResult<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| HolidayError::Network(format!("{url}: {e}")))?;

        let html = response.text().await.map_err(|e| self.request_error(e))?;
        tracing::trace!(url, bytes = html.len(), "holiday page received");

        Ok(Some(html))
    }

    fn request_error(&self, e: reqwest::Error) -> HolidayError {
        if e.is_timeout() {
            HolidayError::Timeout(self.timeout.as_secs())
        } else {
            HolidayError::Network(e.to_string())
        }
    }

    async fn fetch_main_page(
        &self,
        year: i32,
        today: NaiveDate,
    ) -> HolidayResult<Vec<HolidayRecord>> {
        let Some(html) = self.get_page(&self.base_url).await? else {
            tracing::warn!(url = %self.base_url, "main holiday page not found");
            return Ok(Vec::new());
        };

        let records = match parse_main_page(&html, today)? {
            Some(records) => records,
            None => {
                tracing::warn!("could not find holiday table on the main page");
                return Ok(Vec::new());
            }
        };

        Ok(records.into_iter().filter(|r| r.date.year() == year).collect())
    }
}

impl HolidaySource for OfficeHolidaysSource {
    async fn fetch(&self, year: i32) -> HolidayResult<Vec<HolidayRecord>> {
        let url = format!("{}/{}", self.base_url, year);
        let today = self.clock.today();

        let Some(html) = self.get_page(&url).await? else {
            tracing::warn!(year, "no holiday page published yet");
            return Ok(Vec::new());
        };

        match parse_year_page(&html, year)? {
            Some(records) => {
                tracing::info!(year, count = records.len(), "fetched holidays");
                Ok(records)
            }
            None if year == today.year() => {
                tracing::warn!(year, "no holiday table on year page, trying main page");
                let records = self.fetch_main_page(year, today).await?;
                tracing::info!(year, count = records.len(), "fetched holidays from main page");
                Ok(records)
            }
            None => {
                tracing::warn!(year, "could not find holiday table");
                Ok(Vec::new())
            }
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

struct Selectors {
    table: Selector,
    row: Selector,
    cell: Selector,
    time: Selector,
}

impl Selectors {
    fn new() -> HolidayResult<Self> {
        let parse = |css: &str| {
            Selector::parse(css)
                .map_err(|e| HolidayError::Parse(format!("invalid selector '{css}': {e:?}")))
        };
        Ok(Selectors {
            table: parse("table.country-table")?,
            row: parse("tr")?,
            cell: parse("td")?,
            time: parse("time[datetime]")?,
        })
    }
}

/// A table row before its date has been pinned to a year.
struct RawRow {
    iso_date: Option<NaiveDate>,
    date_text: String,
    name: String,
}

/// Rows of the holiday table, or `None` if the page has no table.
fn raw_rows(html: &str) -> HolidayResult<Option<Vec<RawRow>>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);

    let Some(table) = document.select(&selectors.table).next() else {
        return Ok(None);
    };

    let rows = table
        .select(&selectors.row)
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&selectors.cell).collect();
            if cells.len() < 3 {
                return None; // header or malformed row
            }

            let iso_date = cells[1]
                .select(&selectors.time)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(|d| NaiveDate::parse_from_str(d.get(..10)?, "%Y-%m-%d").ok());

            Some(RawRow {
                iso_date,
                date_text: cell_text(&cells[1]),
                name: cell_text(&cells[2]),
            })
        })
        .filter(|row| !row.name.is_empty())
        .collect();

    Ok(Some(rows))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_text_date(text: &str, year: i32) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{text} {year}"), "%b %d %Y").ok()
}

/// Parse a `<base_url>/<year>` page.
pub(crate) fn parse_year_page(html: &str, year: i32) -> HolidayResult<Option<Vec<HolidayRecord>>> {
    let Some(rows) = raw_rows(html)? else {
        return Ok(None);
    };

    let records = rows
        .into_iter()
        .filter_map(|row| {
            let date = row.iso_date.or_else(|| parse_text_date(&row.date_text, year));
            if date.is_none() {
                tracing::warn!(date = %row.date_text, year, "could not parse holiday date");
            }
            Some(HolidayRecord::new(date?, row.name))
        })
        .collect();

    Ok(Some(records))
}

/// Parse the yearless main page. Text dates are pinned to `today`'s year,
/// or the following one if that would put them more than half a year back.
pub(crate) fn parse_main_page(
    html: &str,
    today: NaiveDate,
) -> HolidayResult<Option<Vec<HolidayRecord>>> {
    let Some(rows) = raw_rows(html)? else {
        return Ok(None);
    };

    let records = rows
        .into_iter()
        .filter_map(|row| {
            let date = row.iso_date.or_else(|| {
                let date = parse_text_date(&row.date_text, today.year())?;
                if (today - date).num_days() > MAIN_PAGE_ROLLOVER_DAYS {
                    date.with_year(today.year() + 1)
                } else {
                    Some(date)
                }
            });
            if date.is_none() {
                tracing::warn!(date = %row.date_text, "could not parse holiday date");
            }
            Some(HolidayRecord::new(date?, row.name))
        })
        .collect();

    Ok(Some(records))
}
