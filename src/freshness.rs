// 🥚 Freshness Filter - Which pantry ingredients are still usable
//
// An ingredient is valid when its expiry date falls in [now, now + window].
// A date is midnight at the start of its calendar day, so an item that
// expires "today" only counts while the clock still reads midnight.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Wire format of every stored expiry date, e.g. `05-03-2025`
pub const EXPIRY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Default look-ahead for "imminently expiring" ingredients
pub const DEFAULT_WINDOW_DAYS: u32 = 28;

// ============================================================================
// CLOCK
// ============================================================================

/// Source of "now". Read once per request so every comparison in that
/// request shares the same reference instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the server's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ============================================================================
// DATE PARSING
// ============================================================================

/// Parse a `DD-MM-YYYY` expiry date. Any malformed or impossible date
/// (wrong layout, `31-02-2025`, non-numeric parts) yields `None`.
pub fn parse_expiry_date(date_str: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(date_str, EXPIRY_DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Render a date in the stored expiry format
pub fn format_expiry_date(date: NaiveDate) -> String {
    date.format(EXPIRY_DATE_FORMAT).to_string()
}

// ============================================================================
// EXPIRY WINDOW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    /// Days after "now" that still count as valid (inclusive)
    pub days: u32,
}

impl ExpiryWindow {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    /// Inclusive on both ends
    pub fn contains(&self, now: NaiveDateTime, expiry: NaiveDateTime) -> bool {
        let upper = now
            .checked_add_signed(Duration::days(i64::from(self.days)))
            .unwrap_or(NaiveDateTime::MAX);

        now <= expiry && expiry <= upper
    }

    /// Keep the ingredients whose paired date parses and lies in the window.
    ///
    /// Pairing is positional and stops at the shorter list, so an ingredient
    /// without a date is dropped. Input order is preserved.
    pub fn valid_ingredients(
        &self,
        ingredients: &[String],
        expiry_dates: &[String],
        now: NaiveDateTime,
    ) -> Vec<String> {
        ingredients
            .iter()
            .zip(expiry_dates)
            .filter(|(_, date)| {
                parse_expiry_date(date).is_some_and(|expiry| self.contains(now, expiry))
            })
            .map(|(ingredient, _)| ingredient.clone())
            .collect()
    }
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS)
    }
}

// ============================================================================
// TESTS
// ============================================================================
