//! Business-hours calendar arithmetic in the configured reference timezone.
//!
//! All instants are `DateTime<Utc>`; they are converted to local wall-clock
//! time only to decide which day a candidate belongs to and where that day's
//! business window starts and ends. Local boundaries that fall inside a DST
//! transition resolve like wall-clock calendars do: a boundary in a
//! spring-forward gap moves to the first valid instant after the gap, and a
//! boundary in a fall-back fold takes the earlier of the two instants.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

/// Validated business-hours calendar, built by
/// [`SchedulingConfig::business_hours`](crate::config::SchedulingConfig::business_hours).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusinessHours {
    pub tz: Tz,
    pub start_hour: u32,
    pub end_hour: u32,
    pub step: Duration,
    pub relocation_horizon: Duration,
    pub max_proposals: usize,
}

impl BusinessHours {
    /// Nominal length of a business day in minutes.
    pub fn business_minutes(&self) -> i64 {
        i64::from(self.end_hour - self.start_hour) * 60
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Start of the business window on `date`.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        self.at_hour(date, self.start_hour)
    }

    /// End of the business window on `date` (exclusive).
    pub fn day_end(&self, date: NaiveDate) -> DateTime<Utc> {
        self.at_hour(date, self.end_hour)
    }

    /// Business start of the first business day strictly after `date`.
    pub fn next_business_day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let mut next = date + Duration::days(1);
        while !self.is_business_day(next) {
            next += Duration::days(1);
        }
        self.day_start(next)
    }

    /// Whether `[start, end)` sits inside one business day's window.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let date = self.local_date(start);
        self.is_business_day(date) && start >= self.day_start(date) && end <= self.day_end(date)
    }

    /// Earliest instant at or after `cursor` where a block of `duration` fits
    /// inside business hours, or `None` once the cursor reaches `limit`.
    ///
    /// Weekend cursors jump to the following Monday's start, cursors before the
    /// day's start jump to it, and cursors too late for `duration` to finish
    /// jump to the next business day's start.
    pub fn next_valid_start(
        &self,
        mut cursor: DateTime<Utc>,
        duration: Duration,
        limit: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        while cursor < limit {
            let date = self.local_date(cursor);
            if !self.is_business_day(date) {
                cursor = self.next_business_day_start(date);
                continue;
            }
            let start = self.day_start(date);
            if cursor < start {
                cursor = start;
                continue;
            }
            if cursor + duration > self.day_end(date) {
                cursor = self.next_business_day_start(date);
                continue;
            }
            return Some(cursor);
        }
        None
    }

    /// `"09:00 AM - 10:00 AM EST"` in the reference timezone.
    pub fn format_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{} - {}",
            start.with_timezone(&self.tz).format("%I:%M %p"),
            end.with_timezone(&self.tz).format("%I:%M %p %Z")
        )
    }

    /// `"Mon Mar 16 09:00 AM - 10:00 AM EDT"`: [`BusinessHours::format_range`]
    /// prefixed with the local start date.
    pub fn format_dated_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            start.with_timezone(&self.tz).format("%a %b %d"),
            self.format_range(start, end)
        )
    }

    /// `"Monday, March 16, 2026 09:00 AM EDT"` in the reference timezone.
    pub fn format_instant(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format("%A, %B %d, %Y %I:%M %p %Z")
            .to_string()
    }

    fn at_hour(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        // Hour 24 is midnight of the following day.
        let naive = date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight + Duration::hours(i64::from(hour)))
            .unwrap_or_default();
        resolve_local(self.tz, naive)
    }
}

/// Map a local wall-clock time to an instant.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }
    // Spring-forward gap: walk forward until the wall clock exists again.
    let mut candidate = naive;
    for _ in 0..(4 * 60) {
        candidate += Duration::minutes(1);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt.with_timezone(&Utc);
        }
    }
    Utc.from_utc_datetime(&naive)
}
