//! Date and time codec shared by the grid, the board and the backend client.
//!
//! Display dates are always `dd/mm/yyyy`, display times are grid slot labels
//! (`"9:30 AM"`). Anything unparsable renders as [`INVALID_DATE`] instead of
//! failing, so a broken record never takes a card down with it.

use std::sync::OnceLock;

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Timelike, Utc, Weekday,
};
use regex::Regex;

/// Sentinel shown in place of a date or time that could not be decoded.
pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date as `dd/mm/yyyy`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parse a `dd/mm/yyyy` string. Day comes first, always.
pub fn parse_display_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a wall-clock time as a slot label, e.g. `"2:30 PM"`.
pub fn format_slot_label(time: NaiveTime) -> String {
    let hour = time.hour();
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    format!("{}:{:02} {}", hour12, time.minute(), meridiem)
}

/// Parse a 12-hour `"h:mm AM|PM"` label into a wall-clock time.
pub fn parse_slot_label(label: &str) -> Option<NaiveTime> {
    let mut parts = label.split_whitespace();
    let clock = parts.next()?;
    let meridiem = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (hour, minute) = clock.split_once(':')?;
    let hour = hour.parse::<u32>().ok()?;
    let minute = minute.parse::<u32>().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let hour24 = match meridiem.to_ascii_uppercase().as_str() {
        "AM" if hour == 12 => 0,
        "AM" => hour,
        "PM" if hour == 12 => 12,
        "PM" => hour + 12,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

/// Convert a slot label to the 24-hour `"HH:MM"` form the backend expects.
///
/// `"2:30 PM"` becomes `"14:30"`, `"12:15 AM"` becomes `"00:15"`.
pub fn to_api_format(label: &str) -> Option<String> {
    parse_slot_label(label).map(|time| time.format("%H:%M").to_string())
}

/// Round to a quarter hour. Remainders of 7 minutes and up round upwards, so
/// `9:52` becomes `10:00`; a result of 60 rolls into the next hour (and day).
/// `None` when the rounded instant is past the representable range.
pub fn snap_to_quarter_hour(value: NaiveDateTime) -> Option<NaiveDateTime> {
    let minute = i64::from(value.minute());
    let snapped = (minute + 8) / 15 * 15;
    let past_hour = Duration::minutes(minute)
        + Duration::seconds(i64::from(value.second()))
        + Duration::nanoseconds(i64::from(value.nanosecond()));
    value
        .checked_sub_signed(past_hour)?
        .checked_add_signed(Duration::minutes(snapped))
}

/// Parse a backend timestamp. A missing offset is read as UTC.
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode a backend timestamp into the `(date, slot label)` a card sits on.
///
/// The instant is moved into `tz` and snapped to the grid before either part is
/// formatted, so a late `23:55` lands on the next day's `12:00 AM`.
pub fn display_slot_from_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> (String, String) {
    let snapped = parse_utc_timestamp(raw)
        .and_then(|instant| snap_to_quarter_hour(instant.with_timezone(tz).naive_local()));
    match snapped {
        Some(local) => (format_display_date(local.date()), format_slot_label(local.time())),
        None => {
            log::debug!("Unusable appointment timestamp {:?}", raw);
            (INVALID_DATE.to_string(), INVALID_DATE.to_string())
        }
    }
}

/// Combine a slot label and a display date into a UTC instant string
/// (`2024-05-10T13:30:00.000Z`), interpreting both in `tz`.
pub fn compose_api_timestamp<Tz: TimeZone>(label: &str, date: &str, tz: &Tz) -> Option<String> {
    let time = parse_slot_label(label)?;
    let date = parse_display_date(date)?;
    let local = tz.from_local_datetime(&date.and_time(time)).earliest()?;
    Some(
        local
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Timezone cards are displayed in. `Copy` and `Send`, so background workers
/// can convert records without borrowing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Utc,
    Named(chrono_tz::Tz),
}

impl DisplayZone {
    pub fn from_timezone(tz: Option<chrono_tz::Tz>) -> Self {
        tz.map(DisplayZone::Named).unwrap_or(DisplayZone::Local)
    }

    /// See [`display_slot_from_timestamp`].
    pub fn display_slot(&self, raw: &str) -> (String, String) {
        match self {
            DisplayZone::Local => display_slot_from_timestamp(raw, &chrono::Local),
            DisplayZone::Utc => display_slot_from_timestamp(raw, &Utc),
            DisplayZone::Named(tz) => display_slot_from_timestamp(raw, tz),
        }
    }

    /// See [`compose_api_timestamp`].
    pub fn api_timestamp(&self, label: &str, date: &str) -> Option<String> {
        match self {
            DisplayZone::Local => compose_api_timestamp(label, date, &chrono::Local),
            DisplayZone::Utc => compose_api_timestamp(label, date, &Utc),
            DisplayZone::Named(tz) => compose_api_timestamp(label, date, tz),
        }
    }
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*h\s*(\d+)\s*min\s*$").expect("duration pattern is valid")
    })
}

/// Total minutes of a `"<H>h <M>min"` duration label.
pub fn parse_duration_minutes(label: &str) -> Option<u32> {
    let captures = duration_pattern().captures(label)?;
    let hours = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let minutes = captures.get(2)?.as_str().parse::<u32>().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Re-render the backend's `"HH:MM"` duration as `"<H>h <M>min"`.
///
/// Input that is not `HH:MM` is passed through untouched; the grid treats it as
/// an unknown duration.
pub fn format_duration_label(raw: &str) -> String {
    let parsed = raw.trim().split_once(':').and_then(|(h, m)| {
        let hours = h.trim().parse::<u32>().ok()?;
        let minutes = m.trim().parse::<u32>().ok()?;
        (minutes < 60).then_some((hours, minutes))
    });
    match parsed {
        Some((hours, minutes)) => format!("{}h {}min", hours, minutes),
        None => raw.to_string(),
    }
}

/// Format a price with a currency symbol and two decimals.
pub fn format_price(amount: f64, currency_symbol: &str) -> String {
    if amount.is_finite() {
        format!("{}{:.2}", currency_symbol, amount)
    } else {
        format!("{}-", currency_symbol)
    }
}

/// First day of the week containing `date`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// `count` consecutive dates starting at `start`.
pub fn visible_dates(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}
