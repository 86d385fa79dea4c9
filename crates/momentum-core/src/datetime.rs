use anyhow::anyhow;
use chrono::{
  DateTime,
  Duration,
  NaiveDate,
  Utc
};

/// Date format used by the deadline picker.
pub const PICKER_DATE_FORMAT: &str =
  "%d.%m.%Y";
pub const DUE_DATE_FORMAT: &str =
  "%Y-%m-%d";

#[must_use]
pub fn default_deadline(
  now: DateTime<Utc>
) -> DateTime<Utc> {
  now + Duration::hours(24)
}

/// Date-only string sent as `due_date` when creating a task.
#[must_use]
pub fn format_due_date(
  dt: DateTime<Utc>
) -> String {
  dt.format(DUE_DATE_FORMAT).to_string()
}

/// Renders an API `due_date` (RFC 3339 or a bare date) the way the picker
/// shows it. Unparseable input is returned unchanged.
#[must_use]
pub fn format_api_date(raw: &str) -> String {
  if let Ok(dt) =
    DateTime::parse_from_rfc3339(raw)
  {
    return dt
      .with_timezone(&Utc)
      .format(PICKER_DATE_FORMAT)
      .to_string();
  }

  raw
    .get(..10)
    .and_then(|prefix| {
      NaiveDate::parse_from_str(
        prefix,
        DUE_DATE_FORMAT
      )
      .ok()
    })
    .map(|date| {
      date
        .format(PICKER_DATE_FORMAT)
        .to_string()
    })
    .unwrap_or_else(|| raw.to_string())
}

/// Parses a deadline typed on the command line.
///
/// Accepts `tomorrow`, `+Nd`, `YYYY-MM-DD`, `DD.MM.YYYY`, or a full RFC 3339
/// timestamp. Date-only inputs keep the time of day of `now`, like the
/// picker does when a new day is chosen.
pub fn parse_deadline_input(
  raw: &str,
  now: DateTime<Utc>
) -> anyhow::Result<DateTime<Utc>> {
  let token = raw.trim();
  if token.is_empty() {
    return Err(anyhow!(
      "deadline cannot be empty"
    ));
  }

  if token.eq_ignore_ascii_case("today")
  {
    return Ok(now);
  }
  if token
    .eq_ignore_ascii_case("tomorrow")
  {
    return Ok(default_deadline(now));
  }

  if let Some(days) = token
    .strip_prefix('+')
    .and_then(|rest| {
      rest.strip_suffix('d')
    })
  {
    let days: i64 =
      days.parse().map_err(|_| {
        anyhow!(
          "invalid relative deadline: \
           {token}"
        )
      })?;
    return Ok(now + Duration::days(days));
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(dt.with_timezone(&Utc));
  }

  let date = NaiveDate::parse_from_str(
    token,
    DUE_DATE_FORMAT
  )
  .or_else(|_| {
    NaiveDate::parse_from_str(
      token,
      PICKER_DATE_FORMAT
    )
  })
  .map_err(|_| {
    anyhow!(
      "unrecognized deadline: {token} \
       (expected YYYY-MM-DD or \
       DD.MM.YYYY)"
    )
  })?;

  Ok(
    date
      .and_time(now.time())
      .and_utc()
  )
}

/// Serde adapter for optional instants stored in the task draft.
///
/// Values are written as RFC 3339 with full sub-second precision so a stored
/// deadline reads back as the same instant.
pub mod draft_timestamp_serde {
  use chrono::{
    DateTime,
    SecondsFormat,
    Utc
  };
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    dt: &Option<DateTime<Utc>>,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    match dt {
      | Some(value) => serializer
        .serialize_str(
          &value.to_rfc3339_opts(
            SecondsFormat::AutoSi,
            true
          )
        ),
      | None => serializer.serialize_none()
    }
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<Option<DateTime<Utc>>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = Option::<String>::deserialize(
      deserializer
    )?;
    match raw {
      | Some(text)
        if !text.trim().is_empty() =>
      {
        DateTime::parse_from_rfc3339(
          text.trim()
        )
        .map(|dt| {
          Some(dt.with_timezone(&Utc))
        })
        .map_err(serde::de::Error::custom)
      }
      | _ => Ok(None)
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Timelike,
    Utc
  };

  use super::*;

  fn fixed_now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 10, 16, 9, 30, 0
      )
      .single()
      .expect("valid now")
  }

  #[test]
  fn parses_picker_and_iso_dates() {
    let now = fixed_now();
    let iso =
      parse_deadline_input("2026-10-20", now)
        .expect("iso date");
    let picker =
      parse_deadline_input("20.10.2026", now)
        .expect("picker date");
    assert_eq!(iso, picker);
    assert_eq!(
      format_due_date(iso),
      "2026-10-20"
    );
    assert_eq!(iso.hour(), 9);
  }

  #[test]
  fn parses_relative_deadlines() {
    let now = fixed_now();
    assert_eq!(
      parse_deadline_input("tomorrow", now)
        .expect("tomorrow"),
      now + Duration::hours(24)
    );
    assert_eq!(
      parse_deadline_input("+3d", now)
        .expect("relative"),
      now + Duration::days(3)
    );
    assert!(
      parse_deadline_input("someday", now)
        .is_err()
    );
  }

  #[test]
  fn formats_api_dates_for_display() {
    assert_eq!(
      format_api_date(
        "2026-10-20T00:00:00.000000Z"
      ),
      "20.10.2026"
    );
    assert_eq!(
      format_api_date("2026-10-21"),
      "21.10.2026"
    );
    assert_eq!(
      format_api_date("n/a"),
      "n/a"
    );
  }
}
