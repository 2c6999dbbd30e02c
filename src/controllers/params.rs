//! Request parameter schemas for the event resources.
//!
//! Raw parameters arrive as optional strings and are turned into typed values
//! here, before any handler touches the store.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::error::{ApiError, FieldErrors};
use crate::models::{NewEvent, EVENT_NAME_MAX_LEN};

pub const DATE_MESSAGE: &str =
    "The event date with the correct format is required! The correct format is YYYY-MM-DD!";
pub const EVENT_REQUIRED_MESSAGE: &str = "The event name is required!";

pub fn event_length_message() -> String {
    format!("The event name must be between 1 and {EVENT_NAME_MAX_LEN} characters!")
}

/// Parses `YYYY-MM-DD`. The year is exactly four digits in `0001..=9999`;
/// month and day may drop their leading zero.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() != 4 {
        return None;
    }
    if !(1..=2).contains(&month.len()) || !(1..=2).contains(&day.len()) {
        return None;
    }
    if ![year, month, day]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    (date.year() >= 1).then_some(date)
}

/// `application/json` or any `+json` media type, ignoring case and parameters.
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

// --- GET /event ---

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRangeQuery {
    /// `Ok(None)` means no filter was requested. Once either bound is present
    /// both have to be valid dates.
    pub fn into_range(self) -> Result<Option<DateRange>, ApiError> {
        if self.start_time.is_none() && self.end_time.is_none() {
            return Ok(None);
        }

        let mut errors = FieldErrors::new();
        let start = self.start_time.as_deref().and_then(parse_date);
        let end = self.end_time.as_deref().and_then(parse_date);
        if start.is_none() {
            errors.insert("start_time", DATE_MESSAGE.to_string());
        }
        if end.is_none() {
            errors.insert("end_time", DATE_MESSAGE.to_string());
        }

        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(DateRange { start, end })),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

// --- POST /event ---

/// Create-event parameters, read from a JSON object body, a urlencoded form
/// body or the query string. Body values take precedence.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EventForm {
    #[validate(length(min = 1, max = 80))]
    pub event: Option<String>,
    pub date: Option<String>,
}

impl EventForm {
    pub fn into_new_event(self) -> Result<NewEvent, ApiError> {
        let mut errors = FieldErrors::new();

        match &self.event {
            None => {
                errors.insert("event", EVENT_REQUIRED_MESSAGE.to_string());
            }
            Some(_) => {
                if let Err(e) = self.validate() {
                    if e.field_errors().contains_key("event") {
                        errors.insert("event", event_length_message());
                    }
                }
            }
        }

        let date = self.date.as_deref().and_then(parse_date);
        if date.is_none() {
            errors.insert("date", DATE_MESSAGE.to_string());
        }

        match (self.event, date) {
            (Some(name), Some(date)) if errors.is_empty() => Ok(NewEvent { name, date }),
            _ => Err(ApiError::Validation(errors)),
        }
    }

    fn or(self, fallback: EventForm) -> EventForm {
        EventForm {
            event: self.event.or(fallback.event),
            date: self.date.or(fallback.date),
        }
    }

    fn from_json(bytes: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ApiError::BadRequest(format!("Failed to decode JSON object: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| ApiError::BadRequest("Expected a JSON object".to_string()))?;

        Ok(EventForm {
            event: json_text(object.get("event")),
            date: json_text(object.get("date")),
        })
    }

    // A repeated key keeps its first value.
    fn from_urlencoded(raw: &[u8]) -> Result<Self, ApiError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw)
            .map_err(|e| ApiError::BadRequest(format!("Failed to decode form data: {e}")))?;

        let mut form = EventForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "event" => {
                    form.event.get_or_insert(value);
                }
                "date" => {
                    form.date.get_or_insert(value);
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

// Scalars are accepted as text; null counts as missing.
fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl<S> FromRequest<S> for EventForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let from_query = match req.uri().query() {
            Some(query) => EventForm::from_urlencoded(query.as_bytes())?,
            None => EventForm::default(),
        };

        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let from_body = if body.is_empty() {
            EventForm::default()
        } else if is_json {
            EventForm::from_json(&body)?
        } else {
            EventForm::from_urlencoded(&body)?
        };

        Ok(from_body.or(from_query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn form(event: Option<&str>, date: Option<&str>) -> EventForm {
        EventForm {
            event: event.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    fn validation_fields(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation(fields) => fields,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_form_becomes_new_event() {
        let new_event = form(Some("Birthday"), Some("2024-02-29")).into_new_event().unwrap();
        assert_eq!(new_event.name, "Birthday");
        assert_eq!(new_event.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let fields = validation_fields(form(None, None).into_new_event().unwrap_err());
        assert_eq!(fields["event"], EVENT_REQUIRED_MESSAGE);
        assert_eq!(fields["date"], DATE_MESSAGE);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for date in [
            "2024-13-01",
            "2023-02-29",
            "01/02/2024",
            "tomorrow",
            "",
            "24-1-5",
            "5-01-01",
            "+10000-01-01",
            "-0001-01-01",
            "+2024-01-01",
            "0000-01-01",
            "2024-001-01",
            "2024-01-01-01",
            "2024-+1-01",
            " 2024-01-01",
        ] {
            let fields =
                validation_fields(form(Some("Party"), Some(date)).into_new_event().unwrap_err());
            assert_eq!(fields.len(), 1, "date {date:?}");
            assert_eq!(fields["date"], DATE_MESSAGE);
        }
    }

    #[test]
    fn short_month_and_day_are_normalized() {
        assert_eq!(parse_date("2024-1-5"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(parse_date("9999-12-31"), NaiveDate::from_ymd_opt(9999, 12, 31));
        assert_eq!(parse_date("0001-01-01"), NaiveDate::from_ymd_opt(1, 1, 1));
    }

    #[test]
    fn json_content_types_are_detected() {
        for content_type in [
            "application/json",
            "Application/JSON",
            "application/json; charset=utf-8",
            "application/vnd.api+json",
        ] {
            assert!(is_json_content_type(content_type), "{content_type}");
        }
        for content_type in ["application/x-www-form-urlencoded", "text/plain", "application/jsonp"] {
            assert!(!is_json_content_type(content_type), "{content_type}");
        }
    }

    #[test]
    fn repeated_form_keys_keep_the_first_value() {
        let parsed = EventForm::from_urlencoded(b"event=a&event=b&date=2024-01-01&date=oops&x=1").unwrap();
        assert_eq!(parsed.event.as_deref(), Some("a"));
        assert_eq!(parsed.date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let fields = validation_fields(form(Some(""), Some("2024-01-01")).into_new_event().unwrap_err());
        assert_eq!(fields["event"], event_length_message());
    }

    #[test]
    fn body_values_win_over_query_values() {
        let merged = form(Some("body"), None).or(form(Some("query"), Some("2024-01-01")));
        assert_eq!(merged.event.as_deref(), Some("body"));
        assert_eq!(merged.date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn json_scalars_are_read_as_text() {
        let parsed = EventForm::from_json(br#"{"event": 42, "date": null}"#).unwrap();
        assert_eq!(parsed.event.as_deref(), Some("42"));
        assert_eq!(parsed.date, None);

        assert!(matches!(
            EventForm::from_json(b"[1, 2]"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            EventForm::from_json(b"{not json"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn no_bounds_means_no_filter() {
        assert_eq!(DateRangeQuery::default().into_range().unwrap(), None);
    }

    #[test]
    fn both_bounds_produce_a_range() {
        let query = DateRangeQuery {
            start_time: Some("2024-01-01".to_string()),
            end_time: Some("2024-01-31".to_string()),
        };
        let range = query.into_range().unwrap().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn a_single_bound_is_a_validation_error() {
        let query = DateRangeQuery {
            start_time: Some("2024-01-01".to_string()),
            end_time: None,
        };
        let fields = validation_fields(query.into_range().unwrap_err());
        assert_eq!(fields.keys().copied().collect::<Vec<_>>(), ["end_time"]);
    }

    proptest! {
        #[test]
        fn names_up_to_the_column_width_are_accepted(name in "[a-zA-Zа-яА-Я0-9 ]{1,80}") {
            let new_event = form(Some(&name), Some("2024-05-05")).into_new_event();
            prop_assert!(new_event.is_ok());
        }

        #[test]
        fn longer_names_are_rejected_not_truncated(name in "[a-zа-я]{81,160}") {
            let err = form(Some(&name), Some("2024-05-05")).into_new_event().unwrap_err();
            let fields = validation_fields(err);
            prop_assert_eq!(fields.len(), 1);
            prop_assert_eq!(&fields["event"], &event_length_message());
        }
    }
}
