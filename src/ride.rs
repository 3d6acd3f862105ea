use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Body of `POST /rides/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRide {
    pub source: String,
    pub destination: String,
    /// Unix seconds
    pub departure_date: i64,
    pub price: i64,
    pub available_seats: i64,
}

/// A ride as `GET /rides/{id}` describes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RideSummary {
    pub source: String,
    pub destination: String,
    pub departure_date: i64,
    /// False once the driver cancelled the ride.
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Departure and arrival cities must be different")]
    SameCities,
    #[error("Invalid departure date '{0}'")]
    InvalidDate(String),
    #[error("Invalid departure time '{0}'")]
    InvalidTime(String),
    #[error("{0} must be a whole number")]
    NotANumber(&'static str),
}

/// The text buffers behind the ride creation form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RideDraft {
    pub source: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, seconds are tolerated
    pub time: String,
    pub available_seats: String,
    pub price: String,
}

impl RideDraft {
    /// Check the draft and turn it into a request body. `offset_at` decides
    /// which UTC offset the entered wall clock time is in.
    pub fn validate(
        &self,
        offset_at: &dyn Fn(PrimitiveDateTime) -> UtcOffset,
    ) -> Result<NewRide, DraftError> {
        let source = self.source.trim();
        let destination = self.destination.trim();
        if source == destination {
            return Err(DraftError::SameCities);
        }

        let departure_date = departure_timestamp(&self.date, &self.time, offset_at)?;
        let available_seats = parse_whole(&self.available_seats, "Seats")?;
        let price = parse_whole(&self.price, "Price")?;

        Ok(NewRide {
            source: source.to_owned(),
            destination: destination.to_owned(),
            departure_date,
            price,
            available_seats,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_whole(text: &str, field: &'static str) -> Result<i64, DraftError> {
    text.trim().parse().map_err(|_| DraftError::NotANumber(field))
}

/// Combine a date and a wall clock time into Unix seconds.
pub fn departure_timestamp(
    date: &str,
    time: &str,
    offset_at: &dyn Fn(PrimitiveDateTime) -> UtcOffset,
) -> Result<i64, DraftError> {
    let date_format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(date.trim(), &date_format)
        .map_err(|_| DraftError::InvalidDate(date.to_owned()))?;

    let short_format = format_description!("[hour]:[minute]");
    let long_format = format_description!("[hour]:[minute]:[second]");
    let trimmed = time.trim();
    let time = Time::parse(trimmed, &short_format)
        .or_else(|_| Time::parse(trimmed, &long_format))
        .map_err(|_| DraftError::InvalidTime(time.to_owned()))?;

    let moment = PrimitiveDateTime::new(date, time);
    Ok(moment.assume_offset(offset_at(moment)).unix_timestamp())
}

/// Offset of the local time zone at the wall clock time `moment`. Falls back
/// to `fallback` when the platform can't tell (e.g. when other threads are
/// running on unix).
pub fn local_offset_at(moment: PrimitiveDateTime, fallback: UtcOffset) -> UtcOffset {
    resolve_offset(moment, &|at| UtcOffset::local_offset_at(at).ok(), fallback)
}

/// Find the offset a wall clock time is in, given `lookup` which knows the
/// offset at any instant.
///
/// Around a daylight saving change the offsets a day before and a day after
/// differ. The earlier one wins when both fit (repeated hour), and it is also
/// used for times that do not exist (skipped hour), like a browser does.
fn resolve_offset(
    moment: PrimitiveDateTime,
    lookup: &dyn Fn(OffsetDateTime) -> Option<UtcOffset>,
    fallback: UtcOffset,
) -> UtcOffset {
    let day_before = moment.checked_sub(Duration::DAY).unwrap_or(moment);
    let day_after = moment.checked_add(Duration::DAY).unwrap_or(moment);
    let before = lookup(day_before.assume_utc()).unwrap_or(fallback);
    let after = lookup(day_after.assume_utc()).unwrap_or(before);
    if before == after {
        return lookup(moment.assume_offset(before)).unwrap_or(before);
    }

    let fits = |offset: UtcOffset| lookup(moment.assume_offset(offset)) == Some(offset);
    if !fits(before) && fits(after) {
        after
    } else {
        before
    }
}

/// `YYYY-MM-DD HH:MM` in the given offset, the raw number if that fails.
pub fn format_departure(timestamp: i64, offset: UtcOffset) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|moment| moment.to_offset(offset).format(&format).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    fn utc(_: PrimitiveDateTime) -> UtcOffset {
        UtcOffset::UTC
    }

    fn draft() -> RideDraft {
        RideDraft {
            source: "Cluj-Napoca".to_owned(),
            destination: "Sibiu".to_owned(),
            date: "2024-05-01".to_owned(),
            time: "10:00".to_owned(),
            available_seats: "3".to_owned(),
            price: "40".to_owned(),
        }
    }

    #[test]
    fn timestamp_of_local_date_time() {
        assert_eq!(departure_timestamp("2024-05-01", "10:00", &utc), Ok(1_714_557_600));
        // Bucharest summer time is three hours ahead of UTC
        let eest = |_: PrimitiveDateTime| offset!(+3);
        assert_eq!(
            departure_timestamp("2024-05-01", "10:00", &eest),
            Ok(1_714_557_600 - 3 * 3600)
        );
    }

    #[test]
    fn seconds_in_time_are_accepted() {
        assert_eq!(departure_timestamp("2024-05-01", "10:00:30", &utc), Ok(1_714_557_630));
    }

    #[test]
    fn bad_date_or_time() {
        assert_eq!(
            departure_timestamp("01.05.2024", "10:00", &utc),
            Err(DraftError::InvalidDate("01.05.2024".to_owned()))
        );
        assert_eq!(
            departure_timestamp("2024-05-01", "", &utc),
            Err(DraftError::InvalidTime(String::new()))
        );
    }

    #[test]
    fn same_cities_are_rejected_first() {
        let mut same = draft();
        same.destination = "Cluj-Napoca".to_owned();
        same.date = String::new();
        assert_eq!(same.validate(&utc), Err(DraftError::SameCities));
        assert_eq!(
            DraftError::SameCities.to_string(),
            "Departure and arrival cities must be different"
        );
    }

    #[test]
    fn valid_draft_becomes_payload() {
        let ride = draft().validate(&utc).unwrap();
        assert_eq!(
            ride,
            NewRide {
                source: "Cluj-Napoca".to_owned(),
                destination: "Sibiu".to_owned(),
                departure_date: 1_714_557_600,
                price: 40,
                available_seats: 3,
            }
        );
        let json = serde_json::to_value(&ride).unwrap();
        assert_eq!(json["departure_date"], 1_714_557_600);
        assert_eq!(json["available_seats"], 3);
    }

    #[test]
    fn seats_must_be_numbers() {
        let mut bad = draft();
        bad.available_seats = "three".to_owned();
        assert_eq!(bad.validate(&utc), Err(DraftError::NotANumber("Seats")));
    }

    #[test]
    fn reset_clears_everything() {
        let mut d = draft();
        d.reset();
        assert_eq!(d, RideDraft::default());
    }

    #[test]
    fn departure_is_formatted_in_offset() {
        assert_eq!(format_departure(1_714_557_600, UtcOffset::UTC), "2024-05-01 10:00");
        assert_eq!(format_departure(1_714_557_600, offset!(+3)), "2024-05-01 13:00");
    }

    #[test]
    fn summary_without_active_flag() {
        let ride: RideSummary = serde_json::from_str(
            r#"{"id": 4, "author_id": 1, "source": "Arad", "destination": "Iasi", "departure_date": 1714557600, "passenger_ids": []}"#,
        )
        .unwrap();
        assert!(ride.active);
    }

    /// Europe/Bucharest in 2024: +3 from 31 March 01:00 UTC to 27 October 01:00 UTC.
    fn bucharest(at: OffsetDateTime) -> Option<UtcOffset> {
        let summer = 1_711_846_800..1_729_990_800;
        Some(if summer.contains(&at.unix_timestamp()) {
            offset!(+3)
        } else {
            offset!(+2)
        })
    }

    fn in_bucharest(date: &str, time: &str) -> Result<i64, DraftError> {
        departure_timestamp(date, time, &|m| resolve_offset(m, &bucharest, offset!(+2)))
    }

    #[test]
    fn summer_time_holds_until_the_clocks_go_back() {
        assert_eq!(
            in_bucharest("2024-10-27", "02:30"),
            Ok(datetime!(2024-10-27 02:30 +3).unix_timestamp())
        );
        assert_eq!(in_bucharest("2024-10-27", "02:30"), Ok(1_729_985_400));
        // 03:30 happens twice, the first one is meant
        assert_eq!(
            in_bucharest("2024-10-27", "03:30"),
            Ok(datetime!(2024-10-27 03:30 +3).unix_timestamp())
        );
        assert_eq!(
            in_bucharest("2024-10-27", "05:00"),
            Ok(datetime!(2024-10-27 05:00 +2).unix_timestamp())
        );
    }

    #[test]
    fn spring_forward_day() {
        assert_eq!(
            in_bucharest("2024-03-31", "02:30"),
            Ok(datetime!(2024-03-31 02:30 +2).unix_timestamp())
        );
        // 03:30 is skipped, it is read with the winter offset
        assert_eq!(
            in_bucharest("2024-03-31", "03:30"),
            Ok(datetime!(2024-03-31 03:30 +2).unix_timestamp())
        );
        assert_eq!(
            in_bucharest("2024-03-31", "04:30"),
            Ok(datetime!(2024-03-31 04:30 +3).unix_timestamp())
        );
    }

    #[test]
    fn unknown_zone_uses_fallback() {
        let moment = datetime!(2024-05-01 10:00);
        assert_eq!(resolve_offset(moment, &|_| None, offset!(+3)), offset!(+3));
        assert_eq!(resolve_offset(moment, &bucharest, UtcOffset::UTC), offset!(+3));
    }
}
