use chrono::{Local, SecondsFormat};

/// Current local time as RFC 3339 with microseconds and offset.
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Today's calendar date in the server's local timezone, `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};

    #[test]
    fn now_timestamp_is_rfc3339() {
        let ts = now_timestamp();
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok(), "{ts}");
    }

    #[test]
    fn today_is_iso_date() {
        let d = today();
        assert_eq!(d.len(), 10);
        assert!(NaiveDate::parse_from_str(&d, "%Y-%m-%d").is_ok());
    }
}
