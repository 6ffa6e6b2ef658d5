//! Календарные утилиты: формат `dd-mm-yyyy`, названия дней недели,
//! обход диапазона дат включительно.

use chrono::{Days, NaiveDate};

pub const DATE_FORMAT: &str = "%d-%m-%Y";

// Ровно две, две и четыре цифры: `%Y` сам по себе примет и `25`
fn has_dmy_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Разбирает дату в формате `dd-mm-yyyy`. Несуществующие даты (31-02-2025)
/// отвергаются, а не переносятся на следующий месяц.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if !has_dmy_shape(input) {
        return None;
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Английское название дня недели ("Monday"). Только для отображения.
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Все даты от `start` до `end` включительно. Пусто, если `start > end`.
pub fn dates_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(move |d| *d <= end)
}

/// serde-адаптер для полей `NaiveDate`, хранимых как `dd-mm-yyyy`.
pub mod serde_dmy {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw)))
    }
}
