//! showtimes.rs
//!
//! Разворачивает окно проката фильма в сетку сеансов: по одной записи на
//! каждую дату окна, внутри неё по одному слоту на каждое время показа.
//! Каждый слот получает собственную копию схемы зала кинотеатра, так что
//! бронирование места в одном сеансе не видно ни в другом сеансе, ни в
//! базовой схеме.

use chrono::NaiveDate;
use thiserror::Error;

use crate::dates;
use crate::models::{SeatRow, Showtime, ShowtimeSlot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShowtimeError {
    #[error("Invalid date format '{0}'. Please use dd-mm-yyyy format.")]
    InvalidDateFormat(String),
    #[error("Start date cannot be after end date.")]
    InvalidDateRange,
    #[error("Theater does not have a seating layout configured.")]
    EmptySeatingTemplate,
    #[error("Booking window cannot be longer than {0} days.")]
    WindowTooLong(u32),
}

/// Предел длины окна по умолчанию; переопределяется `MAX_BOOKING_WINDOW_DAYS`.
pub const DEFAULT_MAX_WINDOW_DAYS: u32 = 366;

/// Окно проката, обе границы включительно.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BookingWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ShowtimeError> {
        Self::bounded(start, end, DEFAULT_MAX_WINDOW_DAYS)
    }

    /// Окно не длиннее `max_days` дней включительно.
    pub fn bounded(start: NaiveDate, end: NaiveDate, max_days: u32) -> Result<Self, ShowtimeError> {
        if start > end {
            return Err(ShowtimeError::InvalidDateRange);
        }
        if (end - start).num_days() >= i64::from(max_days) {
            return Err(ShowtimeError::WindowTooLong(max_days));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str, max_days: u32) -> Result<Self, ShowtimeError> {
        let start = dates::parse_date(start)
            .ok_or_else(|| ShowtimeError::InvalidDateFormat(start.to_string()))?;
        let end = dates::parse_date(end)
            .ok_or_else(|| ShowtimeError::InvalidDateFormat(end.to_string()))?;
        Self::bounded(start, end, max_days)
    }

    pub fn days(&self) -> usize {
        dates::dates_inclusive(self.start, self.end).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub showtimes: Vec<Showtime>,
    /// Число пар (дата, время).
    pub total: usize,
}

/// Разбирает даты `dd-mm-yyyy` и строит сетку сеансов.
pub fn expand(
    start: &str,
    end: &str,
    time_slots: &[String],
    template: &[SeatRow],
) -> Result<Expansion, ShowtimeError> {
    let window = BookingWindow::parse(start, end, DEFAULT_MAX_WINDOW_DAYS)?;
    expand_window(&window, time_slots, template)
}

/// Пустой список времён даёт дни без слотов; это не ошибка на этом уровне.
pub fn expand_window(
    window: &BookingWindow,
    time_slots: &[String],
    template: &[SeatRow],
) -> Result<Expansion, ShowtimeError> {
    if template.iter().all(|row| row.seats.is_empty()) {
        return Err(ShowtimeError::EmptySeatingTemplate);
    }

    let showtimes: Vec<Showtime> = dates::dates_inclusive(window.start, window.end)
        .map(|date| Showtime {
            date: dates::format_date(date),
            day: dates::weekday_name(date),
            times: time_slots
                .iter()
                .map(|time| ShowtimeSlot {
                    time: time.clone(),
                    seating_layout: template.to_vec(),
                })
                .collect(),
        })
        .collect();

    let total = showtimes.iter().map(|s| s.times.len()).sum();
    Ok(Expansion { showtimes, total })
}
