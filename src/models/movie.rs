use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::seat::SeatingLayout;
use crate::dates::serde_dmy;

/// Один сеанс внутри дня: метка времени и собственная схема зала.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowtimeSlot {
    pub time: String,
    pub seating_layout: SeatingLayout,
}

/// Все сеансы фильма за одну календарную дату.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    /// `dd-mm-yyyy`
    pub date: String,
    pub day: String,
    pub times: Vec<ShowtimeSlot>,
}

impl Showtime {
    pub fn slot(&self, time: &str) -> Option<&ShowtimeSlot> {
        self.times.iter().find(|t| t.time == time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub duration: u32,
    pub rating: String,
    pub description: String,
    pub poster: String,
    pub language: String,
    #[serde(with = "serde_dmy")]
    pub start_date: NaiveDate,
    #[serde(with = "serde_dmy")]
    pub end_date: NaiveDate,
    pub showtimes: Vec<Showtime>,
}

impl Movie {
    pub fn showtime(&self, date: &str) -> Option<&Showtime> {
        self.showtimes.iter().find(|s| s.date == date)
    }

    pub fn total_showtimes(&self) -> usize {
        self.showtimes.iter().map(|s| s.times.len()).sum()
    }
}

// --- Проекции для публичного API (без схем зала) ---

#[derive(Debug, Clone, Serialize)]
pub struct ShowtimeListing {
    pub date: String,
    pub day: String,
    pub times: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieListing {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub duration: u32,
    pub rating: String,
    pub description: String,
    pub poster: String,
    pub language: String,
    #[serde(with = "serde_dmy")]
    pub start_date: NaiveDate,
    #[serde(with = "serde_dmy")]
    pub end_date: NaiveDate,
    pub showtimes: Vec<ShowtimeListing>,
}

impl From<&Movie> for MovieListing {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.clone(),
            title: movie.title.clone(),
            genre: movie.genre.clone(),
            duration: movie.duration,
            rating: movie.rating.clone(),
            description: movie.description.clone(),
            poster: movie.poster.clone(),
            language: movie.language.clone(),
            start_date: movie.start_date,
            end_date: movie.end_date,
            showtimes: movie
                .showtimes
                .iter()
                .map(|s| ShowtimeListing {
                    date: s.date.clone(),
                    day: s.day.clone(),
                    times: s.times.iter().map(|t| t.time.clone()).collect(),
                })
                .collect(),
        }
    }
}
