use serde::{Deserialize, Serialize};
use std::fmt;

/// Категория места. На проводе: `balcony`, `firstclass`, `secondclass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatCategory {
    Balcony,
    FirstClass,
    SecondClass,
}

impl SeatCategory {
    pub const ALL: [SeatCategory; 3] = [Self::Balcony, Self::FirstClass, Self::SecondClass];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balcony => "balcony",
            Self::FirstClass => "firstclass",
            Self::SecondClass => "secondclass",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for SeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub number: String,
    pub category: SeatCategory,
    pub price: f64,
    #[serde(default = "default_available")]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRow {
    pub row: String,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl SeatRow {
    pub fn seat(&self, number: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.number == number)
    }
}

/// Схема зала: упорядоченный список рядов. Каждый сеанс владеет своей копией.
pub type SeatingLayout = Vec<SeatRow>;
