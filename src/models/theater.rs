use serde::{Deserialize, Serialize};

use super::movie::{Movie, MovieListing};
use super::seat::SeatingLayout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amenities {
    #[serde(default)]
    pub facilities: Vec<String>,
}

/// Документ кинотеатра целиком: фильмы, сеансы и схемы залов вложены.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theater {
    pub id: String,
    pub name: String,
    pub location: Location,
    #[serde(default)]
    pub amenities: Amenities,
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub seating_layout: SeatingLayout,
}

impl Theater {
    pub fn movie(&self, movie_id: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == movie_id)
    }

    /// Есть хотя бы одно место в базовой схеме.
    pub fn has_seating_layout(&self) -> bool {
        self.seating_layout.iter().any(|row| !row.seats.is_empty())
    }
}

/// `GET /theater`: только идентификация и адрес.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheaterSummary {
    pub id: String,
    pub name: String,
    pub location: Location,
}

impl From<&Theater> for TheaterSummary {
    fn from(t: &Theater) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            location: t.location.clone(),
        }
    }
}

/// `GET /theater/{id}` и `/search`: без удобств, базовой схемы и схем сеансов.
#[derive(Debug, Clone, Serialize)]
pub struct TheaterListing {
    pub id: String,
    pub name: String,
    pub location: Location,
    pub movies: Vec<MovieListing>,
}

impl TheaterListing {
    pub fn new(theater: &Theater, movies: Vec<MovieListing>) -> Self {
        Self {
            id: theater.id.clone(),
            name: theater.name.clone(),
            location: theater.location.clone(),
            movies,
        }
    }
}

impl From<&Theater> for TheaterListing {
    fn from(t: &Theater) -> Self {
        Self::new(t, t.movies.iter().map(MovieListing::from).collect())
    }
}
