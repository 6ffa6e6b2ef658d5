pub mod movie;
pub mod seat;
pub mod theater;

pub use movie::{Movie, MovieListing, Showtime, ShowtimeListing, ShowtimeSlot};
pub use seat::{Seat, SeatCategory, SeatRow, SeatingLayout};
pub use theater::{Amenities, Location, Theater, TheaterListing, TheaterSummary};
