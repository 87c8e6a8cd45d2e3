//! Presenters - view state of the two pages of the app.
//!
//! They keep the page on screen, the sort and the selection, and turn user
//! actions into backend calls. Rendering is up to the caller.

mod garage;
mod random;
mod winners;

pub use garage::GaragePresenter;
pub use random::{is_hex_color, random_car, random_cars, random_color, random_name, GENERATED_CARS};
pub use winners::WinnersPresenter;
