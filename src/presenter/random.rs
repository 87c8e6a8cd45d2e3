//! Random cars for the "generate" button.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::NewCar;

const BRANDS: [&str; 7] = ["Tesla", "Ford", "BMW", "Audi", "Mercedes", "Toyota", "Honda"];
const MODELS: [&str; 7] = ["Model S", "Mustang", "X5", "A4", "C-Class", "Camry", "Civic"];

/// How many cars one press of "generate" creates.
pub const GENERATED_CARS: usize = 100;

/// `"<brand> <model>"`, both picked at random.
pub fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let brand = BRANDS.choose(&mut rng).copied().unwrap_or(BRANDS[0]);
    let model = MODELS.choose(&mut rng).copied().unwrap_or(MODELS[0]);
    format!("{} {}", brand, model)
}

/// `#RRGGBB` with uppercase hex digits.
pub fn random_color() -> String {
    let rgb: u32 = rand::thread_rng().gen_range(0..=0xFF_FFFF);
    format!("#{:06X}", rgb)
}

pub fn random_car() -> NewCar {
    NewCar::new(random_name(), random_color())
}

pub fn random_cars(count: usize) -> Vec<NewCar> {
    (0..count).map(|_| random_car()).collect()
}

/// `#RRGGBB`, either case.
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
