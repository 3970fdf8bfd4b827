pub mod invertible_map;

pub use invertible_map::InvertibleMap;
