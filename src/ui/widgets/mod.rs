//! Custom widgets

pub mod card;

pub use card::{ProductCard, CARD_HEIGHT};
