pub mod services;
pub mod slot;

pub use services::{normalize_image, EncodedImage};
