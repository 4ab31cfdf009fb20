pub mod image_host;

pub use image_host::{ImageHost, UploadedImage};
