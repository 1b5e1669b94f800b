pub mod grid;
pub mod loader;
pub mod preprocessing;
pub mod transforms;

pub use grid::PixelGrid;
pub use loader::ImageLoader;
pub use preprocessing::{ImagePreprocessor, NormalizedTensor, Normalization};
pub use transforms::ImageTransforms;
