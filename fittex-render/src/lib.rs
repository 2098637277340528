pub mod render;
pub mod text;

pub use render::{Align, Scene, SceneRenderer};
