pub mod camera;
pub mod core;
pub mod loading;
pub mod splat;
pub mod systems;
