pub mod event;
pub mod level;
pub mod scene;
pub mod step;
pub mod world;
