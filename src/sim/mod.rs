pub mod event;
pub mod scheduler;
pub mod spawner;
pub mod step;
pub mod world;
