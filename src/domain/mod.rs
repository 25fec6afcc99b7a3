pub mod canvas;
pub mod enemy;
pub mod entity;
pub mod geometry;
pub mod motion;
