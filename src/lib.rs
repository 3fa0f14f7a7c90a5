// src/lib.rs

pub mod aggregate;
pub mod analyzer;
pub mod brush;
pub mod color;
pub mod config;
pub mod engine;
pub mod loader;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod renderer;
pub mod scale;
pub mod scatter;
pub mod scroll;
pub mod svg;
pub mod transition;
pub mod views;
