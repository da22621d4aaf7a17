pub mod app;
pub mod canvas;
pub mod config;
pub mod data;
pub mod game;
pub mod geo;
pub mod hash;
pub mod interaction;
pub mod map;
pub mod ui;
