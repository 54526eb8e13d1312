pub mod conversion_engine;
pub mod series_builder;
pub mod window_controller;
