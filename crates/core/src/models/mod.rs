pub mod conversion;
pub mod rates;
pub mod series;
pub mod settings;
pub mod window;
