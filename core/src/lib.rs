pub mod aggregate;
pub mod backup;
pub mod calendar;
pub mod csv_export;
pub mod food_import;
pub mod lookup;
pub mod models;
pub mod service;
pub mod store;
