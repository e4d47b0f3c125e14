pub mod config;
pub mod controller;
pub mod error;
pub mod facilities;
pub mod io;
pub mod logging;
pub mod population;
pub mod random;
pub mod relocator;
pub mod zones;
