//! Recipe catalog, ingredient matching and persisted favorites for pantry.

pub mod catalog;
pub mod controller;
pub mod db;
pub mod favorites;
pub mod matcher;
pub mod models;
pub mod service;
pub mod store;
