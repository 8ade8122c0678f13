//! HTTP front end for the medical insurance cost predictor

pub mod api;
pub mod config;
