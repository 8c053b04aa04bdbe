#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod api;
pub mod app;
pub mod clients;
pub mod config;
pub mod dataset;
pub mod insights;
pub mod observability;
pub mod sentiment;
pub mod translation;
pub mod util;
