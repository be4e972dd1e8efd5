//! Library exports for the URL shortener application
//!
//! This module exposes internal components for testing and potential library usage.

pub mod config;
pub mod database;
pub mod digest;
pub mod error;
pub mod handler;
pub mod model;
pub mod route;
pub mod service;
pub mod store;
