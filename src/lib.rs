//! Gastos server library.
//!
//! HTTP API for expense requests (gastos) and client price quotations
//! (cotizaciones): validation guards, persistence, S3 document storage and
//! PDF rendering.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod validation;
