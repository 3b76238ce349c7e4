//! HTTP API test suite.
//!
//! `test_auth` runs without external services. The remaining modules need a
//! running PostgreSQL (`DATABASE_URL`, `RUST_ENV=development`) and are
//! ignored by default.
//!
//! Run with: cargo test --test api -- --include-ignored

mod helpers;

mod test_auth;
mod test_clientes;
mod test_permisos;
mod test_registros;
