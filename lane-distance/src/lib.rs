//! Lane distance service.
//!
//! Resolves logistics lane endpoints to coordinates (UN/LOCODE table first,
//! then a persistent geocode cache, then a rate-limited geocoder) and
//! computes great-circle distances between them.

pub mod batch;
pub mod config;
pub mod distance;
pub mod domain;
pub mod geocache;
pub mod geocoder;
pub mod locodes;
pub mod resolver;
pub mod web;
