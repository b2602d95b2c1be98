//! # IO Module
//!
//! Interfaces that expose the domain to collaborators. Currently the REST
//! API consumed by the web front end and report tooling.

pub mod rest;
