//! Listing sync: pulls the external internship feed into the job store and
//! expires old rows.

pub mod client;
pub mod handlers;
pub mod runner;
