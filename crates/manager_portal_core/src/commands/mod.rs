//! Page-level commands: each takes explicit inputs and a gateway and returns
//! a typed result, independent of any HTTP or UI event.

pub mod account;
pub mod business;
pub mod dashboard;
pub mod jobs;
pub mod products;
