//! Review slot scheduling service.
//!
//! Faculty paste their weekly timetable; the service derives the free
//! intervals, splits them into fixed-duration candidates, and manages the
//! publication and booking of review slots for student teams.

pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod server;
pub mod timetable;
pub mod types;
