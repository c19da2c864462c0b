//! Attendance reconstruction and bunk advice over a weekly timetable.
pub mod advisor;
pub mod attendance;
pub mod config;
pub mod grouping;
pub mod models;
pub mod report;
pub mod schedule;
pub mod store;
