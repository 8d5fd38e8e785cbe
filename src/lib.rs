//! Scheduling timeline for the finishing-contractor back office.
//!
//! Tasks and milestones are read from the back-office API and projected into
//! two views: a calendar event list and a Gantt chart. Both projections are
//! pure recomputations from the current collections; records whose dates
//! cannot be read are left out and degenerate ranges are widened to one day.

pub mod api;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod gantt;
pub mod locale;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod storage;
pub mod timeline;
pub mod tui;
