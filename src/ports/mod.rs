//! Port traits: the boundary between the analysis core and the outside world.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
pub mod report_port;
