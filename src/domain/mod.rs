// Domain layer - Core models, no I/O
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod geo;
pub mod query_row;
pub mod tenant;
