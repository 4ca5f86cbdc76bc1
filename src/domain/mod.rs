pub mod analytics;
pub mod dashboard;
pub mod error;
pub mod kpi;
pub mod tenant;
pub mod theme;
pub mod time_range;
pub mod widget;
