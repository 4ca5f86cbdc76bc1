pub mod analytics_repository;
pub mod analytics_service;
pub mod dashboard_store;
pub mod drag_drop;
pub mod fetch_tracker;
pub mod notifications;
pub mod render_service;
pub mod session;
pub mod theme_service;
pub mod widget_data_service;
pub mod widget_renderer;

#[cfg(test)]
pub mod test_support;
