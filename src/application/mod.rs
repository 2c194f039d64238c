// Application layer - Use cases and repository ports
pub mod analytics_repository;
pub mod chart_transformers;
pub mod dashboard_service;
pub mod refresh_service;
