// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod http_response;
pub mod mock_repository;
pub mod nerdgraph_repository;
pub mod proxy_gateway;
pub mod query_catalog;
pub mod us_geo;
