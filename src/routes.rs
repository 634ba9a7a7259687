// customer crud operations
pub mod customers;
// health check and metrics
pub mod monitoring;
