// configuration
pub mod configuration;
// logging
pub mod logging;
// domain model
pub mod model;
// routes
pub mod routes;
// service code for abstracting and running the web service
pub mod service;
// persistence of the customer list
pub mod store;
