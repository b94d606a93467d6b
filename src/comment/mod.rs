pub mod aggregate;
pub mod controller;
pub mod index;
pub mod latch;
pub mod model;
pub mod service;
pub mod store;
