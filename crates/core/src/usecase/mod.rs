pub mod api;
pub mod app_service;
pub mod refine;
