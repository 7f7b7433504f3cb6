mod service;

pub use service::DashboardService;
