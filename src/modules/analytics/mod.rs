mod service;

pub use service::AnalyticsService;
