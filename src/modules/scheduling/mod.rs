mod service;

pub use service::SessionService;
