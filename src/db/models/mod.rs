mod session;
mod enrollment;
mod trainee;
mod instructor;
mod exam;
mod payment;
mod report;
mod dashboard;

/// Primary key type shared by every table.
pub type DbId = i64;

pub use session::*;
pub use enrollment::*;
pub use trainee::*;
pub use instructor::*;
pub use exam::*;
pub use payment::*;
pub use report::*;
pub use dashboard::*;
