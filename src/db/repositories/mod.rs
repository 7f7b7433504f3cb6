mod session_repository;
mod enrollment_repository;
mod trainee_repository;
mod instructor_repository;
mod car_repository;
mod exam_repository;
mod payment_repository;
mod reports_repository;

pub use session_repository::SessionRepository;
pub use enrollment_repository::EnrollmentRepository;
pub use trainee_repository::TraineeRepository;
pub use instructor_repository::InstructorRepository;
pub use car_repository::CarRepository;
pub use exam_repository::ExamRepository;
pub use payment_repository::PaymentRepository;
pub use reports_repository::ReportsRepository;
