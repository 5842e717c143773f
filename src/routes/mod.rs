pub mod attendance;

pub mod auth;

pub mod classes;

pub mod dashboard;

pub mod enrollments;

pub mod marks;

pub mod subjects;

pub mod teaching_assignments;

pub mod users;

pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use dashboard::configure_dashboard_routes;
pub use enrollments::configure_enrollment_routes;
pub use marks::configure_mark_routes;
pub use subjects::configure_subject_routes;
pub use teaching_assignments::configure_teaching_assignment_routes;
pub use users::configure_user_routes;
