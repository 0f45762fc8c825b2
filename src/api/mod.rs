pub mod dto;
pub mod http;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::*;

pub use dto::{ListResponse, LoginResponse, TokenPair};
pub use http::HttpApiClient;

#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn get_course(&self, id: i64) -> Result<Course, AppError>;
    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, AppError>;
    async fn update_course(&self, id: i64, req: &NewCourseRequest) -> Result<Course, AppError>;
    async fn delete_course(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait BatchApi: Send + Sync {
    /// Batches of one course, in server order.
    async fn get_batches(&self, course_id: i64) -> Result<Vec<Batch>, AppError>;
}

#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    async fn get_enrollments(&self) -> Result<Vec<Enrollment>, AppError>;
    async fn get_enrollment(&self, id: i64) -> Result<Enrollment, AppError>;
    async fn create_enrollment(&self, req: &NewEnrollmentRequest) -> Result<Enrollment, AppError>;
    async fn update_enrollment(
        &self,
        id: i64,
        req: &UpdateEnrollmentRequest,
    ) -> Result<Enrollment, AppError>;
    async fn delete_enrollment(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn get_payments(&self) -> Result<Vec<Payment>, AppError>;
    async fn get_payment(&self, id: i64) -> Result<Payment, AppError>;
    async fn create_payment(&self, req: &NewPaymentRequest) -> Result<Payment, AppError>;
    async fn update_payment(&self, id: i64, req: &UpdatePaymentRequest)
    -> Result<Payment, AppError>;
}

#[async_trait]
pub trait WaitlistApi: Send + Sync {
    async fn get_waitlists(&self) -> Result<Vec<WaitlistEntry>, AppError>;
    async fn join_waitlist(&self, batch_id: i64) -> Result<WaitlistEntry, AppError>;
    async fn cancel_waitlist(&self, id: i64) -> Result<(), AppError>;
    async fn get_waitlist_position(&self, batch_id: i64) -> Result<WaitlistPosition, AppError>;
}

#[async_trait]
pub trait ScheduleApi: Send + Sync {
    async fn get_schedules(&self) -> Result<Vec<Schedule>, AppError>;
}

#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn get_attendance(&self) -> Result<Vec<AttendanceRecord>, AppError>;
}

/// Admin-only user management.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn get_users(&self) -> Result<Vec<User>, AppError>;
    async fn create_user(&self, req: &NewUserRequest) -> Result<User, AppError>;
    async fn delete_user(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Authenticates and keeps the returned tokens for later calls.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError>;
    async fn get_profile(&self) -> Result<User, AppError>;
    /// Client-side only: forgets the stored tokens.
    async fn logout(&self);
}
