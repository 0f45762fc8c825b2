pub mod attendance;
pub mod batch;
pub mod course;
pub mod enrollment;
pub mod payment;
pub mod schedule;
pub mod user;
pub mod waitlist;
pub(crate) mod wire;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use batch::Batch;
pub use course::{Course, NewCourseRequest};
pub use enrollment::{
    BatchRef, Enrollment, EnrollmentStatus, NewEnrollmentRequest, UpdateEnrollmentRequest,
};
pub use payment::{NewPaymentRequest, Payment, PaymentStatus, UpdatePaymentRequest};
pub use schedule::Schedule;
pub use user::{NewUserRequest, Role, User};
pub use waitlist::{JoinWaitlistRequest, WaitlistEntry, WaitlistPosition, WaitlistStatus};
