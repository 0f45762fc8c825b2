use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::api::{BatchApi, CourseApi, EnrollmentApi, PaymentApi, WaitlistApi};
use crate::error::AppError;
use crate::models::{EnrollmentStatus, PaymentStatus, Role};
use crate::reconcile::{reconcile, CourseState, CourseView};
use crate::services::enrollment_resolver::{EnrollOutcome, EnrollmentResolver};
use crate::session::Session;

/// Page-level flows over the catalog.
///
/// Every action ends with a full refetch; local state is never patched.
/// Requests are not retried.
pub struct CatalogService<B> {
    backend: Arc<B>,
    resolver: EnrollmentResolver<B>,
    session: Session,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub role: Option<Role>,
    pub total_courses: usize,
    pub enrolled_active: usize,
    pub enrolled_completed: usize,
    pub waitlisted: usize,
    pub pending_enrollments: usize,
    pub dropped_enrollments: usize,
    pub pending_payments: usize,
}

impl<B> CatalogService<B>
where
    B: CourseApi + BatchApi + EnrollmentApi + WaitlistApi + PaymentApi,
{
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        Self {
            resolver: EnrollmentResolver::new(backend.clone()),
            backend,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn resolver(&self) -> &EnrollmentResolver<B> {
        &self.resolver
    }

    /// Fetch courses, enrollments and waitlists concurrently and reconcile.
    pub async fn load(&self) -> Result<Vec<CourseView>, AppError> {
        let (courses, enrollments, waitlists) = tokio::try_join!(
            self.backend.get_courses(),
            self.backend.get_enrollments(),
            self.backend.get_waitlists(),
        )?;

        info!(
            "loaded {} courses, {} enrollments, {} waitlist entries",
            courses.len(),
            enrollments.len(),
            waitlists.len()
        );

        Ok(reconcile(&courses, &enrollments, &waitlists))
    }

    pub fn search<'a>(views: &'a [CourseView], term: &str) -> Vec<&'a CourseView> {
        views.iter().filter(|v| v.course.matches(term)).collect()
    }

    /// Enroll the logged-in student, then reload.
    pub async fn enroll(
        &self,
        course_id: i64,
        join_waitlist: bool,
    ) -> Result<(EnrollOutcome, Vec<CourseView>), AppError> {
        let student = self.session.require_student()?;

        if self.resolver.is_enrolled(course_id).await? {
            return Err(AppError::AlreadyEnrolled(
                "You are already enrolled in this course".to_string(),
            ));
        }

        let outcome = if join_waitlist {
            self.resolver.enroll_or_waitlist(course_id, student.id).await?
        } else {
            EnrollOutcome::Enrolled(self.resolver.enroll_in_course(course_id, student.id).await?)
        };

        let views = self.load().await?;
        Ok((outcome, views))
    }

    pub async fn cancel_waitlist(&self, waitlist_id: i64) -> Result<Vec<CourseView>, AppError> {
        self.session.require_user()?;
        self.backend.cancel_waitlist(waitlist_id).await?;
        self.load().await
    }

    pub async fn complete(&self, enrollment_id: i64) -> Result<Vec<CourseView>, AppError> {
        self.session.require_student()?;
        self.resolver.complete_enrollment(enrollment_id).await?;
        self.load().await
    }

    /// Counts for the current user's dashboard. The backend scopes every
    /// list by role, so the same call serves students, instructors and staff.
    pub async fn dashboard(&self) -> Result<DashboardSummary, AppError> {
        let user = self.session.require_user()?;

        let (courses, enrollments, waitlists, payments) = tokio::try_join!(
            self.backend.get_courses(),
            self.backend.get_enrollments(),
            self.backend.get_waitlists(),
            self.backend.get_payments(),
        )?;

        let views = reconcile(&courses, &enrollments, &waitlists);
        let count_state = |state: CourseState| views.iter().filter(|v| v.state == state).count();
        let count_status =
            |status: EnrollmentStatus| enrollments.iter().filter(|e| e.status == status).count();

        Ok(DashboardSummary {
            role: Some(user.role),
            total_courses: courses.len(),
            enrolled_active: count_state(CourseState::EnrolledActive),
            enrolled_completed: count_state(CourseState::EnrolledCompleted),
            waitlisted: count_state(CourseState::Waitlisted),
            pending_enrollments: count_status(EnrollmentStatus::Pending),
            dropped_enrollments: count_status(EnrollmentStatus::Dropped),
            pending_payments: payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Pending)
                .count(),
        })
    }
}
