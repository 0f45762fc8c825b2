use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{BatchApi, EnrollmentApi, WaitlistApi};
use crate::error::AppError;
use crate::models::{
    Batch, Enrollment, EnrollmentStatus, NewEnrollmentRequest, UpdateEnrollmentRequest,
    WaitlistEntry,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EnrollOutcome {
    Enrolled(Enrollment),
    Waitlisted(WaitlistEntry),
}

/// Turns a (course, student) pair into an enrollment without the caller
/// knowing about batches.
///
/// Not idempotent: two calls for the same pair both attempt a create, and
/// only the backend rejects the duplicate.
pub struct EnrollmentResolver<B> {
    backend: Arc<B>,
}

impl<B> Clone for EnrollmentResolver<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

/// First batch in server order with a free seat. No load balancing.
pub fn select_batch(batches: &[Batch]) -> Option<&Batch> {
    batches.iter().find(|b| b.has_capacity())
}

impl<B> EnrollmentResolver<B>
where
    B: BatchApi + EnrollmentApi + WaitlistApi,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn enroll_in_course(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Enrollment, AppError> {
        let batches = self.course_batches(course_id).await?;
        self.enroll_into(course_id, student_id, &batches).await
    }

    /// Like [`enroll_in_course`](Self::enroll_in_course), but joins the
    /// waitlist of the course's first batch when every batch is full.
    pub async fn enroll_or_waitlist(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<EnrollOutcome, AppError> {
        let batches = self.course_batches(course_id).await?;

        match self.enroll_into(course_id, student_id, &batches).await {
            Ok(enrollment) => Ok(EnrollOutcome::Enrolled(enrollment)),
            Err(AppError::NoAvailableBatch { message, .. }) => {
                let Some(first) = batches.first() else {
                    return Err(AppError::NoAvailableBatch { course_id, message });
                };
                info!(
                    "course {} is full, joining waitlist of batch {}",
                    course_id, first.id
                );
                let entry = self.backend.join_waitlist(first.id).await?;
                Ok(EnrollOutcome::Waitlisted(entry))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn complete_enrollment(&self, enrollment_id: i64) -> Result<Enrollment, AppError> {
        let req = UpdateEnrollmentRequest {
            status: Some(EnrollmentStatus::Completed),
            ..Default::default()
        };
        let enrollment = self.backend.update_enrollment(enrollment_id, &req).await?;
        info!("enrollment {} marked completed", enrollment_id);
        Ok(enrollment)
    }

    /// Advisory pre-check. Two sessions can both pass it before either
    /// write lands.
    pub async fn is_enrolled(&self, course_id: i64) -> Result<bool, AppError> {
        let enrollments = self.backend.get_enrollments().await?;
        let live: Vec<&Enrollment> = enrollments.iter().filter(|e| e.status.is_live()).collect();

        if live.iter().any(|e| e.course_id() == Some(course_id)) {
            return Ok(true);
        }

        // list payloads carry only the batch id; map those through the course's batches
        let unresolved: Vec<i64> = live
            .iter()
            .filter(|e| e.course_id().is_none())
            .map(|e| e.batch)
            .collect();
        if unresolved.is_empty() {
            return Ok(false);
        }

        let batches = self.course_batches(course_id).await?;
        Ok(batches.iter().any(|b| unresolved.contains(&b.id)))
    }

    async fn course_batches(&self, course_id: i64) -> Result<Vec<Batch>, AppError> {
        let batches = self.backend.get_batches(course_id).await?;
        let total = batches.len();
        // the filter is applied server-side; keep the guard in case it is ignored
        let batches: Vec<Batch> = batches
            .into_iter()
            .filter(|b| b.course == course_id)
            .collect();
        if batches.len() != total {
            warn!(
                "backend returned {} batches of other courses for course {}",
                total - batches.len(),
                course_id
            );
        }
        Ok(batches)
    }

    async fn enroll_into(
        &self,
        course_id: i64,
        student_id: i64,
        batches: &[Batch],
    ) -> Result<Enrollment, AppError> {
        let Some(batch) = select_batch(batches) else {
            info!(
                "no batch with free seats for course {} ({} batches)",
                course_id,
                batches.len()
            );
            return Err(AppError::no_available_batch(course_id));
        };

        debug!(
            "selected batch {} ({} seats) for course {}",
            batch.id, batch.available_seats, course_id
        );

        let req = NewEnrollmentRequest {
            batch: batch.id,
            student: student_id,
            status: EnrollmentStatus::Active,
        };

        self.backend
            .create_enrollment(&req)
            .await
            .map_err(|e| classify_create_error(course_id, e))
    }
}

/// Tag the backend's rejection of a create-enrollment call once, here, so
/// callers never need to look at the text.
pub fn classify_create_error(course_id: i64, err: AppError) -> AppError {
    match err {
        AppError::Validation { status: 409, message } => AppError::AlreadyEnrolled(message),
        AppError::Validation { message, .. } if mentions(&message, "already enrolled") => {
            AppError::AlreadyEnrolled(message)
        }
        AppError::Validation { message, .. }
            if mentions(&message, "batch is full") || mentions(&message, "no available") =>
        {
            AppError::NoAvailableBatch { course_id, message }
        }
        other => other,
    }
}

fn mentions(message: &str, needle: &str) -> bool {
    message.to_lowercase().contains(needle)
}
