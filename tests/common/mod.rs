#![allow(dead_code)]


use std::sync::Mutex;

use async_trait::async_trait;

use institute_client::api::{BatchApi, CourseApi, EnrollmentApi, PaymentApi, WaitlistApi};
use institute_client::error::AppError;
use institute_client::models::*;

pub const STUDENT_ID: i64 = 9;

#[derive(Default)]
pub struct State {
    pub courses: Vec<Course>,
    pub batches: Vec<Batch>,
    pub enrollments: Vec<Enrollment>,
    pub waitlists: Vec<WaitlistEntry>,
    pub payments: Vec<Payment>,
    pub create_enrollment_calls: usize,
    /// When set, every create-enrollment call fails validation with this text.
    pub create_rejection: Option<String>,
    pub next_id: i64,
}

/// In-memory stand-in for the REST backend.
///
/// Mirrors the server's create-enrollment checks: a full batch is rejected
/// with "Batch is full" and a second enrollment in the same course with
/// "Student is already enrolled in this batch".
pub struct FakeBackend {
    pub state: Mutex<State>,
    /// The authenticated user for calls that take no explicit student.
    pub current_student: i64,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
            current_student: STUDENT_ID,
        }
    }

    pub fn with_course(self, id: i64, name: &str, code: &str) -> Self {
        self.state.lock().unwrap().courses.push(course(id, name, code));
        self
    }

    pub fn with_batch(self, id: i64, course_id: i64, seats: i64) -> Self {
        self.state.lock().unwrap().batches.push(batch(id, course_id, seats));
        self
    }

    pub fn with_enrollment(self, enrollment: Enrollment) -> Self {
        self.state.lock().unwrap().enrollments.push(enrollment);
        self
    }

    pub fn with_waitlist(self, entry: WaitlistEntry) -> Self {
        self.state.lock().unwrap().waitlists.push(entry);
        self
    }

    pub fn with_payment(self, payment: Payment) -> Self {
        self.state.lock().unwrap().payments.push(payment);
        self
    }

    pub fn rejecting_creates(self, message: &str) -> Self {
        self.state.lock().unwrap().create_rejection = Some(message.to_string());
        self
    }

    pub fn create_enrollment_calls(&self) -> usize {
        self.state.lock().unwrap().create_enrollment_calls
    }

    pub fn seats(&self, batch_id: i64) -> i64 {
        self.state
            .lock()
            .unwrap()
            .batches
            .iter()
            .find(|b| b.id == batch_id)
            .map(|b| b.available_seats)
            .unwrap_or_default()
    }
}

pub fn course(id: i64, name: &str, code: &str) -> Course {
    Course {
        id,
        name: name.to_string(),
        code: code.to_string(),
        description: Some(format!("{name} description")),
        duration_weeks: Some(8),
        credits: Some(3),
        fee: Some("1500.00".to_string()),
        available_seats: None,
        is_active: Some(true),
    }
}

pub fn batch(id: i64, course_id: i64, seats: i64) -> Batch {
    Batch {
        id,
        course: course_id,
        available_seats: seats,
        batch_number: Some(format!("B{id}")),
        capacity: Some(30),
        enrolled_count: Some(30 - seats.max(0)),
        instructor_name: None,
        start_date: None,
        end_date: None,
        is_active: Some(true),
    }
}

pub fn enrollment(id: i64, batch_id: i64, course_id: i64, status: EnrollmentStatus) -> Enrollment {
    Enrollment {
        id,
        student: STUDENT_ID,
        batch: batch_id,
        course: Some(course_id),
        batch_details: None,
        status,
        enrollment_date: Some("2026-09-01".to_string()),
        progress: Some(0.0),
        course_name: None,
        course_code: None,
        grade: None,
    }
}

/// An enrollment as the list endpoint sends it: no course id, only the
/// batch id and the course code.
pub fn listed_enrollment(id: i64, batch_id: i64, code: &str, status: EnrollmentStatus) -> Enrollment {
    Enrollment {
        course: None,
        course_code: Some(code.to_string()),
        ..enrollment(id, batch_id, 0, status)
    }
}

/// A waiting entry without a course id, matched on its course code.
pub fn listed_waiting(id: i64, batch_id: i64, code: &str, position: u32) -> WaitlistEntry {
    WaitlistEntry {
        course: None,
        course_code: Some(code.to_string()),
        ..waiting(id, batch_id, 0, position)
    }
}

pub fn waiting(id: i64, batch_id: i64, course_id: i64, position: u32) -> WaitlistEntry {
    WaitlistEntry {
        id,
        student: STUDENT_ID,
        batch: batch_id,
        position: Some(position),
        status: WaitlistStatus::Waiting,
        course: Some(course_id),
        course_code: None,
        batch_number: None,
        created_at: None,
    }
}

pub fn payment(id: i64, enrollment_id: i64, status: PaymentStatus) -> Payment {
    Payment {
        id,
        enrollment: enrollment_id,
        amount: Some("1500.00".to_string()),
        status,
        payment_method: Some("cash".to_string()),
        transaction_id: None,
        payment_date: None,
        course_name: None,
    }
}

fn validation(message: &str) -> AppError {
    AppError::Validation {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl CourseApi for FakeBackend {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.state.lock().unwrap().courses.clone())
    }

    async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        self.state
            .lock()
            .unwrap()
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("No Course matches the given query.".to_string()))
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, AppError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = course(state.next_id, &req.name, &req.code);
        state.courses.push(created.clone());
        Ok(created)
    }

    async fn update_course(&self, id: i64, req: &NewCourseRequest) -> Result<Course, AppError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("No Course matches the given query.".to_string()))?;
        existing.name = req.name.clone();
        existing.code = req.code.clone();
        Ok(existing.clone())
    }

    async fn delete_course(&self, id: i64) -> Result<(), AppError> {
        self.state.lock().unwrap().courses.retain(|c| c.id != id);
        Ok(())
    }
}

#[async_trait]
impl BatchApi for FakeBackend {
    async fn get_batches(&self, course_id: i64) -> Result<Vec<Batch>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .batches
            .iter()
            .filter(|b| b.course == course_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EnrollmentApi for FakeBackend {
    async fn get_enrollments(&self) -> Result<Vec<Enrollment>, AppError> {
        Ok(self.state.lock().unwrap().enrollments.clone())
    }

    async fn get_enrollment(&self, id: i64) -> Result<Enrollment, AppError> {
        self.state
            .lock()
            .unwrap()
            .enrollments
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("No Enrollment matches the given query.".to_string()))
    }

    async fn create_enrollment(&self, req: &NewEnrollmentRequest) -> Result<Enrollment, AppError> {
        let mut state = self.state.lock().unwrap();
        state.create_enrollment_calls += 1;
        if let Some(message) = &state.create_rejection {
            return Err(validation(message));
        }

        let Some(batch) = state.batches.iter().find(|b| b.id == req.batch).cloned() else {
            return Err(AppError::NotFound("No Batch matches the given query.".to_string()));
        };
        if batch.available_seats <= 0 {
            return Err(validation("Batch is full"));
        }
        let duplicate = state.enrollments.iter().any(|e| {
            let course = e.course_id().or_else(|| {
                state.batches.iter().find(|b| b.id == e.batch).map(|b| b.course)
            });
            e.student == req.student && course == Some(batch.course) && e.status.is_live()
        });
        if duplicate {
            return Err(validation("Student is already enrolled in this batch"));
        }

        state.next_id += 1;
        let created = Enrollment {
            id: state.next_id,
            student: req.student,
            ..enrollment(0, batch.id, batch.course, req.status)
        };
        state.enrollments.push(created.clone());
        if let Some(b) = state.batches.iter_mut().find(|b| b.id == batch.id) {
            b.available_seats -= 1;
        }
        Ok(created)
    }

    async fn update_enrollment(
        &self,
        id: i64,
        req: &UpdateEnrollmentRequest,
    ) -> Result<Enrollment, AppError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .enrollments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound("No Enrollment matches the given query.".to_string()))?;
        if let Some(status) = req.status {
            existing.status = status;
        }
        if let Some(grade) = &req.grade {
            existing.grade = Some(grade.clone());
        }
        Ok(existing.clone())
    }

    async fn delete_enrollment(&self, id: i64) -> Result<(), AppError> {
        self.state.lock().unwrap().enrollments.retain(|e| e.id != id);
        Ok(())
    }
}

#[async_trait]
impl WaitlistApi for FakeBackend {
    async fn get_waitlists(&self) -> Result<Vec<WaitlistEntry>, AppError> {
        Ok(self.state.lock().unwrap().waitlists.clone())
    }

    async fn join_waitlist(&self, batch_id: i64) -> Result<WaitlistEntry, AppError> {
        let mut state = self.state.lock().unwrap();
        let Some(course_id) = state.batches.iter().find(|b| b.id == batch_id).map(|b| b.course)
        else {
            return Err(AppError::NotFound("No Batch matches the given query.".to_string()));
        };
        let position = state
            .waitlists
            .iter()
            .filter(|w| w.batch == batch_id && w.is_waiting())
            .count() as u32
            + 1;
        state.next_id += 1;
        let entry = WaitlistEntry {
            student: self.current_student,
            ..waiting(state.next_id, batch_id, course_id, position)
        };
        state.waitlists.push(entry.clone());
        Ok(entry)
    }

    async fn cancel_waitlist(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .waitlists
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::NotFound("Waitlist entry not found".to_string()))?;
        if !entry.is_waiting() {
            return Err(validation("Only waiting entries can be cancelled"));
        }
        entry.status = WaitlistStatus::Cancelled;
        Ok(())
    }

    async fn get_waitlist_position(&self, batch_id: i64) -> Result<WaitlistPosition, AppError> {
        let state = self.state.lock().unwrap();
        let waiting: Vec<_> = state
            .waitlists
            .iter()
            .filter(|w| w.batch == batch_id && w.is_waiting())
            .collect();
        let mine = waiting.iter().find(|w| w.student == self.current_student);
        Ok(WaitlistPosition {
            position: mine.and_then(|w| w.position),
            total_waiting: Some(waiting.len() as u32),
            status: mine.map(|w| w.status),
        })
    }
}

#[async_trait]
impl PaymentApi for FakeBackend {
    async fn get_payments(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.state.lock().unwrap().payments.clone())
    }

    async fn get_payment(&self, id: i64) -> Result<Payment, AppError> {
        self.state
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("No Payment matches the given query.".to_string()))
    }

    async fn create_payment(&self, req: &NewPaymentRequest) -> Result<Payment, AppError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = Payment {
            amount: Some(req.amount.clone()),
            ..payment(state.next_id, req.enrollment, PaymentStatus::Pending)
        };
        state.payments.push(created.clone());
        Ok(created)
    }

    async fn update_payment(
        &self,
        id: i64,
        req: &UpdatePaymentRequest,
    ) -> Result<Payment, AppError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("No Payment matches the given query.".to_string()))?;
        if let Some(status) = req.status {
            existing.status = status;
        }
        Ok(existing.clone())
    }
}
