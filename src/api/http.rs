use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::dto::{
    self, CreatedEnrollment, ListResponse, LoginResponse, RefreshRequest, RefreshResponse,
};
use super::*;
use crate::config::ClientConfig;
use crate::error::AppError;

/// Upper bound on `next` links followed for a single list call.
const MAX_PAGES: usize = 100;

#[derive(Debug, Default, Clone)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// REST client for every backend resource.
///
/// Holds the bearer tokens of the current session. A request answered with
/// 401 is retried once after a successful refresh; a failed refresh drops
/// both tokens.
pub struct HttpApiClient {
    client: Client,
    config: ClientConfig,
    tokens: RwLock<Tokens>,
}

impl HttpApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {e}")))?;

        let tokens = Tokens {
            access: config.access_token.clone(),
            refresh: config.refresh_token.clone(),
        };

        Ok(Self {
            client,
            config,
            tokens: RwLock::new(tokens),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_url
    }

    pub async fn set_tokens(&self, pair: &TokenPair) {
        let mut tokens = self.tokens.write().await;
        tokens.access = Some(pair.access.clone());
        tokens.refresh = pair.refresh.clone();
    }

    pub async fn clear_tokens(&self) {
        *self.tokens.write().await = Tokens::default();
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.access.is_some()
    }

    fn url(&self, path: &str) -> String {
        // `next` links in paginated envelopes are absolute
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.config.api_url, path)
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, AppError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, &url);
        if let Some(token) = self.tokens.read().await.access.clone() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        refresh_on_401: bool,
    ) -> Result<String, AppError> {
        let response = self.dispatch(method.clone(), path, body.as_ref()).await?;

        let response = if refresh_on_401
            && response.status() == StatusCode::UNAUTHORIZED
            && self.refresh_access_token().await?
        {
            debug!("retrying {} {} with refreshed token", method, path);
            self.dispatch(method.clone(), path, body.as_ref()).await?
        } else {
            response
        };

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!("{} {} failed: {} {}", method, path, status, text);
            return Err(AppError::from_response(status, &text));
        }

        Ok(text)
    }

    async fn refresh_access_token(&self) -> Result<bool, AppError> {
        let Some(refresh) = self.tokens.read().await.refresh.clone() else {
            return Ok(false);
        };

        let response = self
            .client
            .post(self.url("/api/auth/refresh/"))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("token refresh rejected ({}), clearing session tokens", response.status());
            self.clear_tokens().await;
            return Ok(false);
        }

        let RefreshResponse { access } = response.json().await?;
        self.tokens.write().await.access = Some(access);
        info!("access token refreshed");
        Ok(true)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let text = self.execute(Method::GET, path, None, true).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Value,
    ) -> Result<T, AppError> {
        let text = self.execute(method, path, Some(body), true).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<(), AppError> {
        self.execute(method, path, None, true).await?;
        Ok(())
    }

    /// Fetch a list endpoint, accepting bare arrays and `{results: [...]}`
    /// envelopes alike, and following `next` links.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppError> {
        let mut items = Vec::new();
        let mut next = Some(path.to_string());
        let mut pages = 0;

        while let Some(page) = next.take() {
            let response: ListResponse<T> = self.get_json(&page).await?;
            next = response.next_page().map(str::to_string);
            items.extend(response.into_vec());

            pages += 1;
            if pages >= MAX_PAGES {
                if next.is_some() {
                    warn!("stopped following pagination of {} after {} pages", path, pages);
                }
                break;
            }
        }

        Ok(items)
    }
}

fn to_body<T: serde::Serialize>(req: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(req)?)
}

#[async_trait]
impl CourseApi for HttpApiClient {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        self.get_list("/api/courses/").await
    }

    async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        self.get_json(&format!("/api/courses/{id}/")).await
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, AppError> {
        let course: Course = self
            .send_json(Method::POST, "/api/courses/", to_body(req)?)
            .await?;
        info!("created course {} ({})", course.id, course.code);
        Ok(course)
    }

    async fn update_course(&self, id: i64, req: &NewCourseRequest) -> Result<Course, AppError> {
        self.send_json(Method::PUT, &format!("/api/courses/{id}/"), to_body(req)?)
            .await
    }

    async fn delete_course(&self, id: i64) -> Result<(), AppError> {
        self.send_empty(Method::DELETE, &format!("/api/courses/{id}/"))
            .await?;
        info!("deleted course {}", id);
        Ok(())
    }
}

#[async_trait]
impl BatchApi for HttpApiClient {
    async fn get_batches(&self, course_id: i64) -> Result<Vec<Batch>, AppError> {
        self.get_list(&format!("/api/batches/?course={course_id}"))
            .await
    }
}

#[async_trait]
impl EnrollmentApi for HttpApiClient {
    async fn get_enrollments(&self) -> Result<Vec<Enrollment>, AppError> {
        self.get_list("/api/enrollments/").await
    }

    async fn get_enrollment(&self, id: i64) -> Result<Enrollment, AppError> {
        self.get_json(&format!("/api/enrollments/{id}/")).await
    }

    async fn create_enrollment(&self, req: &NewEnrollmentRequest) -> Result<Enrollment, AppError> {
        let created: CreatedEnrollment = self
            .send_json(Method::POST, "/api/enrollments/", to_body(req)?)
            .await?;
        let enrollment = created.into_enrollment();
        info!(
            "created enrollment {} (student {}, batch {})",
            enrollment.id, enrollment.student, enrollment.batch
        );
        Ok(enrollment)
    }

    async fn update_enrollment(
        &self,
        id: i64,
        req: &UpdateEnrollmentRequest,
    ) -> Result<Enrollment, AppError> {
        self.send_json(
            Method::PATCH,
            &format!("/api/enrollments/{id}/"),
            to_body(req)?,
        )
        .await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<(), AppError> {
        self.send_empty(Method::DELETE, &format!("/api/enrollments/{id}/"))
            .await?;
        info!("deleted enrollment {}", id);
        Ok(())
    }
}

#[async_trait]
impl PaymentApi for HttpApiClient {
    async fn get_payments(&self) -> Result<Vec<Payment>, AppError> {
        self.get_list("/api/payments/").await
    }

    async fn get_payment(&self, id: i64) -> Result<Payment, AppError> {
        self.get_json(&format!("/api/payments/{id}/")).await
    }

    async fn create_payment(&self, req: &NewPaymentRequest) -> Result<Payment, AppError> {
        let payment: Payment = self
            .send_json(Method::POST, "/api/payments/", to_body(req)?)
            .await?;
        info!("created payment {} for enrollment {}", payment.id, payment.enrollment);
        Ok(payment)
    }

    async fn update_payment(
        &self,
        id: i64,
        req: &UpdatePaymentRequest,
    ) -> Result<Payment, AppError> {
        self.send_json(Method::PATCH, &format!("/api/payments/{id}/"), to_body(req)?)
            .await
    }
}

#[async_trait]
impl WaitlistApi for HttpApiClient {
    async fn get_waitlists(&self) -> Result<Vec<WaitlistEntry>, AppError> {
        self.get_list("/api/waitlists/").await
    }

    async fn join_waitlist(&self, batch_id: i64) -> Result<WaitlistEntry, AppError> {
        let entry: WaitlistEntry = self
            .send_json(
                Method::POST,
                "/api/waitlists/",
                to_body(&JoinWaitlistRequest { batch: batch_id })?,
            )
            .await?;
        info!(
            "joined waitlist for batch {} at position {:?}",
            batch_id, entry.position
        );
        Ok(entry)
    }

    async fn cancel_waitlist(&self, id: i64) -> Result<(), AppError> {
        self.send_empty(Method::POST, &format!("/api/waitlists/{id}/cancel/"))
            .await?;
        info!("cancelled waitlist entry {}", id);
        Ok(())
    }

    async fn get_waitlist_position(&self, batch_id: i64) -> Result<WaitlistPosition, AppError> {
        self.get_json(&format!("/api/waitlists/my_position/?batch={batch_id}"))
            .await
    }
}

#[async_trait]
impl ScheduleApi for HttpApiClient {
    async fn get_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        self.get_list("/api/schedules/").await
    }
}

#[async_trait]
impl AttendanceApi for HttpApiClient {
    async fn get_attendance(&self) -> Result<Vec<AttendanceRecord>, AppError> {
        self.get_list("/api/attendance/").await
    }
}

#[async_trait]
impl UserApi for HttpApiClient {
    async fn get_users(&self) -> Result<Vec<User>, AppError> {
        self.get_list("/api/users/").await
    }

    async fn create_user(&self, req: &NewUserRequest) -> Result<User, AppError> {
        let user: User = self
            .send_json(Method::POST, "/api/users/", to_body(req)?)
            .await?;
        info!("created user {} ({:?})", user.username, user.role);
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        self.send_empty(Method::DELETE, &format!("/api/users/{id}/"))
            .await?;
        info!("deleted user {}", id);
        Ok(())
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let body = to_body(&dto::LoginRequest { username, password })?;
        // a rejected login must not trigger the refresh path
        let text = self
            .execute(Method::POST, "/api/auth/login/", Some(body), false)
            .await?;
        let response: LoginResponse = serde_json::from_str(&text)?;

        self.set_tokens(&response.tokens).await;
        info!("logged in as {} ({:?})", response.user.username, response.user.role);
        Ok(response)
    }

    async fn get_profile(&self) -> Result<User, AppError> {
        self.get_json("/api/auth/profile/").await
    }

    async fn logout(&self) {
        self.clear_tokens().await;
        info!("session tokens cleared");
    }
}
