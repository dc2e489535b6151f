use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{CourseId, Mark, StudentId, SubjectCode},
    error::{ApiErrorBody, ErrorCode},
    protocol::{SaveInternalMarkRequest, StudentsViewResponse},
};
use tracing::{debug, info};
use url::Url;

use crate::{LoadFailure, PersistContext, PersistFailure, PersistenceClient, ViewLoader, ViewSnapshot};

/// REST client for the evaluator endpoints of the marks backend.
#[derive(Debug, Clone)]
pub struct HttpMarksClient {
    http: Client,
    server_url: Url,
}

impl HttpMarksClient {
    pub fn new(server_url: Url) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: Url) -> Self {
        Self { http, server_url }
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| format!("server url cannot be a base: {}", self.server_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn error_message(response: Response) -> Option<String> {
    let body = response.bytes().await.unwrap_or_default();
    ApiErrorBody::from_bytes(&body).message
}

#[async_trait]
impl ViewLoader for HttpMarksClient {
    async fn fetch_view(
        &self,
        course_id: &CourseId,
        subject_code: &SubjectCode,
    ) -> Result<ViewSnapshot, LoadFailure> {
        let url = self
            .endpoint(&[
                "evaluators",
                "students",
                course_id.as_str(),
                subject_code.as_str(),
            ])
            .map_err(LoadFailure::Network)?;
        debug!(%url, "view: fetching students");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| LoadFailure::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let code = ErrorCode::from_status(status.as_u16());
            let message = error_message(response).await;
            return Err(match code {
                ErrorCode::Forbidden => LoadFailure::Forbidden,
                ErrorCode::NotFound => LoadFailure::NotFound,
                _ => LoadFailure::Server {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: StudentsViewResponse =
            response
                .json()
                .await
                .map_err(|err| LoadFailure::Server {
                    status: status.as_u16(),
                    message: Some(format!("invalid students payload: {err}")),
                })?;
        Ok(body.into())
    }
}

#[async_trait]
impl PersistenceClient for HttpMarksClient {
    async fn persist(
        &self,
        student_id: &StudentId,
        mark: Mark,
        context: &PersistContext,
    ) -> Result<(), PersistFailure> {
        let url = self
            .endpoint(&["evaluators", "internal-marks"])
            .map_err(PersistFailure::Network)?;
        let request = SaveInternalMarkRequest {
            student_id: student_id.clone(),
            course_id: context.course_id.clone(),
            subject_code: context.subject_code.clone(),
            subject_name: context.subject_name.clone(),
            internal_marks: mark.value(),
        };
        info!(
            student_id = %student_id,
            course_id = %context.course_id,
            subject_code = %context.subject_code,
            internal_marks = mark.value(),
            "autosave: saving internal marks"
        );

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| PersistFailure::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistFailure::Rejected {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
