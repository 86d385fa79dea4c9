//! Typed client for the momentum REST API.

use std::time::Duration;

use momentum_shared::{
  Comment,
  CommentCreate,
  Department,
  DepartmentId,
  Employee,
  EmployeeId,
  Priority,
  Status,
  Task,
  TaskCreate,
  TaskId,
  TaskStatusUpdate
};
use reqwest::multipart;
use reqwest::{
  Method,
  RequestBuilder,
  StatusCode
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{
  debug,
  warn
};

use crate::error::{
  ClientError,
  Result
};

pub const API_BASE_URL: &str =
  "https://momentum.redberryinternship.ge/api";

/// Token captured at build time; may be absent in development builds.
pub const BUILD_API_TOKEN: Option<
  &str
> = option_env!("MOMENTUM_API_TOKEN");

/// Multipart body of `POST /employees`.
#[derive(Debug, Clone)]
pub struct EmployeeUpload {
  pub name:          String,
  pub surname:       String,
  pub department_id: DepartmentId,
  pub avatar_name:   String,
  pub avatar_mime:   String,
  pub avatar_bytes:  Vec<u8>
}

/// Creation endpoints echo the new record; only its id is relied upon.
#[derive(Debug, Deserialize)]
struct Created<Id> {
  id: Id
}

#[derive(Debug, Clone)]
pub struct ApiClient {
  http:     reqwest::Client,
  base_url: String,
  token:    Option<String>
}

impl ApiClient {
  pub fn new(
    token: Option<String>
  ) -> Result<Self> {
    Self::with_base_url(
      API_BASE_URL,
      token
    )
  }

  /// Points the client at another server; used by tests.
  pub fn with_base_url(
    base_url: &str,
    token: Option<String>
  ) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|source| {
        ClientError::Network {
          endpoint: base_url.to_string(),
          source
        }
      })?;

    if token.is_none() {
      warn!(
        "no API token configured; \
         authenticated calls will be \
         rejected"
      );
    }

    Ok(Self {
      http,
      base_url: base_url
        .trim_end_matches('/')
        .to_string(),
      token
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  fn request(
    &self,
    method: Method,
    path: &str,
    authenticated: bool
  ) -> RequestBuilder {
    let request = self
      .http
      .request(method, self.url(path))
      .header(
        reqwest::header::ACCEPT,
        "application/json"
      );
    match (&self.token, authenticated) {
      | (Some(token), true) => {
        request.bearer_auth(token)
      }
      | _ => request
    }
  }

  #[tracing::instrument(skip(
    self, request
  ))]
  async fn send(
    &self,
    endpoint: &str,
    request: RequestBuilder
  ) -> Result<reqwest::Response> {
    let response = request
      .send()
      .await
      .map_err(|source| {
        ClientError::Network {
          endpoint: endpoint.to_string(),
          source
        }
      })?;

    let status = response.status();
    debug!(endpoint, status = %status, "API response");
    if status.is_success() {
      return Ok(response);
    }

    let body = response
      .text()
      .await
      .unwrap_or_default();
    warn!(
      endpoint,
      status = %status,
      "API returned non-success status"
    );
    Err(ClientError::Status {
      endpoint: endpoint.to_string(),
      status: status.as_u16(),
      body
    })
  }

  async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response
  ) -> Result<T> {
    response.json::<T>().await.map_err(
      |source| ClientError::Network {
        endpoint: endpoint.to_string(),
        source
      }
    )
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    authenticated: bool
  ) -> Result<T> {
    let request = self.request(
      Method::GET,
      path,
      authenticated
    );
    let response =
      self.send(path, request).await?;
    Self::decode(path, response).await
  }

  pub async fn statuses(
    &self
  ) -> Result<Vec<Status>> {
    self.get_json("/statuses", false).await
  }

  pub async fn priorities(
    &self
  ) -> Result<Vec<Priority>> {
    self
      .get_json("/priorities", false)
      .await
  }

  pub async fn departments(
    &self
  ) -> Result<Vec<Department>> {
    self
      .get_json("/departments", false)
      .await
  }

  pub async fn employees(
    &self
  ) -> Result<Vec<Employee>> {
    self.get_json("/employees", true).await
  }

  /// The API has no department-scoped listing; scoping happens here.
  #[tracing::instrument(skip(self))]
  pub async fn employees_in(
    &self,
    department: DepartmentId
  ) -> Result<Vec<Employee>> {
    let all = self.employees().await?;
    Ok(
      all
        .into_iter()
        .filter(|e| {
          e.department.id == department
        })
        .collect()
    )
  }

  #[tracing::instrument(skip(
    self, upload
  ), fields(name = %upload.name))]
  pub async fn create_employee(
    &self,
    upload: EmployeeUpload
  ) -> Result<EmployeeId> {
    let path = "/employees";
    let avatar = multipart::Part::bytes(
      upload.avatar_bytes
    )
    .file_name(upload.avatar_name)
    .mime_str(&upload.avatar_mime)
    .map_err(|source| {
      ClientError::Network {
        endpoint: path.to_string(),
        source
      }
    })?;

    let form = multipart::Form::new()
      .text("name", upload.name)
      .text("surname", upload.surname)
      .part("avatar", avatar)
      .text(
        "department_id",
        upload.department_id.to_string()
      );

    let request = self
      .request(Method::POST, path, true)
      .multipart(form);
    let response =
      self.send(path, request).await?;
    let created: Created<EmployeeId> =
      Self::decode(path, response).await?;
    Ok(created.id)
  }

  pub async fn tasks(
    &self
  ) -> Result<Vec<Task>> {
    self.get_json("/tasks", true).await
  }

  #[tracing::instrument(skip(self))]
  pub async fn task(
    &self,
    id: TaskId
  ) -> Result<Task> {
    let path = format!("/tasks/{id}");
    let request = self.request(
      Method::GET,
      &path,
      true
    );
    match self.send(&path, request).await
    {
      | Ok(response) => {
        Self::decode(&path, response)
          .await
      }
      | Err(ClientError::Status {
        status,
        ..
      }) if status
        == StatusCode::NOT_FOUND
          .as_u16() =>
      {
        Err(ClientError::NotFound(id))
      }
      | Err(err) => Err(err)
    }
  }

  #[tracing::instrument(skip(self, body))]
  pub async fn create_task(
    &self,
    body: &TaskCreate
  ) -> Result<TaskId> {
    let path = "/tasks";
    let request = self
      .request(Method::POST, path, true)
      .json(body);
    let response =
      self.send(path, request).await?;
    let created: Created<TaskId> =
      Self::decode(path, response).await?;
    Ok(created.id)
  }

  #[tracing::instrument(skip(self))]
  pub async fn update_task_status(
    &self,
    id: TaskId,
    update: TaskStatusUpdate
  ) -> Result<()> {
    let path = format!("/tasks/{id}");
    let request = self
      .request(Method::PUT, &path, true)
      .json(&update);
    self.send(&path, request).await?;
    Ok(())
  }

  pub async fn comments(
    &self,
    task: TaskId
  ) -> Result<Vec<Comment>> {
    self
      .get_json(
        &format!("/tasks/{task}/comments"),
        true
      )
      .await
  }

  #[tracing::instrument(skip(self, body))]
  pub async fn post_comment(
    &self,
    task: TaskId,
    body: &CommentCreate
  ) -> Result<()> {
    let path =
      format!("/tasks/{task}/comments");
    let request = self
      .request(Method::POST, &path, true)
      .json(body);
    self.send(&path, request).await?;
    Ok(())
  }
}
