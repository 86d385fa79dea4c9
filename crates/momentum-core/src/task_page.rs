use momentum_shared::{
  Comment,
  CommentCreate,
  CommentId,
  Status,
  StatusId,
  Task,
  TaskId,
  TaskStatusUpdate
};
use tracing::info;

use crate::api::ApiClient;
use crate::comments::{
  ReplyState,
  ThreadEntry,
  flatten_thread,
  total_comment_count
};
use crate::error::{
  ClientError,
  Result
};
use crate::validate::ValidationError;

/// A single task with its comment thread.
#[derive(Debug, Clone)]
pub struct TaskPage {
  pub task:     Task,
  pub statuses: Vec<Status>,
  pub comments: Vec<Comment>,
  pub replies:  ReplyState
}

fn require_text(
  field: &'static str,
  text: &str
) -> Result<()> {
  if text.trim().is_empty() {
    return Err(ClientError::Validation(
      vec![(
        field,
        ValidationError::Required
      )]
    ));
  }
  Ok(())
}

impl TaskPage {
  #[tracing::instrument(skip(api))]
  pub async fn open(
    api: &ApiClient,
    id: TaskId
  ) -> Result<Self> {
    let (task, statuses, comments) = tokio::try_join!(
      api.task(id),
      api.statuses(),
      api.comments(id)
    )?;
    Ok(Self {
      task,
      statuses,
      comments,
      replies: ReplyState::default()
    })
  }

  pub fn thread(
    &self
  ) -> Vec<ThreadEntry<'_>> {
    flatten_thread(&self.comments)
  }

  pub fn comment_count(&self) -> usize {
    total_comment_count(&self.comments)
  }

  /// The local status changes only after the server accepted it.
  #[tracing::instrument(skip(self, api), fields(task = %self.task.id))]
  pub async fn change_status(
    &mut self,
    api: &ApiClient,
    status_id: StatusId
  ) -> Result<()> {
    let status = self
      .statuses
      .iter()
      .find(|s| s.id == status_id)
      .cloned()
      .ok_or_else(|| {
        ClientError::Validation(vec![(
          "status",
          ValidationError::Required
        )])
      })?;

    api
      .update_task_status(
        self.task.id,
        TaskStatusUpdate {
          status_id
        }
      )
      .await?;
    info!(status = %status.name, "status updated");
    self.task.status = status;
    Ok(())
  }

  pub async fn refresh_comments(
    &mut self,
    api: &ApiClient
  ) -> Result<()> {
    self.comments =
      api.comments(self.task.id).await?;
    Ok(())
  }

  /// Posts a top-level comment, then reloads the thread from the server.
  #[tracing::instrument(skip(self, api, text), fields(task = %self.task.id))]
  pub async fn post_comment(
    &mut self,
    api: &ApiClient,
    text: &str
  ) -> Result<()> {
    require_text("comment", text)?;
    api
      .post_comment(
        self.task.id,
        &CommentCreate {
          text:      text.to_string(),
          parent_id: None
        }
      )
      .await?;
    self.refresh_comments(api).await
  }

  /// Posts the reply box's text under `parent`. The box closes as soon as
  /// the server accepts the reply, even if the refetch then fails.
  #[tracing::instrument(skip(self, api, text), fields(task = %self.task.id))]
  pub async fn post_reply(
    &mut self,
    api: &ApiClient,
    parent: CommentId,
    text: &str
  ) -> Result<()> {
    require_text("reply", text)?;
    api
      .post_comment(
        self.task.id,
        &CommentCreate {
          text:      text.to_string(),
          parent_id: Some(parent)
        }
      )
      .await?;
    self.replies.close();
    self.refresh_comments(api).await
  }
}
