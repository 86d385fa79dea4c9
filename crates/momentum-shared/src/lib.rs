use std::fmt;

use serde::{
  Deserialize,
  Serialize
};

macro_rules! entity_id {
  ($name:ident) => {
    #[derive(
      Debug,
      Clone,
      Copy,
      PartialEq,
      Eq,
      PartialOrd,
      Ord,
      Hash,
      Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl fmt::Display for $name {
      fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>
      ) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<u64> for $name {
      fn from(value: u64) -> Self {
        Self(value)
      }
    }
  };
}

entity_id!(DepartmentId);
entity_id!(PriorityId);
entity_id!(StatusId);
entity_id!(EmployeeId);
entity_id!(TaskId);
entity_id!(CommentId);

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Department {
  pub id:   DepartmentId,
  pub name: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Priority {
  pub id:   PriorityId,
  pub name: String,
  #[serde(default)]
  pub icon: Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Status {
  pub id:   StatusId,
  pub name: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Employee {
  pub id:         EmployeeId,
  pub name:       String,
  pub surname:    String,
  #[serde(default)]
  pub avatar:     Option<String>,
  pub department: Department
}

impl Employee {
  pub fn full_name(&self) -> String {
    format!(
      "{} {}",
      self.name, self.surname
    )
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Task {
  pub id:             TaskId,
  pub name:           String,
  #[serde(default)]
  pub description:    Option<String>,
  pub due_date:       String,
  pub status:         Status,
  pub priority:       Priority,
  pub department:     Department,
  pub employee:       Employee,
  #[serde(default)]
  pub total_comments: u32
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Comment {
  pub id:              CommentId,
  pub text:            String,
  #[serde(default)]
  pub task_id:         Option<TaskId>,
  #[serde(default)]
  pub parent_id:       Option<CommentId>,
  #[serde(default)]
  pub author_avatar:   Option<String>,
  #[serde(default)]
  pub author_nickname: String,
  #[serde(default)]
  pub sub_comments:    Vec<Comment>
}

/// Body of `POST /tasks`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskCreate {
  pub name:        String,
  pub description: String,
  pub due_date:    String,
  pub status_id:   StatusId,
  pub employee_id: EmployeeId,
  pub priority_id: PriorityId
}

/// Body of `PUT /tasks/{id}`.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskStatusUpdate {
  pub status_id: StatusId
}

/// Body of `POST /tasks/{id}/comments`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct CommentCreate {
  pub text:      String,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub parent_id: Option<CommentId>
}
