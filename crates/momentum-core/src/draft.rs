//! Persistence of the in-progress new-task form.
//!
//! The whole form is written under a single key on every change and read
//! back once when the form is opened. A successful submission deletes it.

use chrono::{
  DateTime,
  Utc
};
use momentum_shared::{
  Department,
  Employee,
  Priority,
  Status
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  warn
};

use crate::datetime::draft_timestamp_serde;
use crate::error::Result;
use crate::storage::LocalStorage;

pub const TASK_DRAFT_KEY: &str =
  "taskFormData";

/// Name of the priority preselected on a fresh form ("medium").
pub const DEFAULT_PRIORITY_NAME: &str =
  "საშუალო";
/// Name of the status preselected on a fresh form ("not started").
pub const DEFAULT_STATUS_NAME: &str =
  "დასაწყები";

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TaskDraft {
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub priority:    Option<Priority>,
  #[serde(default)]
  pub status:      Option<Status>,
  #[serde(default)]
  pub department:  Option<Department>,
  #[serde(default)]
  pub employee:    Option<Employee>,
  #[serde(
    default,
    with = "draft_timestamp_serde"
  )]
  pub deadline:    Option<DateTime<Utc>>
}

pub fn default_priority(
  priorities: &[Priority]
) -> Option<Priority> {
  priorities
    .iter()
    .find(|p| {
      p.name == DEFAULT_PRIORITY_NAME
    })
    .or_else(|| priorities.first())
    .cloned()
}

pub fn default_status(
  statuses: &[Status]
) -> Option<Status> {
  statuses
    .iter()
    .find(|s| s.name == DEFAULT_STATUS_NAME)
    .or_else(|| statuses.first())
    .cloned()
}

#[derive(Debug)]
pub struct DraftStore<S> {
  storage: S
}

impl<S: LocalStorage> DraftStore<S> {
  pub fn new(storage: S) -> Self {
    Self {
      storage
    }
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Reads the stored draft. A value that no longer decodes is treated as
  /// absent.
  #[tracing::instrument(skip(self))]
  pub fn load(
    &self
  ) -> Result<Option<TaskDraft>> {
    let Some(raw) = self
      .storage
      .get_item(TASK_DRAFT_KEY)?
    else {
      debug!("no stored task draft");
      return Ok(None);
    };

    match serde_json::from_str::<TaskDraft>(
      &raw
    ) {
      | Ok(draft) => Ok(Some(draft)),
      | Err(error) => {
        warn!(
          %error,
          "failed parsing stored task \
           draft; ignoring it"
        );
        Ok(None)
      }
    }
  }

  #[tracing::instrument(skip(
    self, draft
  ))]
  pub fn save(
    &mut self,
    draft: &TaskDraft
  ) -> Result<()> {
    let json =
      serde_json::to_string(draft)?;
    self
      .storage
      .set_item(TASK_DRAFT_KEY, &json)
  }

  /// Drops only the persisted employee, leaving the other fields intact.
  #[tracing::instrument(skip(self))]
  pub fn clear_employee(
    &mut self
  ) -> Result<()> {
    if let Some(mut draft) = self.load()?
    {
      draft.employee = None;
      self.save(&draft)?;
    }
    Ok(())
  }

  #[tracing::instrument(skip(self))]
  pub fn clear(&mut self) -> Result<()> {
    self
      .storage
      .remove_item(TASK_DRAFT_KEY)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Duration,
    TimeZone
  };
  use momentum_shared::{
    DepartmentId,
    EmployeeId,
    PriorityId,
    StatusId
  };

  use super::*;
  use crate::storage::MemoryStorage;

  fn design() -> Department {
    Department {
      id:   DepartmentId(3),
      name: "Design".to_string()
    }
  }

  fn full_draft() -> TaskDraft {
    let deadline = Utc
      .with_ymd_and_hms(
        2026, 10, 17, 8, 15, 42
      )
      .single()
      .expect("valid deadline")
      + Duration::nanoseconds(123_456_789);

    TaskDraft {
      title:       "Redesign header"
        .to_string(),
      description: "make the header \
                    sticky again"
        .to_string(),
      priority:    Some(Priority {
        id:   PriorityId(2),
        name: DEFAULT_PRIORITY_NAME
          .to_string(),
        icon: Some(
          "https://x/medium.svg"
            .to_string()
        )
      }),
      status:      Some(Status {
        id:   StatusId(1),
        name: DEFAULT_STATUS_NAME
          .to_string()
      }),
      department:  Some(design()),
      employee:    Some(Employee {
        id:         EmployeeId(9),
        name:       "Nino".to_string(),
        surname:    "Beridze"
          .to_string(),
        avatar:     None,
        department: design()
      }),
      deadline:    Some(deadline)
    }
  }

  #[test]
  fn round_trip_preserves_every_field_and_instant()
   {
    let mut store =
      DraftStore::new(MemoryStorage::new());
    let draft = full_draft();
    store.save(&draft).expect("save");

    let loaded = store
      .load()
      .expect("load")
      .expect("draft present");
    assert_eq!(loaded, draft);
    assert_eq!(
      loaded.deadline, draft.deadline
    );
  }

  #[test]
  fn deadline_is_stored_as_text() {
    let mut store =
      DraftStore::new(MemoryStorage::new());
    store
      .save(&full_draft())
      .expect("save");
    let raw = store
      .storage()
      .get_item(TASK_DRAFT_KEY)
      .expect("get")
      .expect("raw present");
    let value: serde_json::Value =
      serde_json::from_str(&raw)
        .expect("json");
    assert_eq!(
      value["deadline"],
      "2026-10-17T08:15:42.123456789Z"
    );
  }

  #[test]
  fn clear_employee_keeps_other_fields() {
    let mut store =
      DraftStore::new(MemoryStorage::new());
    store
      .save(&full_draft())
      .expect("save");
    store
      .clear_employee()
      .expect("clear employee");
    let loaded = store
      .load()
      .expect("load")
      .expect("draft present");
    assert!(loaded.employee.is_none());
    assert_eq!(
      loaded.department,
      Some(design())
    );
  }

  #[test]
  fn partial_and_corrupt_drafts() {
    let mut storage = MemoryStorage::new();
    storage
      .set_item(
        TASK_DRAFT_KEY,
        r#"{"title":"abc"}"#
      )
      .expect("seed");
    let store = DraftStore::new(storage);
    let loaded = store
      .load()
      .expect("load")
      .expect("present");
    assert_eq!(loaded.title, "abc");
    assert!(loaded.deadline.is_none());

    let mut storage = MemoryStorage::new();
    storage
      .set_item(TASK_DRAFT_KEY, "[1,2")
      .expect("seed");
    let store = DraftStore::new(storage);
    assert_eq!(
      store.load().expect("load"),
      None
    );
  }

  #[test]
  fn defaults_prefer_named_entries() {
    let priorities = vec![
      Priority {
        id:   PriorityId(1),
        name: "დაბალი".to_string(),
        icon: None
      },
      Priority {
        id:   PriorityId(2),
        name: DEFAULT_PRIORITY_NAME
          .to_string(),
        icon: None
      },
    ];
    assert_eq!(
      default_priority(&priorities)
        .map(|p| p.id),
      Some(PriorityId(2))
    );
    assert_eq!(
      default_priority(&priorities[..1])
        .map(|p| p.id),
      Some(PriorityId(1))
    );
    assert_eq!(default_status(&[]), None);
  }
}
