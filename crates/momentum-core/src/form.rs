//! Live state of the new-task and new-employee forms.

use std::fs;
use std::path::Path;

use chrono::{
  DateTime,
  Utc
};
use momentum_shared::{
  Department,
  Employee,
  Priority,
  Status,
  TaskCreate
};

use crate::api::EmployeeUpload;
use crate::datetime::{
  default_deadline,
  format_due_date
};
use crate::draft::{
  TaskDraft,
  default_priority,
  default_status
};
use crate::error::{
  ClientError,
  Result
};
use crate::lookup::Lookups;
use crate::validate::{
  FormFieldState,
  ValidationError,
  Verdict,
  validate_avatar,
  validate_deadline,
  validate_description,
  validate_person_name,
  validate_selected,
  validate_title
};

type FieldErrors =
  Vec<(&'static str, ValidationError)>;

fn collect_error(
  errors: &mut FieldErrors,
  field: &'static str,
  error: Option<ValidationError>
) {
  if let Some(error) = error {
    errors.push((field, error));
  }
}

fn check_selected<T>(
  value: &Option<T>
) -> Verdict {
  validate_selected(value.as_ref())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskForm {
  pub title:       FormFieldState<String>,
  pub description: FormFieldState<String>,
  pub priority:    FormFieldState<Option<Priority>>,
  pub status:      FormFieldState<Option<Status>>,
  pub department:
    FormFieldState<Option<Department>>,
  pub employee:
    FormFieldState<Option<Employee>>,
  pub deadline:
    FormFieldState<Option<DateTime<Utc>>>
}

impl NewTaskForm {
  /// Every field empty and untouched.
  pub fn empty(now: DateTime<Utc>) -> Self {
    Self::from_draft(
      TaskDraft::default(),
      now
    )
  }

  fn from_draft(
    draft: TaskDraft,
    now: DateTime<Utc>
  ) -> Self {
    Self {
      title:       FormFieldState::untouched(
        draft.title.clone(),
        validate_title(&draft.title)
      ),
      description: FormFieldState::untouched(
        draft.description.clone(),
        validate_description(
          &draft.description
        )
      ),
      priority:    FormFieldState::untouched(
        draft.priority.clone(),
        check_selected(&draft.priority)
      ),
      status:      FormFieldState::untouched(
        draft.status.clone(),
        check_selected(&draft.status)
      ),
      department:  FormFieldState::untouched(
        draft.department.clone(),
        check_selected(&draft.department)
      ),
      employee:    FormFieldState::untouched(
        draft.employee.clone(),
        check_selected(&draft.employee)
      ),
      deadline:    FormFieldState::untouched(
        draft.deadline,
        validate_deadline(
          draft.deadline,
          now
        )
      )
    }
  }

  /// Restores a stored draft, filling absent priority, status and
  /// deadline with their defaults.
  pub fn hydrate(
    draft: Option<TaskDraft>,
    lookups: &Lookups,
    now: DateTime<Utc>
  ) -> Self {
    let mut draft =
      draft.unwrap_or_default();
    if draft.priority.is_none() {
      draft.priority =
        default_priority(&lookups.priorities);
    }
    if draft.status.is_none() {
      draft.status =
        default_status(&lookups.statuses);
    }
    if draft.deadline.is_none() {
      draft.deadline =
        Some(default_deadline(now));
    }
    Self::from_draft(draft, now)
  }

  pub fn set_title(
    &mut self,
    value: impl Into<String>
  ) {
    let value = value.into();
    let verdict = validate_title(&value);
    self.title.change(value, verdict);
  }

  pub fn set_description(
    &mut self,
    value: impl Into<String>
  ) {
    let value = value.into();
    let verdict =
      validate_description(&value);
    self
      .description
      .change(value, verdict);
  }

  pub fn set_priority(
    &mut self,
    value: Option<Priority>
  ) {
    let verdict = check_selected(&value);
    self.priority.change(value, verdict);
  }

  pub fn set_status(
    &mut self,
    value: Option<Status>
  ) {
    let verdict = check_selected(&value);
    self.status.change(value, verdict);
  }

  /// Raw department update; the cascade lives in the page.
  pub fn set_department(
    &mut self,
    value: Option<Department>
  ) {
    let verdict = check_selected(&value);
    self
      .department
      .change(value, verdict);
  }

  pub fn set_employee(
    &mut self,
    value: Option<Employee>
  ) {
    let verdict = check_selected(&value);
    self.employee.change(value, verdict);
  }

  /// Empties the employee after a department switch and re-validates it.
  pub fn clear_employee(&mut self) {
    self.employee.assign(
      None,
      Err(ValidationError::Required)
    );
  }

  pub fn set_deadline(
    &mut self,
    value: Option<DateTime<Utc>>,
    now: DateTime<Utc>
  ) {
    let verdict =
      validate_deadline(value, now);
    self.deadline.change(value, verdict);
  }

  pub fn errors(&self) -> FieldErrors {
    let mut errors = Vec::new();
    collect_error(
      &mut errors,
      "title",
      self.title.error()
    );
    collect_error(
      &mut errors,
      "description",
      self.description.error()
    );
    collect_error(
      &mut errors,
      "priority",
      self.priority.error()
    );
    collect_error(
      &mut errors,
      "status",
      self.status.error()
    );
    collect_error(
      &mut errors,
      "department",
      self.department.error()
    );
    collect_error(
      &mut errors,
      "employee",
      self.employee.error()
    );
    collect_error(
      &mut errors,
      "deadline",
      self.deadline.error()
    );
    errors
  }

  /// Independent of which fields were touched.
  pub fn is_valid(&self) -> bool {
    self.errors().is_empty()
  }

  /// Submitting reveals every field's error.
  pub fn touch_all(&mut self) {
    self.title.blur();
    self.description.blur();
    self.priority.blur();
    self.status.blur();
    self.department.blur();
    self.employee.blur();
    self.deadline.blur();
  }

  pub fn to_draft(&self) -> TaskDraft {
    TaskDraft {
      title:       self.title.value().clone(),
      description: self
        .description
        .value()
        .clone(),
      priority:    self
        .priority
        .value()
        .clone(),
      status:      self.status.value().clone(),
      department:  self
        .department
        .value()
        .clone(),
      employee:    self
        .employee
        .value()
        .clone(),
      deadline:    *self.deadline.value()
    }
  }

  /// Builds the `POST /tasks` body; an invalid form never gets this far.
  pub fn to_request(
    &self
  ) -> Result<TaskCreate> {
    let errors = self.errors();
    if !errors.is_empty() {
      return Err(ClientError::Validation(
        errors
      ));
    }

    let missing = || {
      ClientError::Validation(vec![(
        "form",
        ValidationError::Required
      )])
    };
    let status = self
      .status
      .value()
      .as_ref()
      .ok_or_else(missing)?;
    let priority = self
      .priority
      .value()
      .as_ref()
      .ok_or_else(missing)?;
    let employee = self
      .employee
      .value()
      .as_ref()
      .ok_or_else(missing)?;
    let deadline = self
      .deadline
      .value()
      .ok_or_else(missing)?;

    Ok(TaskCreate {
      name:        self.title.value().clone(),
      description: self
        .description
        .value()
        .clone(),
      due_date:    format_due_date(deadline),
      status_id:   status.id,
      employee_id: employee.id,
      priority_id: priority.id
    })
  }
}

/// An image chosen as an employee avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
  pub file_name: String,
  pub mime:      String,
  pub bytes:     Vec<u8>
}

impl AvatarFile {
  #[tracing::instrument]
  pub fn read(
    path: &Path
  ) -> std::io::Result<Self> {
    let bytes = fs::read(path)?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_else(|| {
        "avatar".to_string()
      });
    let mime = guess_image_mime(path);
    Ok(Self {
      file_name,
      mime: mime.to_string(),
      bytes
    })
  }

  pub fn size(&self) -> u64 {
    self.bytes.len() as u64
  }
}

pub fn guess_image_mime(
  path: &Path
) -> &'static str {
  let ext = path
    .extension()
    .map(|e| {
      e.to_string_lossy()
        .to_ascii_lowercase()
    })
    .unwrap_or_default();
  match ext.as_str() {
    | "png" => "image/png",
    | "jpg" | "jpeg" => "image/jpeg",
    | "gif" => "image/gif",
    | "webp" => "image/webp",
    | "svg" => "image/svg+xml",
    | _ => "application/octet-stream"
  }
}

fn check_avatar(
  value: &Option<AvatarFile>
) -> Verdict {
  validate_avatar(
    value.as_ref().map(AvatarFile::size)
  )
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeForm {
  pub name:       FormFieldState<String>,
  pub surname:    FormFieldState<String>,
  pub avatar:
    FormFieldState<Option<AvatarFile>>,
  pub department:
    FormFieldState<Option<Department>>
}

impl Default for EmployeeForm {
  fn default() -> Self {
    Self {
      name:       FormFieldState::untouched(
        String::new(),
        validate_person_name("")
      ),
      surname:    FormFieldState::untouched(
        String::new(),
        validate_person_name("")
      ),
      avatar:     FormFieldState::untouched(
        None,
        check_avatar(&None)
      ),
      department: FormFieldState::untouched(
        None,
        check_selected::<Department>(&None)
      )
    }
  }
}

impl EmployeeForm {
  pub fn set_name(
    &mut self,
    value: impl Into<String>
  ) {
    let value = value.into();
    let verdict =
      validate_person_name(&value);
    self.name.change(value, verdict);
  }

  pub fn set_surname(
    &mut self,
    value: impl Into<String>
  ) {
    let value = value.into();
    let verdict =
      validate_person_name(&value);
    self.surname.change(value, verdict);
  }

  pub fn set_avatar(
    &mut self,
    value: Option<AvatarFile>
  ) {
    let verdict = check_avatar(&value);
    self.avatar.change(value, verdict);
  }

  pub fn set_department(
    &mut self,
    value: Option<Department>
  ) {
    let verdict = check_selected(&value);
    self
      .department
      .change(value, verdict);
  }

  /// Submitting marks every field touched so all errors become visible.
  pub fn touch_all(&mut self) {
    self.name.blur();
    self.surname.blur();
    self.avatar.blur();
    self.department.blur();
  }

  pub fn errors(&self) -> FieldErrors {
    let mut errors = Vec::new();
    collect_error(
      &mut errors,
      "name",
      self.name.error()
    );
    collect_error(
      &mut errors,
      "surname",
      self.surname.error()
    );
    collect_error(
      &mut errors,
      "avatar",
      self.avatar.error()
    );
    collect_error(
      &mut errors,
      "department",
      self.department.error()
    );
    errors
  }

  pub fn is_valid(&self) -> bool {
    self.errors().is_empty()
  }

  pub fn to_upload(
    &self
  ) -> Result<EmployeeUpload> {
    let errors = self.errors();
    let (Some(avatar), Some(department)) = (
      self.avatar.value(),
      self.department.value()
    ) else {
      return Err(ClientError::Validation(
        errors
      ));
    };
    if !errors.is_empty() {
      return Err(ClientError::Validation(
        errors
      ));
    }

    Ok(EmployeeUpload {
      name:          self.name.value().clone(),
      surname:       self
        .surname
        .value()
        .clone(),
      department_id: department.id,
      avatar_name:   avatar
        .file_name
        .clone(),
      avatar_mime:   avatar.mime.clone(),
      avatar_bytes:  avatar.bytes.clone()
    })
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
  use crate::draft::{
    DEFAULT_PRIORITY_NAME,
    DEFAULT_STATUS_NAME
  };

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 10, 16, 12, 0, 0
      )
      .single()
      .expect("valid now")
  }

  fn lookups() -> Lookups {
    Lookups {
      statuses: vec![
        Status {
          id:   StatusId(2),
          name: "პროგრესში".to_string()
        },
        Status {
          id:   StatusId(1),
          name: DEFAULT_STATUS_NAME
            .to_string()
        },
      ],
      priorities: vec![
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
      ],
      ..Lookups::default()
    }
  }

  fn design() -> Department {
    Department {
      id:   DepartmentId(4),
      name: "Design".to_string()
    }
  }

  #[test]
  fn hydrate_fills_defaults_for_missing_fields()
   {
    let form = NewTaskForm::hydrate(
      None,
      &lookups(),
      now()
    );
    assert_eq!(
      form
        .priority
        .value()
        .as_ref()
        .map(|p| p.id),
      Some(PriorityId(2))
    );
    assert_eq!(
      form
        .status
        .value()
        .as_ref()
        .map(|s| s.id),
      Some(StatusId(1))
    );
    assert_eq!(
      *form.deadline.value(),
      Some(now() + Duration::hours(24))
    );
    assert!(!form.title.touched());
    assert!(!form.is_valid());
  }

  #[test]
  fn hydrate_keeps_stored_values() {
    let stored = TaskDraft {
      title: "Stored".to_string(),
      status: Some(Status {
        id:   StatusId(2),
        name: "პროგრესში".to_string()
      }),
      deadline: Some(
        now() + Duration::days(3)
      ),
      ..TaskDraft::default()
    };
    let form = NewTaskForm::hydrate(
      Some(stored),
      &lookups(),
      now()
    );
    assert_eq!(form.title.value(), "Stored");
    assert_eq!(
      form
        .status
        .value()
        .as_ref()
        .map(|s| s.id),
      Some(StatusId(2))
    );
    assert_eq!(
      *form.deadline.value(),
      Some(now() + Duration::days(3))
    );
  }

  #[test]
  fn complete_form_builds_request() {
    let mut form = NewTaskForm::hydrate(
      None,
      &lookups(),
      now()
    );
    form.set_title("Fix login");
    form.set_department(Some(design()));
    form.set_employee(Some(Employee {
      id:         EmployeeId(7),
      name:       "Nino".to_string(),
      surname:    "Beridze".to_string(),
      avatar:     None,
      department: design()
    }));
    assert!(form.is_valid());

    let request =
      form.to_request().expect("request");
    assert_eq!(request.name, "Fix login");
    assert_eq!(
      request.due_date,
      "2026-10-17"
    );
    assert_eq!(
      request.employee_id,
      EmployeeId(7)
    );
    assert_eq!(
      request.priority_id,
      PriorityId(2)
    );
  }

  #[test]
  fn invalid_form_reports_every_failing_field()
   {
    let mut form =
      NewTaskForm::empty(now());
    form.set_description("too short");
    let Err(ClientError::Validation(
      errors
    )) = form.to_request()
    else {
      panic!("expected validation failure");
    };
    let fields: Vec<&str> = errors
      .iter()
      .map(|(field, _)| *field)
      .collect();
    assert_eq!(
      fields,
      vec![
        "title",
        "description",
        "priority",
        "status",
        "department",
        "employee",
        "deadline"
      ]
    );
  }

  #[test]
  fn past_deadline_blocks_submission() {
    let mut form = NewTaskForm::hydrate(
      None,
      &lookups(),
      now()
    );
    form.set_deadline(
      Some(now() - Duration::days(2)),
      now()
    );
    assert_eq!(
      form.deadline.displayed_error(),
      Some(ValidationError::InPast)
    );
  }

  #[test]
  fn employee_form_requires_everything() {
    let mut form = EmployeeForm::default();
    assert!(!form.is_valid());
    assert_eq!(
      form.name.displayed_error(),
      None
    );
    form.touch_all();
    assert_eq!(
      form.name.displayed_error(),
      Some(ValidationError::Required)
    );

    form.set_name("Ana");
    form.set_surname("Ba");
    form.set_department(Some(design()));
    form.set_avatar(Some(AvatarFile {
      file_name: "a.png".to_string(),
      mime:      "image/png".to_string(),
      bytes:     vec![0; 1024]
    }));
    assert!(form.is_valid());
    let upload =
      form.to_upload().expect("upload");
    assert_eq!(
      upload.department_id,
      DepartmentId(4)
    );

    form.set_avatar(Some(AvatarFile {
      file_name: "big.png".to_string(),
      mime:      "image/png".to_string(),
      bytes:     vec![0; 700 * 1024]
    }));
    assert!(form.to_upload().is_err());
  }

  #[test]
  fn guesses_mime_from_extension() {
    assert_eq!(
      guess_image_mime(Path::new(
        "me.JPG"
      )),
      "image/jpeg"
    );
    assert_eq!(
      guess_image_mime(Path::new("me")),
      "application/octet-stream"
    );
  }
}
