use chrono::{
  DateTime,
  Utc
};
use momentum_shared::{
  Department,
  Employee,
  TaskId
};
use tracing::{
  debug,
  info
};

use crate::api::ApiClient;
use crate::cascade::{
  CascadeEffect,
  DepartmentCascade
};
use crate::draft::DraftStore;
use crate::error::{
  ClientError,
  Result
};
use crate::form::NewTaskForm;
use crate::lookup::Lookups;
use crate::storage::LocalStorage;
use crate::validate::ValidationError;

/// The task-creation page: form state, its stored draft, and the
/// department-scoped employee list.
#[derive(Debug)]
pub struct NewTaskPage<S> {
  pub lookups: Lookups,
  pub form:    NewTaskForm,
  cascade:     DepartmentCascade,
  drafts:      DraftStore<S>
}

impl<S: LocalStorage> NewTaskPage<S> {
  /// Loads reference data, restores the saved draft, and loads employees
  /// for a restored department.
  #[tracing::instrument(skip_all)]
  pub async fn open(
    api: &ApiClient,
    drafts: DraftStore<S>,
    now: DateTime<Utc>
  ) -> Result<Self> {
    let lookups =
      Lookups::fetch_without_employees(
        api
      )
      .await?;
    let stored = drafts.load()?;
    let form = NewTaskForm::hydrate(
      stored, &lookups, now
    );
    let cascade =
      DepartmentCascade::hydrated(
        form
          .department
          .value()
          .as_ref()
          .map(|d| d.id)
      );

    let mut page = Self {
      lookups,
      form,
      cascade,
      drafts
    };
    if let Some(department) =
      page.cascade.department()
    {
      page.lookups.employees =
        api.employees_in(department).await?;
    }
    page.persist()?;
    Ok(page)
  }

  pub fn employees(&self) -> &[Employee] {
    &self.lookups.employees
  }

  pub fn cascade(
    &self
  ) -> DepartmentCascade {
    self.cascade
  }

  pub fn drafts(&self) -> &DraftStore<S> {
    &self.drafts
  }

  fn persist(&mut self) -> Result<()> {
    let draft = self.form.to_draft();
    self.drafts.save(&draft)
  }

  /// Applies a field edit and writes the draft.
  pub fn edit(
    &mut self,
    change: impl FnOnce(&mut NewTaskForm)
  ) -> Result<()> {
    change(&mut self.form);
    self.persist()
  }

  #[tracing::instrument(skip(
    self, api, department
  ), fields(department = %department.id))]
  pub async fn select_department(
    &mut self,
    api: &ApiClient,
    department: Department
  ) -> Result<CascadeEffect> {
    let (next, effect) =
      self.cascade.select(department.id);
    self.cascade = next;
    self
      .form
      .set_department(Some(department));

    match effect {
      | CascadeEffect::Unchanged => {
        debug!(
          "department unchanged; keeping \
           employee"
        );
      }
      | CascadeEffect::LoadEmployees(id) => {
        self.lookups.employees =
          api.employees_in(id).await?;
      }
      | CascadeEffect::ReloadAndClearEmployee(
        id
      ) => {
        info!(
          "department changed; clearing \
           employee"
        );
        self.form.clear_employee();
        self.lookups.employees.clear();
        self.drafts.clear_employee()?;
        self.lookups.employees =
          api.employees_in(id).await?;
      }
    }

    self.persist()?;
    Ok(effect)
  }

  /// Picks an employee from the current department's list.
  pub fn select_employee(
    &mut self,
    employee: Employee
  ) -> Result<()> {
    let belongs = self
      .cascade
      .department()
      .is_some_and(|id| {
        employee.department.id == id
      });
    if !belongs {
      return Err(ClientError::Validation(
        vec![(
          "employee",
          ValidationError::Required
        )]
      ));
    }
    self.edit(|form| {
      form.set_employee(Some(employee))
    })
  }

  /// Posts the task. Only a successful post clears the stored draft and
  /// resets the form.
  #[tracing::instrument(skip_all)]
  pub async fn submit(
    &mut self,
    api: &ApiClient,
    now: DateTime<Utc>
  ) -> Result<TaskId> {
    self.form.touch_all();
    let body = self.form.to_request()?;
    let id = api.create_task(&body).await?;
    info!(task = %id, "task created");

    self.drafts.clear()?;
    self.form = NewTaskForm::empty(now);
    self.cascade =
      DepartmentCascade::NoDepartment;
    self.lookups.employees.clear();
    Ok(id)
  }
}
