use momentum_shared::{
  Department,
  DepartmentId,
  Employee,
  EmployeeId,
  Priority,
  PriorityId,
  Status,
  StatusId
};
use tracing::info;

use crate::api::ApiClient;
use crate::error::Result;

/// Reference collections loaded once per view.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
  pub statuses:    Vec<Status>,
  pub priorities:  Vec<Priority>,
  pub departments: Vec<Department>,
  pub employees:   Vec<Employee>
}

impl Lookups {
  /// Loads all four collections; any failure aborts the load.
  #[tracing::instrument(skip(api))]
  pub async fn fetch(
    api: &ApiClient
  ) -> Result<Self> {
    let (
      statuses,
      priorities,
      departments,
      employees
    ) = tokio::try_join!(
      api.statuses(),
      api.priorities(),
      api.departments(),
      api.employees()
    )?;

    info!(
      statuses = statuses.len(),
      priorities = priorities.len(),
      departments = departments.len(),
      employees = employees.len(),
      "loaded reference data"
    );

    Ok(Self {
      statuses,
      priorities,
      departments,
      employees
    })
  }

  /// Loads everything except employees, which the task form fetches per
  /// department.
  #[tracing::instrument(skip(api))]
  pub async fn fetch_without_employees(
    api: &ApiClient
  ) -> Result<Self> {
    let (statuses, priorities, departments) = tokio::try_join!(
      api.statuses(),
      api.priorities(),
      api.departments()
    )?;

    Ok(Self {
      statuses,
      priorities,
      departments,
      employees: vec![]
    })
  }

  pub fn status(
    &self,
    id: StatusId
  ) -> Option<&Status> {
    self.statuses.iter().find(|s| s.id == id)
  }

  pub fn priority(
    &self,
    id: PriorityId
  ) -> Option<&Priority> {
    self
      .priorities
      .iter()
      .find(|p| p.id == id)
  }

  pub fn department(
    &self,
    id: DepartmentId
  ) -> Option<&Department> {
    self
      .departments
      .iter()
      .find(|d| d.id == id)
  }

  pub fn employee(
    &self,
    id: EmployeeId
  ) -> Option<&Employee> {
    self
      .employees
      .iter()
      .find(|e| e.id == id)
  }

  pub fn department_name(
    &self,
    id: DepartmentId
  ) -> &str {
    self
      .department(id)
      .map(|d| d.name.as_str())
      .unwrap_or_default()
  }

  pub fn priority_name(
    &self,
    id: PriorityId
  ) -> &str {
    self
      .priority(id)
      .map(|p| p.name.as_str())
      .unwrap_or_default()
  }

  pub fn employee_name(
    &self,
    id: EmployeeId
  ) -> String {
    self
      .employee(id)
      .map(Employee::full_name)
      .unwrap_or_default()
  }

  pub fn employees_in(
    &self,
    department: DepartmentId
  ) -> impl Iterator<Item = &Employee> {
    self.employees.iter().filter(
      move |e| e.department.id == department
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lookups() -> Lookups {
    let sales = Department {
      id:   DepartmentId(1),
      name: "Sales".to_string()
    };
    let it = Department {
      id:   DepartmentId(2),
      name: "IT".to_string()
    };
    Lookups {
      statuses:    vec![Status {
        id:   StatusId(1),
        name: "დასაწყები".to_string()
      }],
      priorities:  vec![Priority {
        id:   PriorityId(3),
        name: "მაღალი".to_string(),
        icon: None
      }],
      departments: vec![
        sales.clone(),
        it.clone(),
      ],
      employees:   vec![
        Employee {
          id:         EmployeeId(10),
          name:       "Ana".to_string(),
          surname:    "Kapanadze"
            .to_string(),
          avatar:     None,
          department: sales
        },
        Employee {
          id:         EmployeeId(11),
          name:       "Gio".to_string(),
          surname:    "Lomidze"
            .to_string(),
          avatar:     None,
          department: it
        },
      ]
    }
  }

  #[test]
  fn resolves_labels_and_blank_for_unknown_ids()
   {
    let lookups = lookups();
    assert_eq!(
      lookups
        .department_name(DepartmentId(2)),
      "IT"
    );
    assert_eq!(
      lookups.priority_name(PriorityId(3)),
      "მაღალი"
    );
    assert_eq!(
      lookups.employee_name(EmployeeId(10)),
      "Ana Kapanadze"
    );
    assert_eq!(
      lookups
        .department_name(DepartmentId(99)),
      ""
    );
  }

  #[test]
  fn scopes_employees_by_department() {
    let lookups = lookups();
    let ids: Vec<_> = lookups
      .employees_in(DepartmentId(2))
      .map(|e| e.id)
      .collect();
    assert_eq!(ids, vec![EmployeeId(11)]);
  }
}
