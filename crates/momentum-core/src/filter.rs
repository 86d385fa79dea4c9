//! Dashboard filtering.
//!
//! Checkbox edits land in a `selected` copy of the filter; the visible task
//! list only follows the `applied` copy, which changes through an explicit
//! apply, a chip removal, or clear-all. All transitions go through
//! [`FilterState::reduce`].

use std::collections::BTreeSet;

use momentum_shared::{
  DepartmentId,
  EmployeeId,
  PriorityId,
  Status,
  StatusId,
  Task
};
use tracing::trace;

use crate::lookup::Lookups;

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
)]
pub struct FilterSelection {
  pub departments: BTreeSet<DepartmentId>,
  pub priorities:  BTreeSet<PriorityId>,
  pub employee:    Option<EmployeeId>
}

impl FilterSelection {
  pub fn is_empty(&self) -> bool {
    self.departments.is_empty()
      && self.priorities.is_empty()
      && self.employee.is_none()
  }

  /// Each dimension is vacuously true when empty; dimensions combine
  /// with AND.
  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    let department_ok =
      self.departments.is_empty()
        || self
          .departments
          .contains(&task.department.id);
    let priority_ok =
      self.priorities.is_empty()
        || self
          .priorities
          .contains(&task.priority.id);
    let employee_ok = self
      .employee
      .is_none_or(|id| {
        task.employee.id == id
      });

    department_ok
      && priority_ok
      && employee_ok
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FilterDropdown {
  Departments,
  Priorities,
  Employees
}

/// One removable tag in the active-filter bar.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FilterChip {
  Department(DepartmentId),
  Priority(PriorityId),
  Employee
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FilterAction {
  ToggleDropdown(FilterDropdown),
  ClickOutside,
  ToggleDepartment(DepartmentId),
  TogglePriority(PriorityId),
  SelectEmployee(EmployeeId),
  Apply(FilterDropdown),
  RemoveChip(FilterChip),
  ClearAll
}

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
)]
pub struct FilterState {
  pub selected: FilterSelection,
  pub applied:  FilterSelection,
  pub open:     Option<FilterDropdown>
}

fn toggle<T: Ord + Copy>(
  set: &mut BTreeSet<T>,
  id: T
) {
  if !set.remove(&id) {
    set.insert(id);
  }
}

impl FilterState {
  #[must_use]
  pub fn reduce(
    self,
    action: FilterAction
  ) -> Self {
    trace!(?action, "filter action");
    let mut next = self;
    match action {
      | FilterAction::ToggleDropdown(
        dropdown
      ) => {
        next.open = if next.open
          == Some(dropdown)
        {
          None
        } else {
          Some(dropdown)
        };
      }
      | FilterAction::ClickOutside => {
        next.open = None;
      }
      | FilterAction::ToggleDepartment(
        id
      ) => {
        toggle(
          &mut next.selected.departments,
          id
        );
      }
      | FilterAction::TogglePriority(
        id
      ) => {
        toggle(
          &mut next.selected.priorities,
          id
        );
      }
      | FilterAction::SelectEmployee(
        id
      ) => {
        next.selected.employee =
          if next.selected.employee
            == Some(id)
          {
            None
          } else {
            Some(id)
          };
      }
      | FilterAction::Apply(dropdown) => {
        match dropdown {
          | FilterDropdown::Departments => {
            next.applied.departments = next
              .selected
              .departments
              .clone();
          }
          | FilterDropdown::Priorities => {
            next.applied.priorities = next
              .selected
              .priorities
              .clone();
          }
          | FilterDropdown::Employees => {
            next.applied.employee =
              next.selected.employee;
          }
        }
        if next.open == Some(dropdown) {
          next.open = None;
        }
      }
      | FilterAction::RemoveChip(chip) => {
        match chip {
          | FilterChip::Department(id) => {
            next
              .applied
              .departments
              .remove(&id);
            next
              .selected
              .departments
              .remove(&id);
          }
          | FilterChip::Priority(id) => {
            next
              .applied
              .priorities
              .remove(&id);
            next
              .selected
              .priorities
              .remove(&id);
          }
          | FilterChip::Employee => {
            next.applied.employee = None;
            next.selected.employee = None;
          }
        }
      }
      | FilterAction::ClearAll => {
        next.applied =
          FilterSelection::default();
        next.selected =
          FilterSelection::default();
      }
    }
    next
  }

  pub fn is_open(
    &self,
    dropdown: FilterDropdown
  ) -> bool {
    self.open == Some(dropdown)
  }

  pub fn has_active_filters(
    &self
  ) -> bool {
    !self.applied.is_empty()
  }

  pub fn visible<'a>(
    &self,
    tasks: &'a [Task]
  ) -> Vec<&'a Task> {
    tasks
      .iter()
      .filter(|task| {
        self.applied.matches(task)
      })
      .collect()
  }

  /// Chips for the applied filter, in department, priority, employee
  /// order.
  pub fn active_chips(
    &self,
    lookups: &Lookups
  ) -> Vec<(FilterChip, String)> {
    let mut chips = Vec::new();
    for id in &self.applied.departments {
      chips.push((
        FilterChip::Department(*id),
        lookups
          .department_name(*id)
          .to_string()
      ));
    }
    for id in &self.applied.priorities {
      chips.push((
        FilterChip::Priority(*id),
        lookups
          .priority_name(*id)
          .to_string()
      ));
    }
    if let Some(id) =
      self.applied.employee
    {
      chips.push((
        FilterChip::Employee,
        lookups.employee_name(id)
      ));
    }
    chips
  }
}

/// A status board column.
#[derive(Debug, Clone)]
pub struct BoardColumn<'a> {
  pub status: &'a Status,
  pub tasks:  Vec<&'a Task>
}

/// Groups visible tasks under each known status, keeping the API's status
/// order. Tasks with an unknown status are dropped.
pub fn group_by_status<'a>(
  statuses: &'a [Status],
  tasks: &[&'a Task]
) -> Vec<BoardColumn<'a>> {
  statuses
    .iter()
    .map(|status| {
      let id: StatusId = status.id;
      BoardColumn {
        status,
        tasks: tasks
          .iter()
          .copied()
          .filter(|task| {
            task.status.id == id
          })
          .collect()
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use momentum_shared::{
    Department,
    Employee,
    Priority,
    TaskId
  };

  use super::*;

  fn task(
    id: u64,
    department: u64,
    priority: u64,
    employee: u64,
    status: u64
  ) -> Task {
    let department = Department {
      id:   DepartmentId(department),
      name: format!("dept-{department}")
    };
    Task {
      id:             TaskId(id),
      name:           format!("task-{id}"),
      description:    None,
      due_date:       "2026-10-20".to_string(),
      status:         Status {
        id:   StatusId(status),
        name: format!("status-{status}")
      },
      priority:       Priority {
        id:   PriorityId(priority),
        name: format!("prio-{priority}"),
        icon: None
      },
      department:     department.clone(),
      employee:       Employee {
        id: EmployeeId(employee),
        name: format!("emp-{employee}"),
        surname: "x".to_string(),
        avatar: None,
        department
      },
      total_comments: 0
    }
  }

  fn tasks() -> Vec<Task> {
    vec![
      task(1, 1, 1, 10, 1),
      task(2, 1, 2, 11, 1),
      task(3, 2, 1, 12, 2),
      task(4, 3, 3, 10, 3),
    ]
  }

  fn ids(tasks: &[&Task]) -> Vec<u64> {
    tasks.iter().map(|t| t.id.0).collect()
  }

  #[test]
  fn empty_filter_shows_everything() {
    let tasks = tasks();
    let state = FilterState::default();
    assert_eq!(
      ids(&state.visible(&tasks)),
      vec![1, 2, 3, 4]
    );
  }

  #[test]
  fn toggling_does_not_change_visible_until_apply()
   {
    let tasks = tasks();
    let state = FilterState::default()
      .reduce(FilterAction::ToggleDropdown(
        FilterDropdown::Departments
      ))
      .reduce(
        FilterAction::ToggleDepartment(
          DepartmentId(1)
        )
      );
    assert_eq!(
      state.visible(&tasks).len(),
      4
    );
    assert!(
      state.is_open(
        FilterDropdown::Departments
      )
    );

    let state = state.reduce(
      FilterAction::Apply(
        FilterDropdown::Departments
      )
    );
    assert_eq!(
      ids(&state.visible(&tasks)),
      vec![1, 2]
    );
    assert_eq!(state.open, None);
  }

  #[test]
  fn dimensions_combine_with_and_members_with_or()
   {
    let tasks = tasks();
    let state = FilterState::default()
      .reduce(
        FilterAction::ToggleDepartment(
          DepartmentId(1)
        )
      )
      .reduce(
        FilterAction::ToggleDepartment(
          DepartmentId(2)
        )
      )
      .reduce(FilterAction::Apply(
        FilterDropdown::Departments
      ))
      .reduce(
        FilterAction::TogglePriority(
          PriorityId(1)
        )
      )
      .reduce(FilterAction::Apply(
        FilterDropdown::Priorities
      ));
    assert_eq!(
      ids(&state.visible(&tasks)),
      vec![1, 3]
    );

    let state = state
      .reduce(
        FilterAction::SelectEmployee(
          EmployeeId(12)
        )
      )
      .reduce(FilterAction::Apply(
        FilterDropdown::Employees
      ));
    assert_eq!(
      ids(&state.visible(&tasks)),
      vec![3]
    );
  }

  #[test]
  fn removing_only_filter_restores_excluded_tasks()
   {
    let tasks = tasks();
    let state = FilterState::default()
      .reduce(
        FilterAction::TogglePriority(
          PriorityId(3)
        )
      )
      .reduce(FilterAction::Apply(
        FilterDropdown::Priorities
      ));
    assert_eq!(
      ids(&state.visible(&tasks)),
      vec![4]
    );

    let state = state.reduce(
      FilterAction::RemoveChip(
        FilterChip::Priority(PriorityId(3))
      )
    );
    assert_eq!(
      state.visible(&tasks).len(),
      4
    );
    assert!(
      state.selected.priorities.is_empty()
    );
    assert!(!state.has_active_filters());
  }

  #[test]
  fn only_one_dropdown_is_open() {
    let state = FilterState::default()
      .reduce(FilterAction::ToggleDropdown(
        FilterDropdown::Departments
      ))
      .reduce(FilterAction::ToggleDropdown(
        FilterDropdown::Employees
      ));
    assert_eq!(
      state.open,
      Some(FilterDropdown::Employees)
    );

    let closed = state
      .clone()
      .reduce(FilterAction::ToggleDropdown(
        FilterDropdown::Employees
      ));
    assert_eq!(closed.open, None);

    let outside = state
      .reduce(FilterAction::ClickOutside);
    assert_eq!(outside.open, None);
  }

  #[test]
  fn employee_selection_toggles_off() {
    let state = FilterState::default()
      .reduce(
        FilterAction::SelectEmployee(
          EmployeeId(10)
        )
      )
      .reduce(
        FilterAction::SelectEmployee(
          EmployeeId(10)
        )
      );
    assert_eq!(
      state.selected.employee,
      None
    );
  }

  #[test]
  fn clear_all_resets_both_copies() {
    let state = FilterState::default()
      .reduce(
        FilterAction::ToggleDepartment(
          DepartmentId(1)
        )
      )
      .reduce(FilterAction::Apply(
        FilterDropdown::Departments
      ))
      .reduce(
        FilterAction::TogglePriority(
          PriorityId(2)
        )
      )
      .reduce(FilterAction::ClearAll);
    assert!(state.applied.is_empty());
    assert!(state.selected.is_empty());
  }

  #[test]
  fn groups_visible_tasks_by_status() {
    let tasks = tasks();
    let statuses: Vec<Status> = (1..=4)
      .map(|id| Status {
        id:   StatusId(id),
        name: format!("status-{id}")
      })
      .collect();
    let state = FilterState::default();
    let visible = state.visible(&tasks);
    let columns =
      group_by_status(&statuses, &visible);
    let counts: Vec<usize> = columns
      .iter()
      .map(|c| c.tasks.len())
      .collect();
    assert_eq!(counts, vec![2, 1, 1, 0]);
  }
}
