//! Department → employee dependency of the task form.
//!
//! An employee belongs to exactly one department, so a selection made under
//! one department never survives a switch to another.

use momentum_shared::DepartmentId;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum DepartmentCascade {
  #[default]
  NoDepartment,
  DepartmentSelected(DepartmentId)
}

/// Work the form must do after a department selection.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum CascadeEffect {
  /// Same department picked again.
  Unchanged,
  /// First department: load its employees.
  LoadEmployees(DepartmentId),
  /// Department switched: load the new employees and drop the stale
  /// employee, both from the form and from the stored draft.
  ReloadAndClearEmployee(DepartmentId)
}

impl DepartmentCascade {
  /// Starting state for a form hydrated from a draft; a saved department
  /// keeps its saved employee.
  pub fn hydrated(
    department: Option<DepartmentId>
  ) -> Self {
    department
      .map(Self::DepartmentSelected)
      .unwrap_or_default()
  }

  pub fn department(
    &self
  ) -> Option<DepartmentId> {
    match self {
      | Self::NoDepartment => None,
      | Self::DepartmentSelected(id) => {
        Some(*id)
      }
    }
  }

  #[must_use]
  pub fn select(
    self,
    department: DepartmentId
  ) -> (Self, CascadeEffect) {
    let effect = match self {
      | Self::NoDepartment => {
        CascadeEffect::LoadEmployees(
          department
        )
      }
      | Self::DepartmentSelected(current)
        if current == department =>
      {
        CascadeEffect::Unchanged
      }
      | Self::DepartmentSelected(_) => {
        CascadeEffect::ReloadAndClearEmployee(
          department
        )
      }
    };
    (
      Self::DepartmentSelected(department),
      effect
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_selection_only_loads() {
    let (state, effect) =
      DepartmentCascade::NoDepartment
        .select(DepartmentId(1));
    assert_eq!(
      state,
      DepartmentCascade::DepartmentSelected(
        DepartmentId(1)
      )
    );
    assert_eq!(
      effect,
      CascadeEffect::LoadEmployees(
        DepartmentId(1)
      )
    );
  }

  #[test]
  fn clears_exactly_when_department_differs()
   {
    let start =
      DepartmentCascade::hydrated(Some(
        DepartmentId(1)
      ));
    let (_, same) =
      start.select(DepartmentId(1));
    assert_eq!(
      same,
      CascadeEffect::Unchanged
    );
    let (state, other) =
      start.select(DepartmentId(2));
    assert_eq!(
      other,
      CascadeEffect::ReloadAndClearEmployee(
        DepartmentId(2)
      )
    );
    assert_eq!(
      state.department(),
      Some(DepartmentId(2))
    );
  }
}
