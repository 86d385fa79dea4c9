use momentum_shared::Task;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::Result;
use crate::filter::{
  BoardColumn,
  FilterAction,
  FilterChip,
  FilterState,
  group_by_status
};
use crate::lookup::Lookups;

/// The status board: every task, the reference data, and the filter.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
  pub lookups: Lookups,
  pub tasks:   Vec<Task>,
  pub filters: FilterState
}

impl Dashboard {
  #[tracing::instrument(skip(api))]
  pub async fn open(
    api: &ApiClient
  ) -> Result<Self> {
    let (lookups, tasks) = tokio::try_join!(
      Lookups::fetch(api),
      api.tasks()
    )?;
    debug!(tasks = tasks.len(), "loaded dashboard");
    Ok(Self {
      lookups,
      tasks,
      filters: FilterState::default()
    })
  }

  pub fn dispatch(
    &mut self,
    action: FilterAction
  ) {
    let current =
      std::mem::take(&mut self.filters);
    self.filters = current.reduce(action);
  }

  pub fn visible(&self) -> Vec<&Task> {
    self.filters.visible(&self.tasks)
  }

  pub fn columns(
    &self
  ) -> Vec<BoardColumn<'_>> {
    let visible = self.visible();
    group_by_status(
      &self.lookups.statuses,
      &visible
    )
  }

  pub fn chips(
    &self
  ) -> Vec<(FilterChip, String)> {
    self.filters.active_chips(&self.lookups)
  }
}
