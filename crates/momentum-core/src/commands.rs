use std::collections::BTreeSet;
use std::io::{
  self,
  Write
};
use std::path::Path;

use anyhow::{
  Context,
  anyhow
};
use chrono::Utc;
use momentum_shared::{
  CommentId,
  DepartmentId,
  EmployeeId,
  PriorityId,
  StatusId,
  TaskId
};
use tracing::{
  debug,
  info,
  instrument
};

use crate::api::ApiClient;
use crate::cascade::CascadeEffect;
use crate::cli::{
  BoardArgs,
  Command,
  DraftCommand,
  DraftSetArgs,
  EmployeeCommand,
  TaskCommand
};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::datetime::parse_deadline_input;
use crate::draft::DraftStore;
use crate::error::ClientError;
use crate::filter::{
  FilterAction,
  FilterDropdown
};
use crate::form::{
  AvatarFile,
  EmployeeForm
};
use crate::lookup::Lookups;
use crate::new_task::NewTaskPage;
use crate::render::Renderer;
use crate::storage::FileStorage;
use crate::task_page::TaskPage;

/// Everything a command needs besides its own arguments.
pub struct Session<'a> {
  pub cfg:      &'a Config,
  pub data_dir: &'a Path,
  pub renderer: &'a Renderer
}

impl Session<'_> {
  fn api(&self) -> anyhow::Result<ApiClient> {
    ApiClient::new(self.cfg.api_token())
      .context(
        "failed to build HTTP client"
      )
  }

  fn drafts(
    &self
  ) -> anyhow::Result<DraftStore<FileStorage>>
  {
    let storage =
      FileStorage::open(self.data_dir)
        .with_context(|| {
          format!(
            "failed to open local \
             storage in {}",
            self.data_dir.display()
          )
        })?;
    Ok(DraftStore::new(storage))
  }
}

#[instrument(skip(session, command))]
pub async fn dispatch(
  session: &Session<'_>,
  command: Command
) -> anyhow::Result<()> {
  match command {
    | Command::Board(args) => {
      cmd_board(session, &args).await
    }
    | Command::Task(TaskCommand::Show {
      id
    }) => {
      cmd_task_show(session, TaskId::from(id))
        .await
    }
    | Command::Task(TaskCommand::Status {
      id,
      status
    }) => {
      cmd_task_status(
        session,
        TaskId::from(id),
        StatusId::from(status)
      )
      .await
    }
    | Command::Comment {
      task,
      text,
      reply_to
    } => {
      cmd_comment(
        session,
        TaskId::from(task),
        &text,
        reply_to.map(CommentId::from)
      )
      .await
    }
    | Command::Draft(DraftCommand::Show) => {
      cmd_draft_show(session).await
    }
    | Command::Draft(DraftCommand::Set(
      args
    )) => cmd_draft_set(session, args).await,
    | Command::Draft(
      DraftCommand::Clear
    ) => cmd_draft_clear(session),
    | Command::Draft(
      DraftCommand::Submit
    ) => cmd_draft_submit(session).await,
    | Command::Employee(
      EmployeeCommand::Add {
        name,
        surname,
        avatar,
        department
      }
    ) => {
      cmd_employee_add(
        session,
        &name,
        &surname,
        &avatar,
        DepartmentId::from(department)
      )
      .await
    }
    | Command::Lookups => {
      cmd_lookups(session).await
    }
    | Command::Config => {
      cmd_config(session.cfg)
    }
  }
}

/// Replays command-line filters through the reducer the same way the
/// dropdowns do: open, toggle each value, apply. Repeated ids count once;
/// toggling twice would deselect them.
fn apply_board_filters(
  board: &mut Dashboard,
  args: &BoardArgs
) -> anyhow::Result<()> {
  if !args.departments.is_empty() {
    board.dispatch(
      FilterAction::ToggleDropdown(
        FilterDropdown::Departments
      )
    );
    let ids: BTreeSet<DepartmentId> = args
      .departments
      .iter()
      .copied()
      .map(DepartmentId::from)
      .collect();
    for id in ids {
      if board.lookups.department(id).is_none()
      {
        return Err(anyhow!(
          "unknown department id {id}"
        ));
      }
      board.dispatch(
        FilterAction::ToggleDepartment(id)
      );
    }
    board.dispatch(FilterAction::Apply(
      FilterDropdown::Departments
    ));
  }

  if !args.priorities.is_empty() {
    board.dispatch(
      FilterAction::ToggleDropdown(
        FilterDropdown::Priorities
      )
    );
    let ids: BTreeSet<PriorityId> = args
      .priorities
      .iter()
      .copied()
      .map(PriorityId::from)
      .collect();
    for id in ids {
      if board.lookups.priority(id).is_none()
      {
        return Err(anyhow!(
          "unknown priority id {id}"
        ));
      }
      board.dispatch(
        FilterAction::TogglePriority(id)
      );
    }
    board.dispatch(FilterAction::Apply(
      FilterDropdown::Priorities
    ));
  }

  if let Some(raw) = args.employee {
    let id = EmployeeId::from(raw);
    if board.lookups.employee(id).is_none() {
      return Err(anyhow!(
        "unknown employee id {id}"
      ));
    }
    board.dispatch(
      FilterAction::ToggleDropdown(
        FilterDropdown::Employees
      )
    );
    board.dispatch(
      FilterAction::SelectEmployee(id)
    );
    board.dispatch(FilterAction::Apply(
      FilterDropdown::Employees
    ));
  }

  Ok(())
}

#[instrument(skip(session))]
async fn cmd_board(
  session: &Session<'_>,
  args: &BoardArgs
) -> anyhow::Result<()> {
  info!("command board");
  let api = session.api()?;
  let mut board = Dashboard::open(&api)
    .await
    .context("failed to load the board")?;
  apply_board_filters(&mut board, args)?;

  debug!(
    visible = board.visible().len(),
    total = board.tasks.len(),
    "filtered board"
  );
  let mut out = io::stdout().lock();
  session
    .renderer
    .print_board(&mut out, &board)
}

#[instrument(skip(session))]
async fn cmd_task_show(
  session: &Session<'_>,
  id: TaskId
) -> anyhow::Result<()> {
  info!("command task show");
  let api = session.api()?;
  let page = TaskPage::open(&api, id).await?;
  let mut out = io::stdout().lock();
  session.renderer.print_task(&mut out, &page)
}

#[instrument(skip(session))]
async fn cmd_task_status(
  session: &Session<'_>,
  id: TaskId,
  status: StatusId
) -> anyhow::Result<()> {
  info!("command task status");
  let api = session.api()?;
  let mut page =
    TaskPage::open(&api, id).await?;
  if page.task.status.id == status {
    println!(
      "Task {id} is already {}.",
      page.task.status.name
    );
    return Ok(());
  }

  page
    .change_status(&api, status)
    .await
    .with_context(|| {
      format!(
        "failed to change status of task \
         {id}"
      )
    })?;
  println!(
    "Task {id} moved to {}.",
    page.task.status.name
  );
  Ok(())
}

#[instrument(skip(session, text))]
async fn cmd_comment(
  session: &Session<'_>,
  task: TaskId,
  text: &str,
  reply_to: Option<CommentId>
) -> anyhow::Result<()> {
  info!("command comment");
  let api = session.api()?;
  let mut page =
    TaskPage::open(&api, task).await?;

  match reply_to {
    | Some(parent) => {
      if !page
        .comments
        .iter()
        .any(|c| c.id == parent)
      {
        return Err(anyhow!(
          "comment {parent} is not a \
           top-level comment of task \
           {task}"
        ));
      }
      page.replies.toggle(parent);
      page.replies.set_text(text);
      let reply =
        page.replies.text().to_string();
      page
        .post_reply(&api, parent, &reply)
        .await?;
    }
    | None => {
      page.post_comment(&api, text).await?;
    }
  }

  let mut out = io::stdout().lock();
  session.renderer.print_task(&mut out, &page)
}

async fn open_new_task(
  session: &Session<'_>,
  api: &ApiClient
) -> anyhow::Result<NewTaskPage<FileStorage>>
{
  let drafts = session.drafts()?;
  NewTaskPage::open(api, drafts, Utc::now())
    .await
    .context(
      "failed to open the task draft"
    )
}

#[instrument(skip(session))]
async fn cmd_draft_show(
  session: &Session<'_>
) -> anyhow::Result<()> {
  info!("command draft show");
  let api = session.api()?;
  let page =
    open_new_task(session, &api).await?;
  let mut out = io::stdout().lock();
  session
    .renderer
    .print_task_form(&mut out, &page.form)
}

#[instrument(skip(session, args))]
async fn cmd_draft_set(
  session: &Session<'_>,
  args: DraftSetArgs
) -> anyhow::Result<()> {
  info!("command draft set");
  let api = session.api()?;
  let now = Utc::now();
  let mut page =
    open_new_task(session, &api).await?;

  if let Some(title) = args.title {
    page.edit(|form| form.set_title(title))?;
  }
  if let Some(description) =
    args.description
  {
    page.edit(|form| {
      form.set_description(description)
    })?;
  }
  if let Some(raw) = args.priority {
    let priority = page
      .lookups
      .priority(PriorityId::from(raw))
      .cloned()
      .ok_or_else(|| {
        anyhow!("unknown priority id {raw}")
      })?;
    page.edit(|form| {
      form.set_priority(Some(priority))
    })?;
  }
  if let Some(raw) = args.status {
    let status = page
      .lookups
      .status(StatusId::from(raw))
      .cloned()
      .ok_or_else(|| {
        anyhow!("unknown status id {raw}")
      })?;
    page.edit(|form| {
      form.set_status(Some(status))
    })?;
  }
  if let Some(raw) = args.department {
    let department = page
      .lookups
      .department(DepartmentId::from(raw))
      .cloned()
      .ok_or_else(|| {
        anyhow!(
          "unknown department id {raw}"
        )
      })?;
    let effect = page
      .select_department(&api, department)
      .await?;
    if matches!(
      effect,
      CascadeEffect::ReloadAndClearEmployee(
        _
      )
    ) && args.employee.is_none()
    {
      println!(
        "Department changed; employee \
         cleared."
      );
    }
  }
  if let Some(raw) = args.employee {
    let id = EmployeeId::from(raw);
    let employee = page
      .employees()
      .iter()
      .find(|e| e.id == id)
      .cloned()
      .ok_or_else(|| {
        anyhow!(
          "employee {id} does not belong \
           to the selected department"
        )
      })?;
    page.select_employee(employee)?;
  }
  if let Some(raw) = args.deadline {
    let deadline =
      parse_deadline_input(&raw, now)?;
    page.edit(|form| {
      form.set_deadline(Some(deadline), now)
    })?;
  }

  let mut out = io::stdout().lock();
  session
    .renderer
    .print_task_form(&mut out, &page.form)
}

#[instrument(skip(session))]
fn cmd_draft_clear(
  session: &Session<'_>
) -> anyhow::Result<()> {
  info!("command draft clear");
  let mut drafts = session.drafts()?;
  drafts.clear()?;
  println!("Draft discarded.");
  Ok(())
}

#[instrument(skip(session))]
async fn cmd_draft_submit(
  session: &Session<'_>
) -> anyhow::Result<()> {
  info!("command draft submit");
  let api = session.api()?;
  let mut page =
    open_new_task(session, &api).await?;

  match page.submit(&api, Utc::now()).await
  {
    | Ok(id) => {
      println!("Created task {id}.");
      Ok(())
    }
    | Err(err @ ClientError::Validation(_)) => {
      let mut out = io::stdout().lock();
      session
        .renderer
        .print_task_form(&mut out, &page.form)?;
      out.flush()?;
      Err(err.into())
    }
    | Err(err) => Err(anyhow::Error::new(err)
      .context("failed to create task")),
  }
}

#[instrument(skip(session))]
async fn cmd_employee_add(
  session: &Session<'_>,
  name: &str,
  surname: &str,
  avatar: &Path,
  department: DepartmentId
) -> anyhow::Result<()> {
  info!("command employee add");
  let api = session.api()?;
  let departments = api.departments().await?;

  let mut form = EmployeeForm::default();
  form.set_name(name);
  form.set_surname(surname);
  let file = AvatarFile::read(avatar)
    .with_context(|| {
      format!(
        "failed to read avatar {}",
        avatar.display()
      )
    })?;
  form.set_avatar(Some(file));
  form.set_department(
    departments
      .into_iter()
      .find(|d| d.id == department)
  );
  form.touch_all();

  let upload = form.to_upload()?;
  let id = api.create_employee(upload).await?;
  println!(
    "Created employee {id} ({name} \
     {surname})."
  );
  Ok(())
}

#[instrument(skip(session))]
async fn cmd_lookups(
  session: &Session<'_>
) -> anyhow::Result<()> {
  info!("command lookups");
  let api = session.api()?;
  let lookups = Lookups::fetch(&api).await?;
  let mut out = io::stdout().lock();
  session
    .renderer
    .print_lookups(&mut out, &lookups)
}

fn cmd_config(
  cfg: &Config
) -> anyhow::Result<()> {
  let mut out = io::stdout().lock();
  for (key, value) in cfg.entries() {
    writeln!(out, "{key} = {value}")?;
  }
  for path in &cfg.loaded_files {
    writeln!(
      out,
      "# loaded {}",
      path.display()
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use momentum_shared::{
    Department,
    Employee,
    Priority
  };

  use super::*;

  fn board() -> Dashboard {
    let design = Department {
      id:   DepartmentId::from(1),
      name: "დიზაინი".to_string()
    };
    Dashboard {
      lookups: Lookups {
        statuses:    vec![],
        priorities:  vec![Priority {
          id:   PriorityId::from(2),
          name: "მაღალი".to_string(),
          icon: None
        }],
        departments: vec![design.clone()],
        employees:   vec![Employee {
          id:         EmployeeId::from(9),
          name:       "ნინო".to_string(),
          surname:    "ბერიძე".to_string(),
          avatar:     None,
          department: design
        }]
      },
      ..Dashboard::default()
    }
  }

  #[test]
  fn board_filters_are_applied_and_dropdowns_closed() {
    let mut board = board();
    let args = BoardArgs {
      departments: vec![1],
      priorities:  vec![2],
      employee:    Some(9)
    };
    apply_board_filters(&mut board, &args)
      .expect("apply");

    let applied = &board.filters.applied;
    assert!(
      applied
        .departments
        .contains(&DepartmentId::from(1))
    );
    assert!(
      applied
        .priorities
        .contains(&PriorityId::from(2))
    );
    assert_eq!(
      applied.employee,
      Some(EmployeeId::from(9))
    );
    assert_eq!(board.filters.open, None);
    assert_eq!(board.chips().len(), 3);
  }

  #[test]
  fn repeated_filter_ids_stay_selected() {
    let mut board = board();
    let args = BoardArgs {
      departments: vec![1, 1],
      priorities:  vec![2, 2, 2],
      employee:    None
    };
    apply_board_filters(&mut board, &args)
      .expect("apply");

    let applied = &board.filters.applied;
    assert_eq!(
      applied.departments,
      BTreeSet::from([DepartmentId::from(1)])
    );
    assert_eq!(
      applied.priorities,
      BTreeSet::from([PriorityId::from(2)])
    );
  }

  #[test]
  fn unknown_filter_ids_are_rejected() {
    let mut board = board();
    let args = BoardArgs {
      departments: vec![42],
      ..BoardArgs::default()
    };
    let err =
      apply_board_filters(&mut board, &args)
        .expect_err("unknown department");
    assert!(
      err.to_string().contains("42")
    );
  }
}
