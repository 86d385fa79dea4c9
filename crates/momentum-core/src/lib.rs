pub mod api;
pub mod cascade;
pub mod cli;
pub mod commands;
pub mod comments;
pub mod config;
pub mod dashboard;
pub mod datetime;
pub mod draft;
pub mod error;
pub mod filter;
pub mod form;
pub mod lookup;
pub mod new_task;
pub mod render;
pub mod storage;
pub mod task_page;
pub mod validate;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use error::{
  ClientError,
  Result
};

#[tracing::instrument(skip_all)]
pub async fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting momentum CLI"
  );

  let mut cfg = config::Config::load(
    cli.rc_file.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  debug!(
    files = cfg.loaded_files.len(),
    "configuration loaded"
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let renderer =
    render::Renderer::new(&cfg);
  let session = commands::Session {
    cfg:      &cfg,
    data_dir: &data_dir,
    renderer: &renderer
  };

  commands::dispatch(
    &session,
    cli.command
  )
  .await?;

  info!("done");
  Ok(())
}
