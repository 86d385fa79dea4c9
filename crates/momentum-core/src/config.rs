//! `~/.momentumrc` settings.
//!
//! The rc file is `key = value` lines with `#` comments and
//! `include <path>` directives. Only three keys exist: `data.location`,
//! `api.token` and `color`; anything else is rejected so typos surface
//! instead of being ignored.

use std::collections::HashSet;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow,
  bail
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::api::BUILD_API_TOKEN;

const RC_FILE_NAME: &str = ".momentumrc";
const RC_ENV_VAR: &str = "MOMENTUMRC";
const TOKEN_ENV_VAR: &str =
  "MOMENTUM_API_TOKEN";
const DEFAULT_DATA_LOCATION: &str =
  "~/.momentum";

pub const KEY_DATA_LOCATION: &str =
  "data.location";
pub const KEY_API_TOKEN: &str =
  "api.token";
pub const KEY_COLOR: &str = "color";

#[derive(Debug, Clone)]
pub struct Config {
  data_location:    String,
  token:            Option<String>,
  color:            bool,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_location: DEFAULT_DATA_LOCATION
        .to_string(),
      token:         None,
      color:         true,
      loaded_files:  vec![]
    }
  }
}

fn parse_switch(
  value: &str
) -> anyhow::Result<bool> {
  match value
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "on" | "yes" | "true" | "1" => {
      Ok(true)
    }
    | "off" | "no" | "false" | "0" => {
      Ok(false)
    }
    | other => {
      bail!(
        "expected on/off, got {other:?}"
      )
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::default();

    match resolve_rc_path(rc_override)? {
      | Some(path) => {
        info!(rc_file = %path.display(), "loading rc file");
        let mut loading = HashSet::new();
        cfg.load_file(&path, &mut loading)?;
      }
      | None => {
        debug!(
          "no rc file found; using \
           defaults"
        );
      }
    }

    Ok(cfg)
  }

  /// Stores one setting, rejecting unknown keys and malformed values.
  pub fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let value = value.trim();
    match key {
      | KEY_DATA_LOCATION => {
        if value.is_empty() {
          bail!(
            "{KEY_DATA_LOCATION} cannot \
             be empty"
          );
        }
        self.data_location =
          value.to_string();
      }
      | KEY_API_TOKEN => {
        self.token = (!value.is_empty())
          .then(|| value.to_string());
      }
      | KEY_COLOR => {
        self.color = parse_switch(value)
          .with_context(|| {
            format!("invalid {KEY_COLOR}")
          })?;
      }
      | other => {
        bail!(
          "unknown config key {other:?} \
           (known: {KEY_DATA_LOCATION}, \
           {KEY_API_TOKEN}, {KEY_COLOR})"
        )
      }
    }
    trace!(key, value = %redact(key, value), "config key set");
    Ok(())
  }

  /// Applies `--rc key=value` pairs; a leading `rc.` on the key is
  /// accepted.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key =
        k.strip_prefix("rc.").unwrap_or(&k);
      debug!(key, value = %redact(key, &v), "applying override");
      self.set(key, &v).with_context(
        || format!("bad override {k}")
      )?;
    }
    Ok(())
  }

  pub fn color(&self) -> bool {
    self.color
  }

  /// Config-file token, then the runtime environment, then the token baked
  /// in at build time.
  pub fn api_token(&self) -> Option<String> {
    self
      .token
      .clone()
      .or_else(|| {
        std::env::var(TOKEN_ENV_VAR)
          .ok()
          .filter(|t| !t.trim().is_empty())
      })
      .or_else(|| {
        BUILD_API_TOKEN.map(str::to_string)
      })
  }

  /// Effective settings for display, token redacted.
  pub fn entries(
    &self
  ) -> Vec<(&'static str, String)> {
    let color =
      if self.color { "on" } else { "off" };
    vec![
      (
        KEY_DATA_LOCATION,
        self.data_location.clone()
      ),
      (
        KEY_API_TOKEN,
        match &self.token {
          | Some(token) => {
            redact(KEY_API_TOKEN, token)
              .to_string()
          }
          | None => String::new()
        }
      ),
      (KEY_COLOR, color.to_string()),
    ]
  }

  /// `loading` holds the files currently being read, so an include that
  /// leads back to one of them is an error rather than endless recursion.
  #[tracing::instrument(skip(
    self, loading
  ))]
  fn load_file(
    &mut self,
    path: &Path,
    loading: &mut HashSet<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path)?;
    let canonical = path
      .canonicalize()
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    if !loading.insert(canonical.clone()) {
      bail!(
        "include cycle: {} includes \
         itself",
        canonical.display()
      );
    }

    let text = fs::read_to_string(
      &canonical
    )
    .with_context(|| {
      format!(
        "failed to read {}",
        path.display()
      )
    })?;
    self.loaded_files.push(path.clone());
    let base_dir = canonical
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();

    for (idx, raw_line) in
      text.lines().enumerate()
    {
      let line = raw_line
        .split_once('#')
        .map_or(raw_line, |(before, _)| {
          before
        })
        .trim();
      if line.is_empty() {
        continue;
      }
      let at = || {
        format!(
          "{}:{}",
          path.display(),
          idx + 1
        )
      };

      if let Some(target) =
        line.strip_prefix("include ")
      {
        let target = target.trim();
        if target.is_empty() {
          bail!(
            "{}: include needs a path",
            at()
          );
        }
        let include =
          base_dir.join(expand_tilde(
            Path::new(target)
          )?);
        if include.exists() {
          self
            .load_file(&include, loading)
            .with_context(at)?;
        } else {
          warn!(include = %include.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (key, value) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "{}: expected key = value, \
             got {raw_line:?}",
            at()
          )
        })?;
      self
        .set(key.trim(), value)
        .with_context(at)?;
    }

    loading.remove(&canonical);
    Ok(())
  }
}

/// Data directory: `--data`, else `data.location`; created when missing.
#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = match override_dir {
    | Some(path) => path.to_path_buf(),
    | None => expand_tilde(Path::new(
      &cfg.data_location
    ))?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }
  Ok(dir)
}

/// `--rc-file`, else `$MOMENTUMRC` (empty disables the rc file), else
/// `~/.momentumrc` when present.
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }
  if let Ok(from_env) =
    std::env::var(RC_ENV_VAR)
  {
    return Ok(
      (!from_env.trim().is_empty())
        .then(|| PathBuf::from(from_env))
    );
  }

  Ok(
    dirs::home_dir()
      .map(|home| home.join(RC_FILE_NAME))
      .filter(|candidate| {
        candidate.exists()
      })
  )
}

fn expand_tilde(
  path: &Path
) -> anyhow::Result<PathBuf> {
  let Ok(rest) = path.strip_prefix("~")
  else {
    return Ok(path.to_path_buf());
  };
  let home =
    dirs::home_dir().ok_or_else(|| {
      anyhow!(
        "cannot expand {}: no home \
         directory",
        path.display()
      )
    })?;
  Ok(home.join(rest))
}

pub fn redact<'a>(
  key: &str,
  value: &'a str
) -> &'a str {
  if key == KEY_API_TOKEN {
    "<redacted>"
  } else {
    value
  }
}
