//! Field validation rules and per-field display state for the task and
//! employee forms.
//!
//! Every validator is a pure function of the current value. Rules are
//! checked in a fixed order and the first failing rule is reported.

use std::sync::LazyLock;

use chrono::{
  DateTime,
  Utc
};
use regex::Regex;
use thiserror::Error;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 255;
pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MIN_WORDS: usize =
  4;
pub const DESCRIPTION_MAX_CHARS: usize =
  255;
pub const AVATAR_MAX_BYTES: u64 =
  600 * 1024;

#[derive(
  Error,
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
pub enum ValidationError {
  #[error("required")]
  Required,
  #[error("min length {0}")]
  MinLength(usize),
  #[error("max length {0}")]
  MaxLength(usize),
  #[error(
    "letters only (Latin or Georgian)"
  )]
  LettersOnly,
  #[error("at least {0} words")]
  MinWords(usize),
  #[error("file larger than {max_bytes} bytes")]
  FileTooLarge { max_bytes: u64 },
  #[error("date is in the past")]
  InPast
}

pub type Verdict =
  Result<(), ValidationError>;

static LETTERS: LazyLock<Option<Regex>> =
  LazyLock::new(|| {
    Regex::new(r"^[a-zA-Zა-ჰ\s]+$").ok()
  });

fn char_len(value: &str) -> usize {
  value.chars().count()
}

/// Employee name and surname.
pub fn validate_person_name(
  value: &str
) -> Verdict {
  if value.is_empty() {
    return Err(ValidationError::Required);
  }
  let len = char_len(value);
  if len < NAME_MIN_CHARS {
    return Err(
      ValidationError::MinLength(
        NAME_MIN_CHARS
      )
    );
  }
  if len > NAME_MAX_CHARS {
    return Err(
      ValidationError::MaxLength(
        NAME_MAX_CHARS
      )
    );
  }
  if !LETTERS
    .as_ref()
    .is_some_and(|re| re.is_match(value))
  {
    return Err(
      ValidationError::LettersOnly
    );
  }
  Ok(())
}

pub fn validate_title(
  value: &str
) -> Verdict {
  if value.is_empty() {
    return Err(ValidationError::Required);
  }
  let len = char_len(value);
  if len < TITLE_MIN_CHARS {
    return Err(
      ValidationError::MinLength(
        TITLE_MIN_CHARS
      )
    );
  }
  if len > TITLE_MAX_CHARS {
    return Err(
      ValidationError::MaxLength(
        TITLE_MAX_CHARS
      )
    );
  }
  Ok(())
}

pub fn word_count(value: &str) -> usize {
  value.split_whitespace().count()
}

/// Optional; blank text passes.
pub fn validate_description(
  value: &str
) -> Verdict {
  if value.trim().is_empty() {
    return Ok(());
  }
  if word_count(value)
    < DESCRIPTION_MIN_WORDS
  {
    return Err(
      ValidationError::MinWords(
        DESCRIPTION_MIN_WORDS
      )
    );
  }
  if char_len(value)
    > DESCRIPTION_MAX_CHARS
  {
    return Err(
      ValidationError::MaxLength(
        DESCRIPTION_MAX_CHARS
      )
    );
  }
  Ok(())
}

/// `size` is the byte size of the chosen file, if any.
pub fn validate_avatar(
  size: Option<u64>
) -> Verdict {
  match size {
    | None => {
      Err(ValidationError::Required)
    }
    | Some(bytes)
      if bytes > AVATAR_MAX_BYTES =>
    {
      Err(
        ValidationError::FileTooLarge {
          max_bytes: AVATAR_MAX_BYTES
        }
      )
    }
    | Some(_) => Ok(())
  }
}

/// Selector fields: department, priority, status, employee.
pub fn validate_selected<T>(
  value: Option<&T>
) -> Verdict {
  value
    .map(|_| ())
    .ok_or(ValidationError::Required)
}

/// The deadline's calendar day may not precede today's.
pub fn validate_deadline(
  value: Option<DateTime<Utc>>,
  now: DateTime<Utc>
) -> Verdict {
  let deadline = value
    .ok_or(ValidationError::Required)?;
  if deadline.date_naive()
    < now.date_naive()
  {
    return Err(ValidationError::InPast);
  }
  Ok(())
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FieldTone {
  Neutral,
  Valid,
  Invalid
}

/// Values that can be "empty" for display purposes.
pub trait FieldValue {
  fn is_blank(&self) -> bool;
}

impl FieldValue for String {
  fn is_blank(&self) -> bool {
    self.trim().is_empty()
  }
}

impl<T> FieldValue for Option<T> {
  fn is_blank(&self) -> bool {
    self.is_none()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldState<T> {
  value:   T,
  touched: bool,
  error:   Option<ValidationError>
}

impl<T: FieldValue> FormFieldState<T> {
  pub fn untouched(
    value: T,
    verdict: Verdict
  ) -> Self {
    Self {
      value,
      touched: false,
      error: verdict.err()
    }
  }

  pub fn value(&self) -> &T {
    &self.value
  }

  pub fn touched(&self) -> bool {
    self.touched
  }

  /// Current error regardless of `touched`.
  pub fn error(
    &self
  ) -> Option<ValidationError> {
    self.error
  }

  pub fn is_valid(&self) -> bool {
    self.error.is_none()
  }

  pub fn change(
    &mut self,
    value: T,
    verdict: Verdict
  ) {
    self.value = value;
    self.touched = true;
    self.error = verdict.err();
  }

  /// Programmatic update (hydration, cascades) that leaves `touched` as is.
  pub fn assign(
    &mut self,
    value: T,
    verdict: Verdict
  ) {
    self.value = value;
    self.error = verdict.err();
  }

  pub fn blur(&mut self) {
    self.touched = true;
  }

  /// The error a user should see: only after the field was touched.
  pub fn displayed_error(
    &self
  ) -> Option<ValidationError> {
    if self.touched {
      self.error
    } else {
      None
    }
  }

  pub fn tone(&self) -> FieldTone {
    if !self.touched {
      return FieldTone::Neutral;
    }
    if self.error.is_some() {
      FieldTone::Invalid
    } else if self.value.is_blank() {
      FieldTone::Neutral
    } else {
      FieldTone::Valid
    }
  }
}

/// Hint lines rendered under the title and description inputs.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum HintRule {
  MinChars(usize),
  MaxChars(usize),
  MinWords(usize)
}

impl HintRule {
  pub fn label(&self) -> String {
    match self {
      | Self::MinChars(n) => {
        format!("min {n} characters")
      }
      | Self::MaxChars(n) => {
        format!("max {n} characters")
      }
      | Self::MinWords(n) => {
        format!("min {n} words")
      }
    }
  }
}

pub fn hint_tone(
  value: &str,
  rule: HintRule
) -> FieldTone {
  let satisfied = match rule {
    | HintRule::MinChars(n) => {
      if value.is_empty() {
        return FieldTone::Neutral;
      }
      char_len(value) >= n
    }
    | HintRule::MaxChars(n) => {
      if value.is_empty() {
        return FieldTone::Neutral;
      }
      char_len(value) <= n
    }
    | HintRule::MinWords(n) => {
      if value.trim().is_empty() {
        return FieldTone::Neutral;
      }
      word_count(value) >= n
    }
  };

  if satisfied {
    FieldTone::Valid
  } else {
    FieldTone::Invalid
  }
}

pub const TITLE_HINTS: [HintRule; 2] = [
  HintRule::MinChars(TITLE_MIN_CHARS),
  HintRule::MaxChars(TITLE_MAX_CHARS)
];

pub const DESCRIPTION_HINTS: [HintRule;
  2] = [
  HintRule::MinWords(
    DESCRIPTION_MIN_WORDS
  ),
  HintRule::MaxChars(
    DESCRIPTION_MAX_CHARS
  )
];
