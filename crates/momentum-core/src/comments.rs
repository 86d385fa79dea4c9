use momentum_shared::{
  Comment,
  CommentId
};

/// A comment positioned in the rendered thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadEntry<'a> {
  pub comment: &'a Comment,
  /// 0 for top-level comments, 1 for sub-comments.
  pub depth:   u8,
  pub parent:  Option<CommentId>
}

/// Each top-level comment followed by its sub-comments. Replies nested
/// deeper than one level are not rendered.
pub fn flatten_thread(
  comments: &[Comment]
) -> Vec<ThreadEntry<'_>> {
  let mut out = Vec::new();
  for comment in comments {
    out.push(ThreadEntry {
      comment,
      depth: 0,
      parent: None
    });
    for reply in &comment.sub_comments {
      out.push(ThreadEntry {
        comment: reply,
        depth:   1,
        parent:  Some(comment.id)
      });
    }
  }
  out
}

pub fn total_comment_count(
  comments: &[Comment]
) -> usize {
  comments.len()
    + comments
      .iter()
      .map(|c| c.sub_comments.len())
      .sum::<usize>()
}

/// Which top-level comment, if any, has its reply box open.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
)]
pub struct ReplyState {
  replying_to: Option<CommentId>,
  text:        String
}

impl ReplyState {
  pub fn replying_to(
    &self
  ) -> Option<CommentId> {
    self.replying_to
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn is_open(
    &self,
    id: CommentId
  ) -> bool {
    self.replying_to == Some(id)
  }

  /// Opens the box for `id`, closing any other; toggling the open one
  /// closes it.
  pub fn toggle(&mut self, id: CommentId) {
    self.replying_to =
      if self.replying_to == Some(id) {
        None
      } else {
        Some(id)
      };
  }

  pub fn set_text(
    &mut self,
    text: impl Into<String>
  ) {
    self.text = text.into();
  }

  pub fn close(&mut self) {
    self.replying_to = None;
    self.text.clear();
  }
}
