use std::io::{IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::comments::ThreadEntry;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::datetime::{PICKER_DATE_FORMAT, format_api_date};
use crate::form::NewTaskForm;
use crate::lookup::Lookups;
use crate::task_page::TaskPage;
use crate::validate::{
    DESCRIPTION_HINTS, FieldTone, FieldValue, FormFieldState, HintRule, TITLE_HINTS, hint_tone,
};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color() && std::io::stdout().is_terminal(),
        }
    }

    /// No escape codes, whatever the terminal.
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all)]
    pub fn print_board<W: Write>(&self, out: &mut W, board: &Dashboard) -> anyhow::Result<()> {
        if board.filters.has_active_filters() {
            let labels = board
                .chips()
                .iter()
                .map(|(_, label)| format!("[{label}]"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "filters: {labels}")?;
            writeln!(out)?;
        }

        for column in board.columns() {
            writeln!(
                out,
                "{} ({})",
                self.paint(&column.status.name, "1"),
                column.tasks.len()
            )?;
            if column.tasks.is_empty() {
                writeln!(out)?;
                continue;
            }

            let headers = vec![
                "ID".to_string(),
                "Priority".to_string(),
                "Department".to_string(),
                "Title".to_string(),
                "Employee".to_string(),
                "Due".to_string(),
                "Comments".to_string(),
            ];
            let rows = column
                .tasks
                .iter()
                .map(|task| {
                    vec![
                        self.paint(&task.id.to_string(), "33"),
                        task.priority.name.clone(),
                        task.department.name.clone(),
                        task.name.clone(),
                        task.employee.full_name(),
                        format_api_date(&task.due_date),
                        task.total_comments.to_string(),
                    ]
                })
                .collect();
            write_table(&mut *out, headers, rows)?;
            writeln!(out)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_task<W: Write>(&self, out: &mut W, page: &TaskPage) -> anyhow::Result<()> {
        let task = &page.task;
        writeln!(out, "title       {}", task.name)?;
        writeln!(
            out,
            "description {}",
            task.description.clone().unwrap_or_default()
        )?;
        writeln!(out, "department  {}", task.department.name)?;
        writeln!(out, "priority    {}", task.priority.name)?;
        writeln!(out, "status      {}", task.status.name)?;
        writeln!(
            out,
            "employee    {} ({})",
            task.employee.full_name(),
            task.employee.department.name
        )?;
        writeln!(out, "due         {}", format_api_date(&task.due_date))?;
        writeln!(out)?;

        writeln!(out, "comments {}", page.comment_count())?;
        for entry in page.thread() {
            self.write_comment(out, &entry)?;
        }
        Ok(())
    }

    fn write_comment<W: Write>(&self, out: &mut W, entry: &ThreadEntry<'_>) -> anyhow::Result<()> {
        let indent = if entry.depth == 0 { "" } else { "    " };
        writeln!(
            out,
            "{indent}#{} {}",
            entry.comment.id,
            self.paint(&entry.comment.author_nickname, "36")
        )?;
        for line in entry.comment.text.lines() {
            writeln!(out, "{indent}  {line}")?;
        }
        Ok(())
    }

    pub fn print_lookups<W: Write>(&self, out: &mut W, lookups: &Lookups) -> anyhow::Result<()> {
        let sections: [(&str, Vec<(String, String)>); 4] = [
            (
                "statuses",
                lookups
                    .statuses
                    .iter()
                    .map(|s| (s.id.to_string(), s.name.clone()))
                    .collect(),
            ),
            (
                "priorities",
                lookups
                    .priorities
                    .iter()
                    .map(|p| (p.id.to_string(), p.name.clone()))
                    .collect(),
            ),
            (
                "departments",
                lookups
                    .departments
                    .iter()
                    .map(|d| (d.id.to_string(), d.name.clone()))
                    .collect(),
            ),
            (
                "employees",
                lookups
                    .employees
                    .iter()
                    .map(|e| {
                        (
                            e.id.to_string(),
                            format!("{} ({})", e.full_name(), e.department.name),
                        )
                    })
                    .collect(),
            ),
        ];

        for (title, entries) in sections {
            writeln!(out, "{}", self.paint(title, "1"))?;
            let rows = entries.into_iter().map(|(id, name)| vec![id, name]).collect();
            write_table(&mut *out, vec!["ID".to_string(), "Name".to_string()], rows)?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// Field-by-field view of the task form with validation marks.
    pub fn print_task_form<W: Write>(&self, out: &mut W, form: &NewTaskForm) -> anyhow::Result<()> {
        self.write_field(out, "title", form.title.value().clone(), &form.title)?;
        self.write_hints(out, form.title.value(), &TITLE_HINTS)?;
        self.write_field(
            out,
            "description",
            form.description.value().clone(),
            &form.description,
        )?;
        self.write_hints(out, form.description.value(), &DESCRIPTION_HINTS)?;
        self.write_field(
            out,
            "priority",
            name_or_blank(form.priority.value().as_ref().map(|p| p.name.as_str())),
            &form.priority,
        )?;
        self.write_field(
            out,
            "status",
            name_or_blank(form.status.value().as_ref().map(|s| s.name.as_str())),
            &form.status,
        )?;
        self.write_field(
            out,
            "department",
            name_or_blank(form.department.value().as_ref().map(|d| d.name.as_str())),
            &form.department,
        )?;
        self.write_field(
            out,
            "employee",
            form.employee
                .value()
                .as_ref()
                .map(|e| e.full_name())
                .unwrap_or_default(),
            &form.employee,
        )?;
        self.write_field(
            out,
            "deadline",
            form.deadline
                .value()
                .map(|d| d.format(PICKER_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            &form.deadline,
        )?;

        let ready = if form.is_valid() {
            self.paint("yes", "32")
        } else {
            self.paint("no", "31")
        };
        writeln!(out, "ready to submit: {ready}")?;
        Ok(())
    }

    fn write_field<W: Write, T: FieldValue>(
        &self,
        out: &mut W,
        label: &str,
        shown: String,
        field: &FormFieldState<T>,
    ) -> anyhow::Result<()> {
        let mark = self.tone_mark(field.tone());
        match field.displayed_error() {
            Some(error) => writeln!(out, "{mark} {label:<12} {shown}  ({error})")?,
            None => writeln!(out, "{mark} {label:<12} {shown}")?,
        }
        Ok(())
    }

    fn write_hints<W: Write>(&self, out: &mut W, value: &str, hints: &[HintRule]) -> anyhow::Result<()> {
        for rule in hints {
            let tone = hint_tone(value, *rule);
            writeln!(out, "    {} {}", self.tone_mark(tone), rule.label())?;
        }
        Ok(())
    }

    fn tone_mark(&self, tone: FieldTone) -> String {
        match tone {
            FieldTone::Neutral => "·".to_string(),
            FieldTone::Valid => self.paint("✓", "32"),
            FieldTone::Invalid => self.paint("✗", "31"),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn name_or_blank(name: Option<&str>) -> String {
    name.unwrap_or_default().to_string()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_by_display_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["ID".to_string(), "Name".to_string()],
            vec![
                vec!["1".to_string(), "დიზაინი".to_string()],
                vec!["\x1b[33m22\x1b[0m".to_string(), "IT".to_string()],
            ],
        )
        .expect("write table");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID Name    ");
        assert_eq!(lines[2], "1  დიზაინი ");
        assert!(lines[3].starts_with("\x1b[33m22\x1b[0m IT"));
    }

    #[test]
    fn plain_form_marks_touched_errors_without_escapes() {
        let now = chrono::Utc::now();
        let mut form = NewTaskForm::empty(now);
        form.set_title("ab");
        form.set_description("the login page crashes on submit");

        let mut buf = Vec::new();
        Renderer::plain()
            .print_task_form(&mut buf, &form)
            .expect("render form");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(!text.contains('\x1b'));
        let title = text
            .lines()
            .find(|line| line.contains("title"))
            .expect("title line");
        assert!(title.starts_with('✗'), "{title}");
        assert!(title.contains("(") && title.ends_with(')'), "{title}");
        let department = text
            .lines()
            .find(|line| line.contains("department"))
            .expect("department line");
        assert!(department.starts_with('·'), "{department}");
        assert!(text.ends_with("ready to submit: no\n"));
    }

    #[test]
    fn colored_renderer_wraps_marks() {
        let renderer = Renderer { color: true };
        assert_eq!(renderer.tone_mark(FieldTone::Valid), "\x1b[32m✓\x1b[0m");
        assert_eq!(Renderer::plain().tone_mark(FieldTone::Valid), "✓");
    }

    #[test]
    fn strips_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
    }
}
