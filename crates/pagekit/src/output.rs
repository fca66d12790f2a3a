//! Status lines on stderr, keeping stdout for rendered HTML.
//!
//! Lines are prefixed with a right-aligned label so a run reads as a column:
//!
//! ```text
//!       Loaded /site/pagekit.toml
//!     Template templates (missing)
//! warning: 1 template path(s) not found
//! ```

use console::{Style, Term};

/// Width labels are right-aligned to.
const LABEL_WIDTH: usize = 12;

pub(crate) struct Output {
    term: Term,
    label: Style,
    heading: Style,
    warning: Style,
    error: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().green().bold(),
            heading: Style::new().cyan().bold(),
            warning: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
        }
    }

    /// `label` right-aligned and highlighted, then `msg`.
    pub(crate) fn status(&self, label: &str, msg: &str) {
        let label = self.label.apply_to(pad_label(label));
        self.write(&format!("{label} {msg}"));
    }

    /// Continuation line aligned under the messages of [`Output::status`].
    pub(crate) fn detail(&self, msg: &str) {
        self.write(&format!("{} {msg}", pad_label("")));
    }

    pub(crate) fn heading(&self, msg: &str) {
        self.write(&self.heading.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.write(&format!("{} {msg}", self.warning.apply_to("warning:")));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.write(&format!("{} {msg}", self.error.apply_to("error:")));
    }

    fn write(&self, line: &str) {
        let _ = self.term.write_line(line);
    }
}

fn pad_label(label: &str) -> String {
    format!("{label:>width$}", width = LABEL_WIDTH)
}
