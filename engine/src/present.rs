//! Rendering run output.
//!
//! A [`Presenter`] receives the run as it happens: a heading per X, one block
//! per (X, Y) answer, and progress updates. Answers are written exactly as
//! received. Results go to the `out` writer; progress and status lines go to
//! the separate `status` writer so `out` can be piped or saved.

use std::io::{self, Write};
use xyprompt_types::{CombinationResult, RunProgress, TopicList};

/// Shown in place of an answer the model left empty.
pub const EMPTY_ANSWER_PLACEHOLDER: &str = "(empty response)";

pub trait Presenter {
    /// Called once both lists are resolved, before the first query.
    fn begin(&mut self, x_list: &TopicList, y_list: &TopicList) -> io::Result<()>;

    /// Heading for `x`, emitted before any of its Y results.
    fn group(&mut self, x_index: usize, x: &str) -> io::Result<()>;

    /// A query for (x, y) is about to be sent.
    fn pending(&mut self, _x: &str, _y: &str) -> io::Result<()> {
        Ok(())
    }

    fn result(&mut self, result: &CombinationResult) -> io::Result<()>;

    fn progress(&mut self, progress: RunProgress) -> io::Result<()>;

    fn finish(&mut self, progress: RunProgress) -> io::Result<()>;

    /// The run stopped early; output already written stays in place.
    fn abort(&mut self, message: &str) -> io::Result<()>;
}

fn answer_or_placeholder(answer: &str) -> &str {
    if answer.is_empty() {
        EMPTY_ANSWER_PLACEHOLDER
    } else {
        answer
    }
}

/// Status lines shared by the presenters.
#[derive(Debug)]
struct StatusWriter<S> {
    inner: S,
}

impl<S: Write> StatusWriter<S> {
    fn counts(&mut self, x_list: &TopicList, y_list: &TopicList) -> io::Result<()> {
        writeln!(
            self.inner,
            "Running X: {} items / Y: {} items ({} queries)",
            x_list.len(),
            y_list.len(),
            x_list.len() * y_list.len()
        )
    }

    fn pending(&mut self, x: &str, y: &str) -> io::Result<()> {
        writeln!(self.inner, "Generating: X={x} × Y={y}")
    }

    fn progress(&mut self, progress: RunProgress) -> io::Result<()> {
        writeln!(self.inner, "[{progress}] {}%", progress.percent())?;
        self.inner.flush()
    }

    fn finish(&mut self, progress: RunProgress) -> io::Result<()> {
        writeln!(
            self.inner,
            "All {} combinations generated.",
            progress.total()
        )
    }

    fn abort(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.inner, "error: {message}")?;
        self.inner.flush()
    }
}

// ============================================================================
// Plain text
// ============================================================================

/// Markdown-flavoured text output.
///
/// Each answer is followed by its result id (`[copy_0_1]`), which the copy
/// prompt accepts.
#[derive(Debug)]
pub struct TextPresenter<W, S> {
    out: W,
    status: StatusWriter<S>,
}

impl<W: Write, S: Write> TextPresenter<W, S> {
    pub fn new(out: W, status: S) -> Self {
        Self {
            out,
            status: StatusWriter { inner: status },
        }
    }

    pub fn into_inner(self) -> (W, S) {
        (self.out, self.status.inner)
    }
}

impl<W: Write, S: Write> Presenter for TextPresenter<W, S> {
    fn begin(&mut self, x_list: &TopicList, y_list: &TopicList) -> io::Result<()> {
        self.status.counts(x_list, y_list)
    }

    fn group(&mut self, _x_index: usize, x: &str) -> io::Result<()> {
        writeln!(self.out, "### X = {x}\n")
    }

    fn pending(&mut self, x: &str, y: &str) -> io::Result<()> {
        self.status.pending(x, y)
    }

    fn result(&mut self, result: &CombinationResult) -> io::Result<()> {
        writeln!(self.out, "#### Y = {}\n", result.y)?;
        writeln!(self.out, "{}\n", answer_or_placeholder(&result.answer))?;
        writeln!(self.out, "[{}]\n", result.result_id())?;
        self.out.flush()
    }

    fn progress(&mut self, progress: RunProgress) -> io::Result<()> {
        self.status.progress(progress)
    }

    fn finish(&mut self, progress: RunProgress) -> io::Result<()> {
        self.out.flush()?;
        self.status.finish(progress)
    }

    fn abort(&mut self, message: &str) -> io::Result<()> {
        self.out.flush()?;
        self.status.abort(message)
    }
}

// ============================================================================
// HTML report
// ============================================================================

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>X×Y combinations</title>
<style>
body { font-family: sans-serif; max-width: 960px; margin: 2em auto; }
.answer { white-space: pre-wrap; }
.copy { margin: 4px 0 18px 0; }
.msg { margin-left: 8px; font-size: 12px; color: gray; }
.error { color: #b00020; }
</style>
</head>
<body>
<h1>X×Y combinations</h1>
"#;

const HTML_TAIL: &str = "</body>\n</html>\n";

// `{uid}` and `{payload}` are substituted per result.
const COPY_SNIPPET: &str = r#"<div class="copy">
  <button id="{uid}_btn">Copy</button>
  <span id="{uid}_msg" class="msg"></span>
</div>
<script>
(() => {
  const btn = document.getElementById("{uid}_btn");
  const msg = document.getElementById("{uid}_msg");
  const payload = {payload};
  btn.addEventListener("click", async () => {
    try {
      await navigator.clipboard.writeText(payload);
      msg.textContent = "Copied";
    } catch (e) {
      msg.textContent = "Copy failed";
    }
    setTimeout(() => { msg.textContent = ""; }, 1500);
  });
})();
</script>
"#;

/// Escapes text for an HTML element body or attribute.
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// JSON string literal for `text`, safe to embed inside a `<script>` element.
pub fn script_payload(text: &str) -> io::Result<String> {
    let json = serde_json::to_string(text).map_err(io::Error::other)?;
    Ok(json.replace('<', "\\u003c").replace('>', "\\u003e"))
}

/// Self-contained HTML page with a copy button per answer.
#[derive(Debug)]
pub struct HtmlPresenter<W, S> {
    out: W,
    status: StatusWriter<S>,
    opened: bool,
    closed: bool,
}

impl<W: Write, S: Write> HtmlPresenter<W, S> {
    pub fn new(out: W, status: S) -> Self {
        Self {
            out,
            status: StatusWriter { inner: status },
            opened: false,
            closed: false,
        }
    }

    pub fn into_inner(self) -> (W, S) {
        (self.out, self.status.inner)
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.closed {
            self.closed = true;
            self.out.write_all(HTML_TAIL.as_bytes())?;
        }
        self.out.flush()
    }
}

impl<W: Write, S: Write> Presenter for HtmlPresenter<W, S> {
    fn begin(&mut self, x_list: &TopicList, y_list: &TopicList) -> io::Result<()> {
        self.opened = true;
        self.out.write_all(HTML_HEAD.as_bytes())?;
        writeln!(
            self.out,
            "<p>X: {} items / Y: {} items</p>\n<hr>",
            x_list.len(),
            y_list.len()
        )?;
        self.status.counts(x_list, y_list)
    }

    fn group(&mut self, _x_index: usize, x: &str) -> io::Result<()> {
        writeln!(self.out, "<h3>X = {}</h3>", html_escape(x))
    }

    fn pending(&mut self, x: &str, y: &str) -> io::Result<()> {
        self.status.pending(x, y)
    }

    fn result(&mut self, result: &CombinationResult) -> io::Result<()> {
        writeln!(self.out, "<h4>Y = {}</h4>", html_escape(&result.y))?;
        writeln!(
            self.out,
            "<div class=\"answer\">{}</div>",
            html_escape(answer_or_placeholder(&result.answer))
        )?;

        let uid = result.result_id();
        let payload = script_payload(&result.answer)?;
        let snippet = COPY_SNIPPET
            .replace("{uid}", &uid)
            .replace("{payload}", &payload);
        self.out.write_all(snippet.as_bytes())?;
        self.out.flush()
    }

    fn progress(&mut self, progress: RunProgress) -> io::Result<()> {
        self.status.progress(progress)
    }

    fn finish(&mut self, progress: RunProgress) -> io::Result<()> {
        writeln!(
            self.out,
            "<p>All {} combinations generated.</p>",
            progress.total()
        )?;
        self.close()?;
        self.status.finish(progress)
    }

    fn abort(&mut self, message: &str) -> io::Result<()> {
        // Nothing was written yet, so there is no document to close.
        if self.opened && !self.closed {
            writeln!(self.out, "<p class=\"error\">{}</p>", html_escape(message))?;
            self.close()?;
        }
        self.status.abort(message)
    }
}
