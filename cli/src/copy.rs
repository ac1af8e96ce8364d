//! Post-run copy prompt backed by the system clipboard.

use std::io::{self, BufRead, Write};

use xyprompt_engine::CombinationResult;
use xyprompt_engine::clipboard::{Clipboard, ClipboardError, copy_result, find_result};

/// Clipboard owned by this process. On X11 and Wayland the copied text is
/// only served while the handle lives, so it is gone once xyprompt exits
/// unless a clipboard manager picked it up.
pub struct SystemClipboard(arboard::Clipboard);

impl SystemClipboard {
    pub fn open() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|err| ClipboardError(err.to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.0
            .set_text(text.to_owned())
            .map_err(|err| ClipboardError(err.to_string()))
    }
}

/// Reads result ids from `input` until a blank line or EOF, copying each
/// matching answer.
pub fn copy_prompt<R, W, C>(
    results: &[CombinationResult],
    mut input: R,
    out: &mut W,
    clipboard: &mut C,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    C: Clipboard,
{
    writeln!(
        out,
        "Enter a result id to copy (e.g. copy_0_1); empty line to quit."
    )?;
    writeln!(
        out,
        "Copied text is held by xyprompt itself on some systems; paste it before quitting."
    )?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let id = line.trim();
        if id.is_empty() {
            break;
        }

        match find_result(results, id) {
            Some(result) => {
                let outcome = copy_result(clipboard, result);
                writeln!(out, "{} ({})", outcome.message(), result.result_id())?;
            }
            None => writeln!(out, "No result with id {id}")?,
        }
    }

    Ok(())
}
