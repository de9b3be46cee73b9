// TTY session - reassembles a character-streamed remote shell into lines

/// Marker appended server-side to the echo of a self-issued command, so
/// the client can splice it onto the prompt line instead of printing it
/// as fresh output.
pub const ECHO_SENTINEL: &str = "#QUAY";

/// What the assembler wants done after ingesting a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Fragment had no line boundary; flush after a short idle window.
    NeedsIdleFlush,
    /// One or more display lines were produced (or spliced).
    Flushed,
}

/// One remote shell session. At most one is open at a time; created on
/// the server's `started` signal, destroyed on `exited` or user quit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TtySession {
    pub is_enabled: bool,
    pub lines: Vec<String>,
    pub history: Vec<String>,
    /// Strictly within [-1, history.len()]; -1 and len both mean "no
    /// selection, use the live-typed draft".
    pub history_cursor: isize,
    pub session_type: Option<String>,
    pub draft: String,
    buffer: String,
    /// Byte length of the prompt part of the last line before an echo
    /// was spliced onto it. Lets clear-screen restore the bare prompt.
    echo_split: Option<usize>,
}

impl TtySession {
    pub fn start(&mut self, session_type: Option<String>) {
        *self = TtySession {
            is_enabled: true,
            history_cursor: -1,
            session_type,
            ..TtySession::default()
        }
    }

    pub fn quit(&mut self) {
        *self = TtySession::default();
    }

    /// Ingest a raw output fragment. Line boundaries (`\n` or `\r\n`)
    /// trigger an immediate flush; a trailing echo sentinel splices the
    /// preceding text onto the last displayed line.
    pub fn push_output(&mut self, fragment: &str) -> PushOutcome {
        self.buffer.push_str(fragment);

        if !fragment.contains('\n') && !fragment.contains('\r') {
            return PushOutcome::NeedsIdleFlush;
        }

        if self.buffer.trim_end().ends_with(ECHO_SENTINEL) {
            let command = self
                .buffer
                .split(ECHO_SENTINEL)
                .next()
                .unwrap_or_default()
                .to_string();
            match self.lines.last_mut() {
                Some(last) => {
                    self.echo_split = Some(last.len());
                    last.push_str(&command);
                }
                None => self.lines.push(command),
            }
            self.buffer.clear();
            return PushOutcome::Flushed;
        }

        let buffer = std::mem::take(&mut self.buffer);
        let parts: Vec<&str> = if buffer.contains('\r') {
            buffer.split("\r\n").collect()
        } else {
            buffer.split('\n').collect()
        };
        self.lines
            .extend(parts.into_iter().filter(|l| !l.is_empty()).map(String::from));
        self.echo_split = None;
        PushOutcome::Flushed
    }

    /// Flush whatever is buffered as one line. Called when the idle
    /// window elapses without further output.
    pub fn idle_flush(&mut self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        self.lines.push(std::mem::take(&mut self.buffer));
        self.echo_split = None;
        true
    }

    /// Record a user-submitted command and reset the history cursor.
    pub fn record_command(&mut self, command: &str) {
        self.history.push(command.to_string());
        self.history_cursor = self.history.len() as isize;
        self.draft.clear();
    }

    pub fn history_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }
        if self.history_cursor > -1 {
            self.history_cursor -= 1;
        }
    }

    pub fn history_next(&mut self) {
        if self.history.is_empty() {
            return;
        }
        if self.history_cursor < self.history.len() as isize {
            self.history_cursor += 1;
        }
    }

    /// Text the input field should show for the current history cursor.
    pub fn input_prefill(&self) -> &str {
        if self.history_cursor >= 0 && (self.history_cursor as usize) < self.history.len() {
            &self.history[self.history_cursor as usize]
        } else {
            &self.draft
        }
    }

    /// Keep only the last line, with any spliced echo stripped back off.
    pub fn clear_screen(&mut self) {
        let mut last = self.lines.pop().unwrap_or_default();
        if let Some(split) = self.echo_split.take() {
            last.truncate(split);
        }
        self.lines = vec![last];
    }
}
