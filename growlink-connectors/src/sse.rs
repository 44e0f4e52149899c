//! Incremental `text/event-stream` Frame Parser
//!
//! The keyed store's streaming endpoint speaks server-sent events: frames of
//! `event:` / `data:` lines terminated by a blank line, with `:`-prefixed
//! comment lines as keep-alives. Network chunks split frames at arbitrary
//! byte positions, so the parser buffers partial lines across `push` calls
//! and only emits complete frames.

/// One complete server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name from the `event:` field; `"message"` when absent.
    pub event: String,
    /// Data payload; multiple `data:` lines are joined with `\n`.
    pub data: String,
}

/// Stateful frame parser. Feed it raw chunks, get complete events back.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    /// Fresh parser with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one network chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.finish_frame() {
                    events.push(event);
                }
            } else {
                self.take_line(line);
            }
        }
        events
    }

    fn take_line(&mut self, line: &str) {
        // Comment line: the stream uses these as keep-alives.
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id/retry and unknown fields are irrelevant here
            _ => {}
        }
    }

    fn finish_frame(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        if event.is_none() && data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data: data.join("\n"),
        })
    }
}
