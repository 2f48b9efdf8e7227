//! Response policy shared by both session backends.

use std::time::{Duration, Instant};

use crate::channel::{CooldownClock, RollingBuffer};
use crate::detector::PromptDetector;

/// A response that is due to be written to the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Source of the pattern that matched.
    pub pattern: String,

    /// Text to send, without the trailing newline.
    pub response: String,
}

impl Reply {
    /// Bytes written to the child's input.
    pub fn payload(&self) -> Vec<u8> {
        format!("{}\n", self.response).into_bytes()
    }

    /// One-line notice shown on the terminal in verbose mode.
    pub fn notice(&self) -> String {
        format!(
            "\r\n\x1b[33m[autoyes] responded '{}' (matched: {})\x1b[0m\r\n",
            self.response, self.pattern
        )
    }
}

/// Accumulates child output and decides when to answer a prompt.
///
/// The caller owns the write: call [`evaluate`](Self::evaluate) to get the
/// pending reply, deliver it, then [`commit`](Self::commit) whether or not
/// delivery succeeded.
#[derive(Debug)]
pub struct AutoResponder {
    detector: PromptDetector,
    default_response: String,
    buffer: RollingBuffer,
    cooldown: CooldownClock,
    verbose: bool,
}

impl AutoResponder {
    /// Create a responder with the default buffer bounds.
    pub fn new(detector: PromptDetector, response: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            detector,
            default_response: response.into(),
            buffer: RollingBuffer::default(),
            cooldown: CooldownClock::new(cooldown),
            verbose: false,
        }
    }

    /// Enable verbose notices.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Append child output.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// The reply due at `now`, if any.
    ///
    /// Returns `None` while the buffer is empty, while the cooldown is
    /// running, or when the tail line is not a prompt.
    pub fn evaluate(&self, now: Instant) -> Option<Reply> {
        if self.buffer.is_empty() || !self.cooldown.is_ready(now) {
            return None;
        }
        let result = self.detector.detect_bytes(self.buffer.as_slice())?;
        Some(Reply {
            response: result.response_or(&self.default_response).to_string(),
            pattern: result.matched_pattern,
        })
    }

    /// Record that a reply was handled at `now`.
    pub fn commit(&mut self, now: Instant) {
        self.cooldown.mark(now);
        self.buffer.clear();
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn detector(&self) -> &PromptDetector {
        &self.detector
    }

    pub fn buffer(&self) -> &RollingBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder(cooldown: Duration) -> AutoResponder {
        AutoResponder::new(PromptDetector::generic().unwrap(), "y", cooldown)
    }

    /// Feed `chunk`, then answer if a reply is due, counting replies.
    fn step(responder: &mut AutoResponder, chunk: &[u8], now: Instant, sent: &mut Vec<Reply>) {
        responder.feed(chunk);
        if let Some(reply) = responder.evaluate(now) {
            sent.push(reply);
            responder.commit(now);
        }
    }

    #[test]
    fn test_cooldown_enforcement() {
        let mut responder = responder(Duration::from_millis(500));
        let start = Instant::now();
        let mut sent = Vec::new();

        step(&mut responder, b"Continue? [y/n] ", start, &mut sent);
        step(
            &mut responder,
            b"\nProceed? [y/n] ",
            start + Duration::from_millis(100),
            &mut sent,
        );
        assert_eq!(sent.len(), 1);

        step(
            &mut responder,
            b"\nAre you sure? ",
            start + Duration::from_millis(700),
            &mut sent,
        );
        assert_eq!(sent.len(), 2);
    }

    #[test]
    fn test_delayed_prompt_answered_once_cooldown_elapses() {
        let mut responder = responder(Duration::from_millis(500));
        let start = Instant::now();
        responder.feed(b"Continue? [y/n]");
        responder.commit(start);

        responder.feed(b"Continue? [y/n]");
        assert!(responder.evaluate(start + Duration::from_millis(200)).is_none());
        assert!(responder.evaluate(start + Duration::from_millis(500)).is_some());
    }

    #[test]
    fn test_commit_clears_buffer() {
        let mut responder = responder(Duration::ZERO);
        let now = Instant::now();
        responder.feed(b"Continue? [y/n]");
        assert!(responder.evaluate(now).is_some());
        responder.commit(now);
        assert!(responder.buffer().is_empty());
        assert!(responder.evaluate(now).is_none());
    }

    #[test]
    fn test_reply_uses_canned_or_default() {
        let now = Instant::now();
        let mut responder =
            AutoResponder::new(PromptDetector::generic().unwrap(), "yes please", Duration::ZERO);

        responder.feed(b"Delete? (y/n)");
        let reply = responder.evaluate(now).unwrap();
        assert_eq!(reply.response, "yes please");
        assert_eq!(reply.payload(), b"yes please\n");
        responder.commit(now);

        responder.feed(b"Press Enter to continue");
        let reply = responder.evaluate(now).unwrap();
        assert_eq!(reply.response, "");
        assert_eq!(reply.payload(), b"\n");
    }

    #[test]
    fn test_no_reply_for_plain_output() {
        let mut responder = responder(Duration::ZERO);
        responder.feed(b"compiling 42 crates\n");
        assert!(responder.evaluate(Instant::now()).is_none());
    }

    #[test]
    fn test_notice_format() {
        let reply = Reply {
            pattern: r"\[y/n\]".into(),
            response: "y".into(),
        };
        assert_eq!(
            reply.notice(),
            "\r\n\x1b[33m[autoyes] responded 'y' (matched: \\[y/n\\])\x1b[0m\r\n"
        );
    }
}
