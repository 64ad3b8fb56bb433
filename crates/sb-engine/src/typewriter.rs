/// Progressive reveal of a dialogue line.
///
/// Plain data on a virtual clock: [`tick`](Typewriter::tick) advances the
/// reveal by elapsed seconds, [`complete`](Typewriter::complete) finishes it
/// instantly. No wall-clock timers are involved, so reveal behavior is
/// fully testable with synthetic time.
#[derive(Debug, Clone)]
pub struct Typewriter {
    target: String,
    /// Total characters (not bytes) in `target`.
    target_chars: usize,
    /// Fractional characters revealed so far.
    revealed: f64,
    /// Reveal rate in characters per second.
    cps: f64,
}

impl Typewriter {
    /// Start revealing `text` at `cps` characters per second.
    pub fn new(text: impl Into<String>, cps: f64) -> Self {
        let target = text.into();
        let target_chars = target.chars().count();
        Self {
            target,
            target_chars,
            revealed: 0.0,
            cps,
        }
    }

    /// A typewriter that is already complete (instant reveal).
    pub fn instant(text: impl Into<String>) -> Self {
        let mut tw = Self::new(text, f64::INFINITY);
        tw.complete();
        tw
    }

    /// Advance the reveal by `dt` seconds. Returns `true` exactly when this
    /// call transitions the reveal to complete.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.is_complete() {
            return false;
        }
        self.revealed = (self.revealed + self.cps * dt).min(self.target_chars as f64);
        self.is_complete()
    }

    /// Finish the reveal instantly. Returns `true` if it was not already
    /// complete.
    pub fn complete(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.revealed = self.target_chars as f64;
        true
    }

    /// The prefix revealed so far.
    pub fn displayed_text(&self) -> &str {
        let chars = self.revealed as usize;
        match self.target.char_indices().nth(chars) {
            Some((byte_idx, _)) => &self.target[..byte_idx],
            None => &self.target,
        }
    }

    /// The full authored text.
    pub fn target_text(&self) -> &str {
        &self.target
    }

    /// True once the displayed text equals the target text.
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.target_chars as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_progressively() {
        let mut tw = Typewriter::new("hello", 10.0);
        assert_eq!(tw.displayed_text(), "");
        assert!(!tw.tick(0.2)); // 2 chars
        assert_eq!(tw.displayed_text(), "he");
        assert!(!tw.is_complete());
        assert!(tw.tick(0.3)); // remaining 3 chars
        assert_eq!(tw.displayed_text(), "hello");
        assert!(tw.is_complete());
    }

    #[test]
    fn tick_after_complete_is_inert() {
        let mut tw = Typewriter::new("hi", 100.0);
        assert!(tw.tick(1.0));
        assert!(!tw.tick(1.0));
    }

    #[test]
    fn complete_reports_transition_once() {
        let mut tw = Typewriter::new("hello", 10.0);
        assert!(tw.complete());
        assert!(!tw.complete());
        assert_eq!(tw.displayed_text(), tw.target_text());
    }

    #[test]
    fn instant_is_born_complete() {
        let tw = Typewriter::instant("done");
        assert!(tw.is_complete());
        assert_eq!(tw.displayed_text(), "done");
    }

    #[test]
    fn empty_line_is_immediately_complete() {
        let tw = Typewriter::new("", 50.0);
        assert!(tw.is_complete());
    }

    #[test]
    fn multibyte_text_reveals_on_char_boundaries() {
        let mut tw = Typewriter::new("héllo ✨", 1.0);
        for _ in 0..7 {
            let before = tw.displayed_text().len();
            tw.tick(1.0);
            // Never panics slicing mid-codepoint, always grows
            assert!(tw.displayed_text().len() >= before);
        }
        assert!(tw.is_complete());
        assert_eq!(tw.displayed_text(), "héllo ✨");
    }
}
