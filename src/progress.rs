use std::io::{self, Write};
use std::time::Instant;

/// Timestamped status lines on stderr. Disabled reporters print nothing.
pub struct ConsoleProgress {
    enabled: bool,
    t0: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            t0: Instant::now(),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.enabled {
            return;
        }
        self.emit(msg.as_ref());
    }

    /// Reports a percentage computed by the caller, e.g. from the QA scan callback.
    pub fn percent(&self, label: &str, pct: u32) {
        if !self.enabled {
            return;
        }
        self.emit(&format_percent(label, pct));
    }

    fn emit(&self, line: &str) {
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{ts}] {line}");
    }
}

fn format_percent(label: &str, pct: u32) -> String {
    format!("{label} {:3}%", pct.min(100))
}

fn fmt_elapsed(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_format() {
        assert_eq!(fmt_elapsed(-3.0), "00:00");
        assert_eq!(fmt_elapsed(75.9), "01:15");
        assert_eq!(fmt_elapsed(3_725.0), "01:02:05");
    }

    #[test]
    fn percent_line_is_clamped() {
        assert_eq!(format_percent("lqa", 50), "lqa  50%");
        assert_eq!(format_percent("lqa", 140), "lqa 100%");
    }
}
