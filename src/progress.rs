use indicatif::ProgressStyle;

const TICKS: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Where a generation run currently stands, as shown on the spinner line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Commits are being written; yellow animated spinner.
    Running,
    /// Every commit was created; green check.
    Done,
    /// An iteration failed; red cross.
    Failed,
}

impl Phase {
    fn template(self) -> &'static str {
        match self {
            Phase::Running => "\x1b[33m{spinner}\x1b[0m {wide_msg}",
            Phase::Done => "\x1b[32m✔\x1b[0m {wide_msg}",
            Phase::Failed => "\x1b[31m✘\x1b[0m {wide_msg}",
        }
    }

    pub fn style(self) -> ProgressStyle {
        // Templates are constants checked by the tests below.
        let style = ProgressStyle::with_template(self.template()).unwrap();
        match self {
            Phase::Running => style.tick_strings(TICKS),
            Phase::Done | Phase::Failed => style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phase_template_parses() {
        for phase in [Phase::Running, Phase::Done, Phase::Failed] {
            assert!(ProgressStyle::with_template(phase.template()).is_ok());
            let _ = phase.style();
        }
    }
}
