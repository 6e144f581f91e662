use std::io::Write;

use api::{ClipInfo, DraftResolution, Notifier};

const BELL: &str = "\x07";

/// Rings the terminal bell and prints what arrived.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn new() -> Self {
        Self
    }

    fn ring(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout only loses the notification
        let _ = writeln!(out, "{BELL}{line}").and_then(|_| out.flush());
    }
}

impl Notifier for TerminalNotifier {
    fn text_arrived(&mut self, clip: &ClipInfo) {
        self.ring(&format!("New text:\n{}", clip.text));
    }

    fn images_arrived(&mut self, clip: &ClipInfo) {
        self.ring(&format!("{} image(s) shared", clip.images.len()));
        tracing::info!(session_id = %clip.session_id, "images available in the browser view");
    }

    fn resolve_draft(&mut self, local: &str, _remote: &str) -> DraftResolution {
        tracing::warn!(chars = local.chars().count(), "remote text differs from local draft, keeping draft");
        DraftResolution::KeepLocal
    }
}
