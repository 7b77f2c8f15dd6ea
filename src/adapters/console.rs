use crate::domain::ports::{NoticeKind, Presenter, ResendDisplay};
use std::io::Write;

/// Terminal rendering of the presentation port. Modals become section
/// markers, notifications become prefixed lines.
pub struct ConsolePresenter;

fn symbol(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Info => "ℹ️",
        NoticeKind::Success => "✅",
        NoticeKind::Warning => "⚠️",
        NoticeKind::Error => "❌",
    }
}

impl Presenter for ConsolePresenter {
    fn show_modal(&self, id: &str) {
        println!();
        println!("--- {} open ---", id);
    }

    fn hide_modal(&self, id: &str) {
        println!("--- {} closed ---", id);
    }

    fn notify(&self, kind: NoticeKind, title: &str, message: &str, _duration_ms: Option<u64>) {
        println!("{} {}: {}", symbol(kind), title, message);
    }

    fn show_busy(&self, title: &str, message: &str) {
        if message.is_empty() {
            println!("... {}", title);
        } else {
            println!("... {} {}", title, message);
        }
    }

    fn clear_busy(&self) {}

    fn schedule_redirect(&self, path: &str, delay_ms: u64) {
        println!("➡ Continuing to {} in {}ms", path, delay_ms);
    }
}

pub struct ConsoleResendDisplay;

impl ResendDisplay for ConsoleResendDisplay {
    fn countdown(&self, remaining: u64) {
        print!("\rResend in {}s   ", remaining);
        std::io::stdout().flush().ok();
    }

    fn ready(&self) {
        println!();
        println!("Didn't receive? Type 'resend'.");
    }

    fn resending(&self) {
        println!("Resending...");
    }

    fn reset(&self) {
        println!();
    }
}
