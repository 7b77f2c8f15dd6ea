// Adapters layer: concrete implementations of the presentation ports for
// the environments the binary runs in.

pub mod console;

pub use console::{ConsolePresenter, ConsoleResendDisplay};
