//! Acceptance test harness.
//!
//! [`ScriptedRunner`] answers version-control commands from canned output so
//! the whole application runs without a repository. [`AppHarness`] wraps
//! `TuiApp<TestBackend>` with helpers for simulating user interaction and
//! waiting for background work.

use crate::config::{RenderConfig, ResolvedConfig};
use crate::model::RunnerError;
use crate::source::{BufferStream, ByteStream, CommandRunner};
use crate::state::{AppState, LaunchOptions};
use crate::view::{TuiApp, TuiError};
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ===== Fixtures =====

/// Newest commit of [`sample_log`].
pub const HEAD_SHA1: &str = "1111111111111111111111111111111111111111";
/// Root commit of [`sample_log`].
pub const ROOT_SHA1: &str = "2222222222222222222222222222222222222222";

/// Patch of [`HEAD_SHA1`]: two files.
pub const HEAD_PATCH: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
index 83db48f..bf269f4 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@
 fn main() {
-    old();
+    new();
 }
diff --git a/README.md b/README.md
index 1111111..2222222 100644
--- a/README.md
+++ b/README.md
@@ -1 +1 @@
-hello
+hello world
";

/// Patch of [`ROOT_SHA1`].
pub const ROOT_PATCH: &str = "\
diff --git a/README.md b/README.md
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/README.md
@@ -0,0 +1 @@
+hello
";

/// Patch of the staged changes.
pub const INDEX_PATCH: &str = "\
diff --git a/notes.txt b/notes.txt
index 3333333..4444444 100644
--- a/notes.txt
+++ b/notes.txt
@@ -1 +1 @@
-draft
+final
";

/// One raw log record.
pub fn log_record(sha1: &str, message: &str, parents: &str) -> Vec<u8> {
    [
        sha1,
        message,
        "Ann <ann@example.com>",
        "2024-01-02 10:00:00 +0100",
        "Bob <bob@example.com>",
        "2024-01-03 11:00:00 +0100",
        parents,
    ]
    .join("\x01")
    .into_bytes()
}

/// Two commits, newest first, NUL separated.
pub fn sample_log() -> Vec<u8> {
    let mut out = log_record(HEAD_SHA1, "Rename old to new\n\nBody text.\n", ROOT_SHA1);
    out.push(0);
    out.extend(log_record(ROOT_SHA1, "Initial import\n", ""));
    out
}

// ===== ScriptedRunner =====

/// Command runner answering from canned output.
///
/// Log commands get the log; diff commands are keyed by commit sha1,
/// `"index"` or `"worktree"`. Unknown keys fail like an unknown revision.
/// Every argument list is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    log: Vec<u8>,
    diffs: HashMap<String, Vec<u8>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedRunner {
    /// Runner serving `log`.
    pub fn new(log: Vec<u8>) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Runner for [`sample_log`] with patches for both commits and the index.
    pub fn sample() -> Self {
        Self::new(sample_log())
            .with_diff(HEAD_SHA1, HEAD_PATCH)
            .with_diff(ROOT_SHA1, ROOT_PATCH)
            .with_diff("index", INDEX_PATCH)
    }

    /// Serve `patch` for `key`.
    pub fn with_diff(mut self, key: &str, patch: impl Into<Vec<u8>>) -> Self {
        self.diffs.insert(key.to_string(), patch.into());
        self
    }

    /// Shared record of argument lists.
    pub fn calls(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        Arc::clone(&self.calls)
    }

    fn key(args: &[String]) -> Option<String> {
        match args.first().map(String::as_str)? {
            "log" => Some("log".to_string()),
            "diff-tree" => args.get(3).cloned(),
            "diff-index" => Some("index".to_string()),
            "diff-files" => Some("worktree".to_string()),
            _ => None,
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn spawn(&self, args: &[String]) -> Result<Box<dyn ByteStream>, RunnerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        let stream = match Self::key(args).as_deref() {
            Some("log") => BufferStream::new(self.log.clone()),
            Some(key) => match self.diffs.get(key) {
                Some(patch) => BufferStream::new(patch.clone()),
                None => BufferStream::failing(
                    Vec::new(),
                    128,
                    format!("fatal: bad revision '{key}'"),
                ),
            },
            None => BufferStream::failing(Vec::new(), 1, "unknown command"),
        };
        Ok(Box::new(stream))
    }
}

// ===== AppHarness =====

/// TuiApp over a TestBackend with a scripted runner.
pub struct AppHarness {
    app: TuiApp<TestBackend>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl AppHarness {
    /// 100x40 terminal, log loading started.
    pub fn new(runner: ScriptedRunner, launch: LaunchOptions) -> Result<Self, TuiError> {
        Self::with_size(runner, launch, 100, 40)
    }

    /// Custom terminal size.
    pub fn with_size(
        runner: ScriptedRunner,
        launch: LaunchOptions,
        width: u16,
        height: u16,
    ) -> Result<Self, TuiError> {
        let calls = runner.calls();
        let config = ResolvedConfig {
            find_debounce_ms: 0,
            ..ResolvedConfig::default()
        };
        let render = RenderConfig::from_resolved(&config);
        let mut state = AppState::new(Box::new(runner), config, render, launch);
        state.start();

        let terminal = Terminal::new(TestBackend::new(width, height))?;
        let mut app = TuiApp::new_for_test(terminal, state);
        app.render_test()?;
        Ok(Self { app, calls })
    }

    /// Poll background work until the log, the diff and any search are done.
    pub fn settle(&mut self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            // viewport sizes feed the search page window
            self.app.render_test().expect("render");
            let changed = self.app.app_state_mut().poll(Instant::now());
            let state = self.app.app_state();
            let idle = !state.is_loading_log()
                && !state.diff.is_loading()
                && !state.diff.find().is_searching()
                && state.diff.find().deadline().is_none();
            if idle && !changed {
                break;
            }
            assert!(Instant::now() < deadline, "background work did not settle");
            thread::sleep(Duration::from_millis(1));
        }
        self.app.render_test().expect("render");
    }

    /// Press a key without modifiers.
    pub fn press(&mut self, code: KeyCode) {
        self.press_with(code, KeyModifiers::NONE);
    }

    /// Press a key with modifiers.
    pub fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.app.handle_key_test(KeyEvent::new(code, modifiers));
        self.app.render_test().expect("render");
    }

    /// Type each char of `text`.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press(KeyCode::Char(ch));
        }
    }

    /// Left click at an absolute cell.
    pub fn click_at(&mut self, column: u16, row: u16) {
        for kind in [
            MouseEventKind::Down(MouseButton::Left),
            MouseEventKind::Up(MouseButton::Left),
        ] {
            self.app.handle_mouse_test(MouseEvent {
                kind,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            });
        }
        self.app.render_test().expect("render");
    }

    /// Application state.
    pub fn state(&self) -> &AppState {
        self.app.app_state()
    }

    /// Application state, for driving transitions directly.
    pub fn state_mut(&mut self) -> &mut AppState {
        self.app.app_state_mut()
    }

    /// Underlying app.
    pub fn app(&self) -> &TuiApp<TestBackend> {
        &self.app
    }

    /// Argument lists spawned so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Screen contents, one string per row, trailing blanks trimmed.
    pub fn screen(&self) -> Vec<String> {
        let buffer = self.app.terminal().backend().buffer();
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                let row: String = (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect();
                row.trim_end().to_string()
            })
            .collect()
    }

    /// `true` when some screen row contains `needle`.
    pub fn screen_contains(&self, needle: &str) -> bool {
        self.screen().iter().any(|row| row.contains(needle))
    }
}
