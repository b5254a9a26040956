//! End-to-end engine scenarios: key presses go through the keyboard handler
//! and the dispatcher against real directories, with no terminal attached.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use pi_core::config::Config;
use pi_core::controller::handlers::KeyboardHandler;
use pi_core::controller::{Effect, dispatch};
use pi_core::fs::object_info::EntryKind;
use pi_core::model::{MarksStore, UIMode};
use pi_core::AppState;

struct Engine {
    app: AppState,
    keys: KeyboardHandler,
}

impl Engine {
    /// Engine rooted at `root/work`, with its config stores under `root/cfg`.
    fn start(root: &Path) -> Self {
        let work = root.join("work");
        fs::create_dir_all(&work).unwrap();
        Self::start_in(root, work)
    }

    fn start_in(root: &Path, dir: PathBuf) -> Self {
        let mut config = Config::default();
        config.paths.marks_dir = root.join("cfg/marks");
        config.paths.history_file = root.join("cfg/history");
        Self {
            app: AppState::new(config, dir).unwrap(),
            keys: KeyboardHandler::default(),
        }
    }

    fn press(&mut self, code: KeyCode) -> Effect {
        let action = self
            .keys
            .handle(KeyEvent::new(code, KeyModifiers::NONE), &self.app.ui);
        dispatch(&mut self.app, action)
    }

    fn chars(&mut self, text: &str) {
        for ch in text.chars() {
            self.press(KeyCode::Char(ch));
        }
    }

    fn cursor_to(&mut self, name: &str) {
        assert!(self.app.pane.select_name(name), "{name} not listed");
    }

    fn names(&self) -> Vec<String> {
        self.app
            .pane
            .entries
            .iter()
            .map(|e| e.name.to_string())
            .collect()
    }
}

fn work_with_files(tmp: &TempDir, names: &[&str]) -> Engine {
    let work = tmp.path().join("work");
    fs::create_dir_all(&work).unwrap();
    for name in names {
        fs::write(work.join(name), name.as_bytes()).unwrap();
    }
    Engine::start(tmp.path())
}

#[test]
fn test_listing_classifies_and_orders_entries() {
    let tmp = TempDir::new().unwrap();
    let d = tmp.path().join("d");
    fs::create_dir_all(d.join("sub")).unwrap();
    fs::write(d.join("a.txt"), b"a").unwrap();
    fs::write(d.join(".hidden"), b"h").unwrap();
    symlink("a.txt", d.join("link")).unwrap();
    symlink("missing", d.join("broken")).unwrap();

    let mut engine = Engine::start_in(tmp.path(), d);

    assert_eq!(engine.names(), ["sub", "a.txt", "broken", "link"]);
    let kinds: Vec<EntryKind> = engine.app.pane.entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [
            EntryKind::Directory,
            EntryKind::File,
            EntryKind::SymlinkBroken,
            EntryKind::SymlinkActive
        ]
    );

    engine.chars(".");
    assert!(engine.names().contains(&".hidden".to_string()));
    assert_eq!(engine.names().len(), 5);
}

#[test]
fn test_delete_answered_n_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut engine = work_with_files(&tmp, &["one", "two", "three"]);

    engine.cursor_to("one");
    engine.chars("t");
    engine.cursor_to("two");
    engine.chars("t");
    engine.chars("d");
    assert!(matches!(engine.app.ui.mode, UIMode::Confirming(ref p) if p.len() == 2));

    engine.chars("n");

    assert_eq!(engine.app.ui.mode, UIMode::Browsing);
    assert_eq!(engine.names(), ["one", "three", "two"]);
    assert_eq!(engine.app.pane.selection.len(), 2);
}

#[test]
fn test_delete_answered_y_removes_selection_and_clamps_cursor() {
    let tmp = TempDir::new().unwrap();
    let mut engine = work_with_files(&tmp, &["one", "two", "three"]);

    engine.cursor_to("two");
    engine.chars("t");
    engine.cursor_to("three");
    engine.chars("t");
    engine.press(KeyCode::End);
    engine.chars("dy");

    assert_eq!(engine.names(), ["one"]);
    assert!(engine.app.pane.selection.is_empty());
    assert_eq!(engine.app.pane.cursor, 0);
}

#[test]
fn test_cut_navigate_paste_then_second_paste_is_noop() {
    let tmp = TempDir::new().unwrap();
    let mut engine = work_with_files(&tmp, &["moved.txt"]);
    let work = engine.app.cwd().to_path_buf();
    fs::create_dir(work.join("dest")).unwrap();
    engine.press(KeyCode::F(5));

    engine.cursor_to("moved.txt");
    engine.chars("x");
    engine.cursor_to("dest");
    engine.press(KeyCode::Enter);
    assert_eq!(engine.app.cwd(), work.join("dest"));

    engine.chars("p");
    assert!(work.join("dest/moved.txt").exists());
    assert!(!work.join("moved.txt").exists());
    assert!(engine.app.clipboard.is_empty());

    let before = fs::read_dir(work.join("dest")).unwrap().count();
    engine.chars("p");
    assert_eq!(fs::read_dir(work.join("dest")).unwrap().count(), before);
    assert_eq!(engine.names(), ["moved.txt"]);
}

#[test]
fn test_copy_paste_keeps_source_and_clipboard() {
    let tmp = TempDir::new().unwrap();
    let mut engine = work_with_files(&tmp, &["keep.txt"]);
    let work = engine.app.cwd().to_path_buf();
    fs::create_dir(work.join("dest")).unwrap();
    engine.press(KeyCode::F(5));

    engine.cursor_to("keep.txt");
    engine.chars("c");
    engine.cursor_to("dest");
    engine.press(KeyCode::Enter);
    engine.chars("p");

    assert_eq!(fs::read(work.join("dest/keep.txt")).unwrap(), b"keep.txt");
    assert!(work.join("keep.txt").exists());
    assert_eq!(engine.app.clipboard.len(), 1);
}

#[test]
fn test_marking_twice_leaves_one_mark() {
    let tmp = TempDir::new().unwrap();
    let mut engine = Engine::start(tmp.path());
    let work = engine.app.cwd().to_path_buf();

    for _ in 0..2 {
        engine.chars("m");
        engine.chars("proj");
        engine.press(KeyCode::Enter);
    }

    let store = MarksStore::open(tmp.path().join("cfg/marks")).unwrap();
    let marks = store.list();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].name, "proj");
    assert_eq!(store.resolve("proj"), Some(work));
}

#[test]
fn test_search_wraps_and_visits_each_match_once() {
    let tmp = TempDir::new().unwrap();
    let mut engine = work_with_files(&tmp, &["alpha", "beta", "gamma", "alphabet", "delta"]);
    engine.cursor_to("delta");

    engine.chars("/");
    engine.chars("ALPHA");
    engine.press(KeyCode::Enter);

    let mut visited = vec![engine.app.pane.current_entry().unwrap().name.to_string()];
    for _ in 0..engine.app.pane.entries.len() - 1 {
        engine.chars("n");
        visited.push(engine.app.pane.current_entry().unwrap().name.to_string());
    }

    assert_eq!(&visited[..2], ["alpha", "alphabet"]);
    assert!(visited.iter().all(|n| n.starts_with("alpha")));
    assert_eq!(visited[2], "alpha");
}

#[test]
fn test_numeric_jump_then_open_directory() {
    let tmp = TempDir::new().unwrap();
    let work = tmp.path().join("work");
    for name in ["a", "b", "c"] {
        fs::create_dir_all(work.join(name)).unwrap();
    }
    let mut engine = Engine::start(tmp.path());

    engine.chars("3");
    engine.press(KeyCode::Enter);

    assert_eq!(engine.app.pane.cursor, 2);
    assert_eq!(engine.app.cwd(), work.as_path());
    engine.press(KeyCode::Enter);
    assert_eq!(engine.app.cwd(), work.join("c"));

    engine.press(KeyCode::Tab);
    assert_eq!(engine.app.cwd(), work.as_path());
}

#[test]
fn test_opening_file_requests_opener_in_current_directory() {
    let tmp = TempDir::new().unwrap();
    let mut engine = work_with_files(&tmp, &["doc.pdf"]);

    match engine.press(KeyCode::Enter) {
        Effect::Spawn(request) => {
            assert_eq!(request.cwd, engine.app.cwd());
            assert_eq!(
                request.args,
                vec![engine.app.cwd().join("doc.pdf").into_os_string()]
            );
        }
        other => panic!("expected spawn, got {other:?}"),
    }
}
