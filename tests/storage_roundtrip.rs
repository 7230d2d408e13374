use std::path::Path;

use proptest::prelude::*;
use quill::editor::{Row, TextBuffer};
use quill::error::EditorError;
use quill::highlight::{Highlight, PROFILES};
use quill::storage::{ExecutionMode, ShardConfig};
use tempfile::TempDir;

const SHARD: usize = 16;

fn parallel() -> ShardConfig {
    ShardConfig {
        shard_rows: SHARD,
        workers: 4,
        mode: ExecutionMode::Parallel,
    }
}

fn serial() -> ShardConfig {
    ShardConfig {
        shard_rows: SHARD,
        workers: 1,
        mode: ExecutionMode::Serial,
    }
}

fn numbered_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 5 {
            0 => format!("int v{i} = {i};"),
            1 => format!("\t/* comment {i}"),
            2 => "still inside".to_string(),
            3 => format!("end */ char *s = \"{i}\";"),
            _ => String::new(),
        })
        .collect()
}

fn save_with(dir: &Path, name: &str, lines: &[String], config: &ShardConfig) -> Vec<u8> {
    let path = dir.join(name);
    let mut buf = TextBuffer::from_lines(lines.iter().map(String::as_str), Some(PROFILES[0]));
    buf.set_filename(&path);
    let written = buf.save(config).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(written, bytes.len() as u64);
    assert!(!buf.is_dirty());
    bytes
}

#[test]
fn test_parallel_save_is_byte_identical_to_serial() {
    let dir = TempDir::new().unwrap();
    for count in [1, SHARD - 1, SHARD, 3 * SHARD + 1] {
        let lines = numbered_lines(count);
        let concurrent = save_with(dir.path(), &format!("p{count}.c"), &lines, &parallel());
        let single = save_with(dir.path(), &format!("s{count}.c"), &lines, &serial());
        assert_eq!(concurrent, single, "row count {count}");
        let expected: usize = lines.iter().map(|l| l.len() + 1).sum();
        assert_eq!(concurrent.len(), expected);
    }
}

#[test]
fn test_parallel_load_matches_serial_load_across_shards() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.c");
    let mut content = String::new();
    // A block comment that opens in one shard and closes two shards later.
    for i in 0..(4 * SHARD) {
        match i {
            10 => content.push_str("int x; /* opens here\n"),
            45 => content.push_str("closes */ int y;\n"),
            _ => content.push_str(&format!("line {i}\n")),
        }
    }
    std::fs::write(&path, &content).unwrap();

    let mut concurrent = TextBuffer::new();
    concurrent.open(&path, &parallel()).unwrap();
    let mut single = TextBuffer::new();
    single.open(&path, &serial()).unwrap();

    assert_eq!(concurrent.rows(), single.rows());
    assert!(concurrent.row(SHARD).unwrap().open_comment());
    assert!(
        concurrent
            .row(2 * SHARD)
            .unwrap()
            .highlight()
            .iter()
            .all(|&hl| hl == Highlight::Comment)
    );
    assert!(!concurrent.row(45).unwrap().open_comment());
    assert_eq!(concurrent.row(46).unwrap().highlight()[0], Highlight::Normal);
}

#[test]
fn test_open_resets_dirty_and_cursor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "a\nb\n").unwrap();

    let mut buf = TextBuffer::from_lines(["old"], None);
    buf.insert_char(0, 0, b'x');
    buf.move_to(0, 2);
    buf.open(&path, &parallel()).unwrap();
    assert!(!buf.is_dirty());
    assert_eq!(buf.cursor().row, 0);
    assert_eq!(buf.syntax().unwrap().file_type, "txt");
    assert_eq!(buf.row_count(), 2);
}

#[test]
fn test_failed_open_leaves_buffer_untouched() {
    let mut buf = TextBuffer::from_lines(["keep me"], None);
    let err = buf
        .open(Path::new("/nonexistent/quill/missing.c"), &parallel())
        .unwrap_err();
    assert!(matches!(err, EditorError::Open { .. }));
    assert_eq!(buf.row(0).map(Row::raw), Some(b"keep me".as_slice()));
}

#[test]
fn test_save_without_filename() {
    let mut buf = TextBuffer::from_lines(["x"], None);
    assert!(matches!(buf.save(&parallel()), Err(EditorError::NoFileName)));
}

#[test]
fn test_edit_save_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edit.c");
    std::fs::write(&path, "int main() {\n\treturn 0;\n}\n").unwrap();

    let mut buf = TextBuffer::new();
    buf.open(&path, &parallel()).unwrap();
    buf.move_to(1, 0);
    for byte in b"/* gone */" {
        buf.insert_char_at_cursor(*byte);
    }
    buf.insert_newline();
    buf.save(&parallel()).unwrap();

    let mut reloaded = TextBuffer::new();
    reloaded.open(&path, &serial()).unwrap();
    assert_eq!(reloaded.to_bytes(), buf.to_bytes());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "int main() {\n/* gone */\n\treturn 0;\n}\n"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn save_then_load_preserves_rows(
        lines in proptest::collection::vec("[ -~\t]{0,40}", 0..60)
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prop.txt");
        let mut buf = TextBuffer::from_lines(lines.iter().map(String::as_str), None);
        buf.set_filename(&path);
        buf.save(&parallel()).unwrap();

        let mut loaded = TextBuffer::new();
        loaded.open(&path, &parallel()).unwrap();
        let raws: Vec<&[u8]> = loaded.rows().iter().map(Row::raw).collect();
        let expected: Vec<&[u8]> = lines.iter().map(String::as_bytes).collect();
        prop_assert_eq!(raws, expected);
    }
}
