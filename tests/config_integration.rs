use std::path::PathBuf;

use quill::config::{ConfigFlags, load_config_flags, parse_flag_tokens};
use quill::storage::ExecutionMode;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".quillrc");
    let content = r#"
# comment
--serial

--workers 2

--log=quill.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.serial);
    assert_eq!(flags.workers, Some(2));
    assert_eq!(flags.log, Some(PathBuf::from("quill.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".quillrc");
    let content = "--serial\n--shard-rows 100\n--dict words.txt\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "quill".to_string(),
        "--shard-rows".to_string(),
        "250".to_string(),
        "--perf".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.serial, "file flags should remain enabled");
    assert!(effective.perf, "cli flags should be applied");
    assert_eq!(effective.shard_rows, Some(250), "cli should override shard size");
    assert_eq!(
        effective.dictionary,
        Some(PathBuf::from("words.txt")),
        "file config should be preserved when CLI does not override"
    );
    assert_eq!(effective.shard_config().mode, ExecutionMode::Serial);
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "quill".to_string(),
        "--shard-rows=64".to_string(),
        "--dict=/usr/share/dict/words".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.shard_rows, Some(64));
    assert_eq!(flags.dictionary, Some(PathBuf::from("/usr/share/dict/words")));
}

#[test]
fn test_missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
