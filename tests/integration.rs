use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn solace_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("solace");
    path
}

fn setup_test_env_with(session: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/solace.sqlite"

[settings]
path = "{root}/data/settings.toml"

[generator]
provider = "disabled"

[session]
{session}
"#,
        root = root.display(),
        session = session,
    );

    let config_path = config_dir.join("solace.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn setup_test_env() -> (TempDir, PathBuf) {
    setup_test_env_with("fallback = \"auto\"")
}

fn command(config_path: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(solace_binary());
    cmd.arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("TZ", "UTC")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn run_solace(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let output = command(config_path, args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run solace binary: {}", e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn chat(config_path: &Path, input: &str) -> (String, String, bool) {
    let mut child = command(config_path, &["chat"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn solace chat");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

const BACKUP: &str = r#"[
  {"id": 40, "date": "2024-03-09T21:15:00.000Z", "mood": "happy", "summary": "A long walk on the beach with Sam."},
  {"id": 41, "date": "2024-03-10T08:00:00.000Z", "mood": "Sad", "content": [
    {"role": "ai", "text": "Good morning. How was your day?"},
    {"role": "user", "text": "Slept badly again"}
  ]},
  {"id": 42, "date": "2024-03-10T19:30:00.000Z", "mood": "happy", "summary": "Dinner with my sister."}
]"#;

fn import_sample(tmp: &TempDir, config_path: &Path) {
    let file = tmp.path().join("backup.json");
    fs::write(&file, BACKUP).unwrap();
    let (stdout, stderr, success) = run_solace(config_path, &["import", file.to_str().unwrap()]);
    assert!(success, "import failed: {}", stderr);
    assert!(stdout.contains("Imported 3 entries."));
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_solace(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/solace.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_solace(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_solace(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_list_empty_journal() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_solace(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("No journal entries yet."));
}

#[test]
fn test_chat_saves_raw_conversation_when_summary_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = chat(&config_path, "I walked by the sea\n/end calm\n/quit\n");
    assert!(success, "chat failed: {}", stderr);
    assert!(stdout.contains("How was your day?") || stdout.contains("on your mind"));
    assert!(stdout.contains("Error: Generator is disabled"));
    assert!(stdout.contains("Failed to generate journal summary: Generator is disabled"));
    assert!(stdout.contains("Saved journal entry #1."));

    let (stdout, _, _) = run_solace(&config_path, &["list"]);
    assert!(stdout.contains("#1"));
    assert!(stdout.contains("[calm]"));
    assert!(stdout.contains("(raw)"));
    assert!(stdout.contains("I walked by the sea..."));

    let (stdout, _, _) = run_solace(&config_path, &["show", "1"]);
    assert!(stdout.contains("Me: I walked by the sea"));
}

#[test]
fn test_chat_end_without_messages_saves_nothing() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = chat(&config_path, "   \n/end happy\n");
    assert!(success);
    assert!(stdout.contains("Nothing to save yet."));

    let (stdout, _, _) = run_solace(&config_path, &["list"]);
    assert!(stdout.contains("No journal entries yet."));
}

#[test]
fn test_chat_confirm_policy_waits_for_save() {
    let (_tmp, config_path) = setup_test_env_with("fallback = \"confirm\"");

    let (stdout, _, success) = chat(&config_path, "Long day\n/end\n/save\n");
    assert!(success);
    assert!(stdout.contains("Would you like to save the raw conversation instead?"));
    assert!(stdout.contains("Saved journal entry #1."));

    let (stdout, stderr, success) = chat(&config_path, "Another one\n/end\n/cancel\n/quit\n");
    assert!(success);
    assert!(stdout.contains("keep talking"));
    assert!(stderr.contains("without saving"));

    let (stdout, _, _) = run_solace(&config_path, &["list"]);
    assert!(!stdout.contains("#2"));
}

#[test]
fn test_edit_keeps_date_and_delete_is_not_idempotent() {
    let (tmp, config_path) = setup_test_env();
    import_sample(&tmp, &config_path);

    let (stdout, _, _) = run_solace(&config_path, &["show", "1", "--json"]);
    let before: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let (_, stderr, success) = run_solace(
        &config_path,
        &["edit", "1", "--summary", "Rewritten", "--mood", "calm"],
    );
    assert!(success, "edit failed: {}", stderr);

    let (stdout, _, _) = run_solace(&config_path, &["show", "1", "--json"]);
    let after: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(after["summary"], "Rewritten");
    assert_eq!(after["mood"], "calm");
    assert_eq!(after["date"], before["date"]);

    let (stdout, _, success) = run_solace(&config_path, &["delete", "1"]);
    assert!(success);
    assert!(stdout.contains("Deleted entry #1."));

    let (_, stderr, success) = run_solace(&config_path, &["delete", "1"]);
    assert!(!success);
    assert!(stderr.contains("Entry 1 not found"));
}

#[test]
fn test_search_filters_entries() {
    let (tmp, config_path) = setup_test_env();
    import_sample(&tmp, &config_path);

    let (stdout, _, success) = run_solace(&config_path, &["search", "BEACH"]);
    assert!(success);
    assert!(stdout.contains("1 matching entries."));

    let (stdout, _, _) = run_solace(&config_path, &["search", "slept badly"]);
    assert!(stdout.contains("1 matching entries."));

    let (stdout, _, _) = run_solace(&config_path, &["search", "3/10/2024"]);
    assert!(stdout.contains("2 matching entries."));

    let (stdout, _, _) = run_solace(&config_path, &["search", "volcano"]);
    assert!(stdout.contains("No entries match"));
}

#[test]
fn test_backup_and_reimport_assigns_fresh_ids() {
    let (tmp, config_path) = setup_test_env();
    import_sample(&tmp, &config_path);

    let out = tmp.path().join("backups");
    let (stdout, stderr, success) =
        run_solace(&config_path, &["backup", "--out", out.to_str().unwrap()]);
    assert!(success, "backup failed: {}", stderr);
    assert!(stdout.contains("solace-backup-"));

    let backup = fs::read_dir(&out).unwrap().next().unwrap().unwrap().path();
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(rows.len(), 3);

    let (stdout, _, success) = run_solace(&config_path, &["import", backup.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("Imported 3 entries."));

    let (stdout, _, _) = run_solace(&config_path, &["list"]);
    assert!(stdout.contains("#6"));
    assert!(!stdout.contains("#40"));
}

#[test]
fn test_import_rejects_non_array() {
    let (tmp, config_path) = setup_test_env();
    let file = tmp.path().join("bad.json");
    fs::write(&file, r#"{"entries": []}"#).unwrap();

    let (_, stderr, success) = run_solace(&config_path, &["import", file.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Invalid backup file"));
}

#[test]
fn test_export_markdown() {
    let (tmp, config_path) = setup_test_env();
    import_sample(&tmp, &config_path);

    let (stdout, _, success) = run_solace(&config_path, &["export", "2"]);
    assert!(success);
    assert!(stdout.starts_with("# Journal Entry - 2024-03-10"));
    assert!(stdout.contains("**Mood:** Sad"));
    assert!(stdout.contains("**Me:** Slept badly again"));

    let out = tmp.path().join("md");
    let (_, _, success) = run_solace(
        &config_path,
        &["export", "1", "--out", out.to_str().unwrap()],
    );
    assert!(success);
    let md = fs::read_to_string(out.join("journal-2024-03-09.md")).unwrap();
    assert!(md.contains("## Reflection"));
}

#[test]
fn test_insights_and_day() {
    let (tmp, config_path) = setup_test_env();
    import_sample(&tmp, &config_path);

    let (stdout, _, success) = run_solace(&config_path, &["insights", "--json"]);
    assert!(success);
    let insights: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(insights["total_entries"], 3);
    assert_eq!(insights["journaling_days"], 2);
    assert_eq!(insights["mood_distribution"][0]["mood"], "happy");
    assert_eq!(insights["mood_distribution"][0]["count"], 2);

    let (stdout, _, success) = run_solace(&config_path, &["insights", "--month", "2024-03"]);
    assert!(success);
    assert!(stdout.contains("Journaling days:  2"));
    assert!(stdout.contains("Days with entries in 2024-03"));

    let (stdout, _, success) = run_solace(&config_path, &["day", "2024-03-10"]);
    assert!(success);
    assert!(stdout.contains("#3"));
    assert!(stdout.contains("#2"));
    assert!(!stdout.contains("#1 "));

    let (_, _, success) = run_solace(&config_path, &["day", "March 10"]);
    assert!(!success);
}

#[test]
fn test_settings_roundtrip_and_validation() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, _) = run_solace(&config_path, &["settings", "get", "theme"]);
    assert!(stdout.contains("theme = (not set)"));

    let (stdout, _, success) = run_solace(&config_path, &["settings", "theme"]);
    assert!(success);
    assert!(stdout.contains("Theme is now dark."));

    let (_, _, success) = run_solace(&config_path, &["settings", "set", "mode", "gratitude"]);
    assert!(success);
    let (stdout, _, _) = run_solace(&config_path, &["settings", "get", "mode"]);
    assert!(stdout.contains("mode = gratitude"));

    let (_, _, success) = run_solace(&config_path, &["settings", "set", "theme", "purple"]);
    assert!(!success);

    let (_, _, success) = run_solace(&config_path, &["settings", "set", "api_key", "AIzaSecret"]);
    assert!(success);
    let (stdout, _, _) = run_solace(&config_path, &["settings", "get", "api_key"]);
    assert!(stdout.contains("AIza****"));
    assert!(!stdout.contains("Secret"));
}

#[test]
fn test_mode_changes_greeting() {
    let (_tmp, config_path) = setup_test_env();
    run_solace(&config_path, &["settings", "set", "mode", "reflection"]);

    let (stdout, _, success) = chat(&config_path, "/quit\n");
    assert!(success);
    assert!(stdout.contains("What's on your mind?"));
}

#[test]
fn test_models_requires_enabled_generator() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_solace(&config_path, &["models"]);
    assert!(!success);
    assert!(stderr.contains("disabled"));
}

#[test]
fn test_rejects_unknown_provider() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("solace.toml");
    fs::write(
        &config_path,
        "[db]\npath = \"x.sqlite\"\n\n[generator]\nprovider = \"openai\"\n",
    )
    .unwrap();

    let (_, stderr, success) = run_solace(&config_path, &["list"]);
    assert!(!success);
    assert!(stderr.contains("Unknown generator provider"));
}
