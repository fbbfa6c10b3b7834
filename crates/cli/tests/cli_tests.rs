// End-to-end tests: spawn the `listwash` binary against CSV datasets in temp dirs.
//
// Every run passes an explicit empty --config so a settings file in the
// developer's config dir cannot change results, and --no-pacing so store
// calls are not throttled.
//
// Run with: cargo test -p listwash-cli --test cli_tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const LEADS_CALGARY: &str = "name;email;phone;notes\n\
                             Glow Skin Bar;;403-555-0134;\"keep; quoted\"\n\
                             Zen Nails;;780 555 0000;  spaced  \n\
                             Acme Spa;hi@acme.com;;x\n";

const MASTER_CALGARY: &str = "name,email,phone\nGlo Skin Bar,,(403) 555-0134\n";
const MASTER_EDMONTON: &str = "name,email,phone\nSomething Else,HI@ACME.COM,\n";

struct Fixture {
    dir: TempDir,
    config: PathBuf,
}

impl Fixture {
    /// `leads/` (candidate) and `master/` (reference) CSV datasets.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "").unwrap();

        let fx = Self { dir, config };
        fx.write("leads", "Calgary.csv", LEADS_CALGARY);
        fx.write("master", "Calgary.csv", MASTER_CALGARY);
        fx.write("master", "Edmonton.csv", MASTER_EDMONTON);
        fx
    }

    fn write(&self, dataset: &str, file: &str, content: &str) {
        let dir = self.dir.path().join(dataset);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), content).unwrap();
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn id(&self, rel: &str) -> String {
        self.path(rel).display().to_string()
    }

    fn listwash(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_listwash"))
            .arg("--config")
            .arg(&self.config)
            .arg("--no-pacing")
            .args(args)
            .output()
            .expect("run listwash")
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed))
}

fn str_path(p: &Path) -> &str {
    p.to_str().unwrap()
}

// ===========================================================================
// listwash check
// ===========================================================================

#[test]
fn check_writes_report_and_json_summary() {
    let fx = Fixture::new();
    let report = fx.path("dupes.csv");
    let output = fx.listwash(&[
        "check",
        "--sheet-a-id",
        &fx.id("leads"),
        "--sheet-b-id",
        &fx.id("master"),
        "--output",
        str_path(&report),
        "--json",
    ]);
    assert_ok(&output);

    let val = assert_single_json(&output);
    assert_eq!(val["meta"]["tool"], "listwash");
    assert_eq!(val["summary"]["duplicates"], 2);
    assert_eq!(val["summary"]["rows_scanned"], 3);
    assert_eq!(val["summary"]["signal_counts"]["email"], 1);

    let content = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Sheet A Tab,Sheet B Tab,Match Type,A - Business Name"));
    assert!(lines[1].starts_with("Calgary,Calgary,\"Phone, Business Name (91%)\",Glow Skin Bar"));
    assert!(lines[2].starts_with("Calgary,Edmonton,Email,Acme Spa"));

    // Nothing is modified by a check.
    assert_eq!(fx.read("leads/Calgary.csv"), LEADS_CALGARY);
    assert_eq!(fx.read("master/Edmonton.csv"), MASTER_EDMONTON);
}

#[test]
fn check_without_json_keeps_stdout_empty() {
    let fx = Fixture::new();
    let report = fx.path("dupes.csv");
    let output = fx.listwash(&[
        "check",
        "--sheet-a-id",
        &fx.id("leads"),
        "--sheet-b-id",
        &fx.id("master"),
        "--output",
        str_path(&report),
    ]);
    assert_ok(&output);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 duplicates on 2 rows"), "stderr: {stderr}");
}

#[test]
fn check_tab_filter_with_no_match_is_usage_error() {
    let fx = Fixture::new();
    let output = fx.listwash(&[
        "check",
        "--sheet-a-id",
        &fx.id("leads"),
        "--sheet-b-id",
        &fx.id("master"),
        "--tabs",
        "Banff",
        "--output",
        str_path(&fx.path("dupes.csv")),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("available tabs: Calgary"));
    assert!(!fx.path("dupes.csv").exists());
}

#[test]
fn missing_dataset_is_store_error() {
    let fx = Fixture::new();
    let output = fx.listwash(&[
        "check",
        "--sheet-a-id",
        &fx.id("nope"),
        "--sheet-b-id",
        &fx.id("master"),
        "--output",
        str_path(&fx.path("dupes.csv")),
    ]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("hint:"));
}

// ===========================================================================
// listwash remove
// ===========================================================================

const LEADS_AFTER_REMOVE: &str = "name;email;phone;notes\nZen Nails;;780 555 0000;  spaced  \n";

fn run_check(fx: &Fixture) -> PathBuf {
    let report = fx.path("dupes.csv");
    assert_ok(&fx.listwash(&[
        "check",
        "--sheet-a-id",
        &fx.id("leads"),
        "--sheet-b-id",
        &fx.id("master"),
        "--output",
        str_path(&report),
    ]));
    report
}

#[test]
fn remove_from_report_is_idempotent() {
    let fx = Fixture::new();
    let report = run_check(&fx);

    let args = [
        "remove",
        "--sheet-a-id",
        &fx.id("leads"),
        "--duplicates-report",
        str_path(&report),
        "--json",
    ];
    let first = fx.listwash(&args);
    assert_ok(&first);
    let val = assert_single_json(&first);
    assert_eq!(val["removed"], 2);
    assert_eq!(val["kept"], 1);
    assert_eq!(val["tabs_rewritten"], 1);
    assert_eq!(fx.read("leads/Calgary.csv"), LEADS_AFTER_REMOVE);

    let second = fx.listwash(&args);
    assert_ok(&second);
    let val = assert_single_json(&second);
    assert_eq!(val["removed"], 0);
    assert_eq!(val["tabs_rewritten"], 0);
    assert_eq!(fx.read("leads/Calgary.csv"), LEADS_AFTER_REMOVE);

    assert_eq!(fx.read("master/Calgary.csv"), MASTER_CALGARY);
}

#[test]
fn remove_dry_run_writes_nothing() {
    let fx = Fixture::new();
    let report = run_check(&fx);

    let output = fx.listwash(&[
        "remove",
        "--sheet-a-id",
        &fx.id("leads"),
        "--duplicates-report",
        str_path(&report),
        "--dry-run",
        "--json",
    ]);
    assert_ok(&output);
    let val = assert_single_json(&output);
    assert_eq!(val["dry_run"], true);
    assert_eq!(val["removed"], 2);
    assert_eq!(val["tabs_rewritten"], 0);
    assert_eq!(fx.read("leads/Calgary.csv"), LEADS_CALGARY);
}

#[test]
fn remove_in_process_against_reference() {
    let fx = Fixture::new();
    let output = fx.listwash(&["remove", "--sheet-a-id", &fx.id("leads"), "--sheet-b-id", &fx.id("master")]);
    assert_ok(&output);
    assert_eq!(fx.read("leads/Calgary.csv"), LEADS_AFTER_REMOVE);
}

#[test]
fn remove_reports_unknown_report_tabs() {
    let fx = Fixture::new();
    let report = fx.path("hand.csv");
    fs::write(
        &report,
        "Sheet A Tab,A - Business Name,A - Email,A - Phone\n\
         Banff,Acme Spa,hi@acme.com,\n\
         Calgary,Zen Nails,,780 555 0000\n",
    )
    .unwrap();

    let output = fx.listwash(&[
        "remove",
        "--sheet-a-id",
        &fx.id("leads"),
        "--duplicates-report",
        str_path(&report),
        "--json",
    ]);
    assert_ok(&output);
    let val = assert_single_json(&output);
    assert_eq!(val["unknown_tabs"][0], "Banff");
    assert_eq!(val["removed"], 1);
    assert!(!fx.read("leads/Calgary.csv").contains("Zen Nails"));
    assert!(fx.read("leads/Calgary.csv").contains("Acme Spa"));
}

#[test]
fn remove_tab_filter_does_not_flag_existing_tabs_as_unknown() {
    let fx = Fixture::new();
    let edmonton = "name;email;phone\nAcme Spa;hi@acme.com;\n";
    fx.write("leads", "Edmonton.csv", edmonton);
    let report = fx.path("hand.csv");
    fs::write(
        &report,
        "Sheet A Tab,A - Business Name,A - Email,A - Phone\n\
         Edmonton,Acme Spa,hi@acme.com,\n\
         Calgary,Zen Nails,,780 555 0000\n",
    )
    .unwrap();

    let output = fx.listwash(&[
        "remove",
        "--sheet-a-id",
        &fx.id("leads"),
        "--duplicates-report",
        str_path(&report),
        "--tabs",
        "Calgary",
        "--json",
    ]);
    assert_ok(&output);
    let val = assert_single_json(&output);
    assert_eq!(val["unknown_tabs"], serde_json::json!([]));
    assert_eq!(val["removed"], 1);
    assert_eq!(fx.read("leads/Edmonton.csv"), edmonton);
    assert_eq!(
        fx.read("leads/Calgary.csv"),
        "name;email;phone;notes\n\
         Glow Skin Bar;;403-555-0134;\"keep; quoted\"\n\
         Acme Spa;hi@acme.com;;x\n"
    );
}

#[test]
fn remove_rejects_report_without_required_columns() {
    let fx = Fixture::new();
    let report = fx.path("bad.csv");
    fs::write(&report, "Sheet A Tab,Match Type\nCalgary,Email\n").unwrap();

    let output = fx.listwash(&[
        "remove",
        "--sheet-a-id",
        &fx.id("leads"),
        "--duplicates-report",
        str_path(&report),
    ]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("A - Business Name"));
    assert_eq!(fx.read("leads/Calgary.csv"), LEADS_CALGARY);
}

#[test]
fn remove_requires_a_source() {
    let fx = Fixture::new();
    let output = fx.listwash(&["remove", "--sheet-a-id", &fx.id("leads")]);
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// listwash dedupe
// ===========================================================================

#[test]
fn dedupe_writes_survivors_to_new_dataset() {
    let fx = Fixture::new();
    fx.write(
        "scraped",
        "Calgary.csv",
        "name,website,phone\n\
         Acme Spa,https://www.acme.com/about,\n\
         New Place,,4035550199\n\
         Glo Skin Bar,,\n",
    );
    fx.write("scraped", "Empty.csv", "");
    fx.write("customers", "All.csv", "name,website,phone\nAcme Spa Ltd,acme.com,\nGlo Skin Bar,,\n");

    let output = fx.listwash(&[
        "dedupe",
        "--source-id",
        &fx.id("scraped"),
        "--exclusion-id",
        &fx.id("customers"),
        "--json",
    ]);
    assert_ok(&output);

    let val = assert_single_json(&output);
    assert_eq!(val["kept"], 1);
    assert_eq!(val["removed"], 2);
    assert_eq!(val["removed_by"]["website"], 1);
    assert_eq!(val["removed_by"]["business_name"], 1);

    assert_eq!(
        fx.read("scraped-deduped/Calgary.csv"),
        "name,website,phone\nNew Place,,4035550199\n"
    );
    assert_eq!(fx.read("scraped-deduped/Empty.csv"), "");
    // Inputs untouched.
    assert!(fx.read("scraped/Calgary.csv").contains("Acme Spa"));
}

#[test]
fn dedupe_keeps_header_of_tab_without_rows() {
    let fx = Fixture::new();
    fx.write("scraped", "Calgary.csv", "name,website,phone\n");
    fx.write("customers", "All.csv", "name,website,phone\nAcme Spa,acme.com,\n");

    let output = fx.listwash(&[
        "dedupe",
        "--source-id",
        &fx.id("scraped"),
        "--exclusion-id",
        &fx.id("customers"),
    ]);
    assert_ok(&output);
    assert_eq!(fx.read("scraped-deduped/Calgary.csv"), "name,website,phone\n");
}

#[test]
fn dedupe_refuses_existing_output() {
    let fx = Fixture::new();
    let output = fx.listwash(&[
        "dedupe",
        "--source-id",
        &fx.id("leads"),
        "--exclusion-id",
        &fx.id("master"),
        "--output-id",
        &fx.id("master"),
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(fx.read("master/Calgary.csv"), MASTER_CALGARY);
}

// ===========================================================================
// listwash columns / config
// ===========================================================================

#[test]
fn columns_shows_resolved_mapping() {
    let fx = Fixture::new();
    let output = fx.listwash(&["columns", "--dataset-id", &fx.id("leads"), "--json"]);
    assert_ok(&output);
    let val = assert_single_json(&output);
    let tab = &val["tabs"][0];
    assert_eq!(tab["tab"], "Calgary");
    assert_eq!(tab["mapping"]["name"], 0);
    assert_eq!(tab["mapping"]["email"], 1);
    assert_eq!(tab["mapping"]["phone"], 2);

    let text = fx.listwash(&["columns", "--dataset-id", &fx.id("leads"), "--tab", "Calgary"]);
    assert_ok(&text);
    let stdout = String::from_utf8_lossy(&text.stdout);
    assert!(stdout.contains("Calgary (3 rows)"));
    assert!(stdout.contains("email    B \"email\""));
}

#[test]
fn config_show_prints_effective_settings() {
    let fx = Fixture::new();
    fs::write(&fx.config, "[matching]\nfuzzy_threshold = 92\n").unwrap();
    let output = fx.listwash(&["config", "show"]);
    assert_ok(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fuzzy_threshold = 92"));
    assert!(stdout.contains("[retry]"));
}

#[test]
fn config_path_echoes_override() {
    let fx = Fixture::new();
    let output = fx.listwash(&["config", "path"]);
    assert_ok(&output);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), fx.config.display().to_string());
}

#[test]
fn invalid_config_is_config_error() {
    let fx = Fixture::new();
    fs::write(&fx.config, "[matching]\nfuzzy_threshold = 0\n").unwrap();
    let output = fx.listwash(&["config", "show"]);
    assert_eq!(output.status.code(), Some(6));

    fs::write(&fx.config, "[colour]\n").unwrap();
    let output = fx.listwash(&[
        "check",
        "--sheet-a-id",
        &fx.id("leads"),
        "--sheet-b-id",
        &fx.id("master"),
        "--output",
        str_path(&fx.path("dupes.csv")),
    ]);
    assert_eq!(output.status.code(), Some(6));
}
