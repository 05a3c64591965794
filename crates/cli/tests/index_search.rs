use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn netinsight(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("netinsight").expect("binary");
    cmd.current_dir(workdir)
        .env("NETINSIGHT_EMBEDDING_MODE", "stub")
        .env("NETINSIGHT_DIMENSION", "32")
        .env_remove("NETINSIGHT_INDEX_PATH")
        .env_remove("NETINSIGHT_DOCS_PATH");
    cmd
}

fn setup_runbooks() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("manifests/documentation/runbooks");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("pods.md"),
        "# Pod runbook\nOverview\n## Crash loops\nInspect logs of the previous container.\n## Image pulls\nCheck registry credentials.\n",
    )
    .unwrap();
    fs::write(
        dir.join("network.md"),
        "# Network runbook\n## DNS\nRestart CoreDNS pods.\n",
    )
    .unwrap();
    temp
}

fn index(root: &Path) -> Value {
    let output = netinsight(root)
        .args(["index", "--json"])
        .output()
        .expect("index run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn search_json(root: &Path, query: &str, k: &str) -> Vec<Value> {
    let output = netinsight(root)
        .args(["search", query, "-k", k, "--json"])
        .output()
        .expect("search run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    body.as_array().cloned().expect("array")
}

#[test]
fn index_writes_both_artifacts() {
    let temp = setup_runbooks();
    let root = temp.path();

    let summary = index(root);
    // network.md sorts first: two sections, then pods.md: three.
    assert_eq!(summary["added"], 5);
    assert_eq!(summary["total"], 5);
    assert!(root.join("netinsight_index.bin").exists());
    assert!(root.join("netinsight_docs.json").exists());

    let docs: Value =
        serde_json::from_str(&fs::read_to_string(root.join("netinsight_docs.json")).unwrap())
            .unwrap();
    assert_eq!(docs["schema_version"], 1);
    assert_eq!(docs["documents"][1], "DNS\nRestart CoreDNS pods.");
}

#[test]
fn search_ranks_exact_section_first() {
    let temp = setup_runbooks();
    let root = temp.path();
    index(root);

    let hits = search_json(root, "Image pulls\nCheck registry credentials.", "3");
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["document"], "Image pulls\nCheck registry credentials.");
    assert_eq!(hits[0]["distance"], 0.0);
    assert_eq!(hits[0]["normalized_distance"], 0.0);

    let normalized: Vec<f64> = hits
        .iter()
        .map(|h| h["normalized_distance"].as_f64().unwrap())
        .collect();
    assert!(normalized.windows(2).all(|w| w[0] <= w[1]));
    assert!(normalized.iter().all(|n| (0.0..=1.0).contains(n)));
}

#[test]
fn k_larger_than_index_returns_everything() {
    let temp = setup_runbooks();
    let root = temp.path();
    index(root);

    let hits = search_json(root, "anything", "50");
    assert_eq!(hits.len(), 5);
}

#[test]
fn append_grows_the_index() {
    let temp = setup_runbooks();
    let root = temp.path();
    index(root);

    let extra = root.join("extra");
    fs::create_dir_all(&extra).unwrap();
    fs::write(extra.join("disk.md"), "## Disk pressure\nPrune images.").unwrap();

    let output = netinsight(root)
        .args(["index", "--append", "--json", "--pattern", "extra/*.md"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["added"], 1);
    assert_eq!(summary["total"], 6);
}

#[test]
fn append_without_artifacts_starts_fresh() {
    let temp = setup_runbooks();
    let root = temp.path();

    let output = netinsight(root)
        .args(["index", "--append", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["added"], 5);
    assert_eq!(summary["total"], 5);
}

#[test]
fn append_refuses_to_overwrite_an_orphaned_index() {
    let temp = setup_runbooks();
    let root = temp.path();
    index(root);
    fs::remove_file(root.join("netinsight_docs.json")).unwrap();
    let before = fs::read(root.join("netinsight_index.bin")).unwrap();

    netinsight(root)
        .args(["index", "--append"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot append"));

    assert_eq!(fs::read(root.join("netinsight_index.bin")).unwrap(), before);
    assert!(!root.join("netinsight_docs.json").exists());
}

#[test]
fn context_prompt_wraps_sections() {
    let temp = setup_runbooks();
    let root = temp.path();
    index(root);

    netinsight(root)
        .args(["context", "DNS\nRestart CoreDNS pods.", "-k", "1", "--prompt"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Context: DNS\nRestart CoreDNS pods.\n\nQuestion: DNS\nRestart CoreDNS pods.\n\nAnswer:",
        ));
}

#[test]
fn search_without_index_explains_next_step() {
    let temp = tempdir().unwrap();
    netinsight(temp.path())
        .args(["search", "pods"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("netinsight index"));
}

#[test]
fn dimension_change_is_rejected_on_load() {
    let temp = setup_runbooks();
    let root = temp.path();
    index(root);

    netinsight(root)
        .args(["--dimension", "16", "search", "pods"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match store dimension 16"));
}

#[test]
fn empty_pattern_fails() {
    let temp = tempdir().unwrap();
    netinsight(temp.path())
        .args(["index", "--pattern", "nothing/*.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No runbook sections matched"));
}
