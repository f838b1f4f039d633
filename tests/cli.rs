mod common;

use assert_cmd::Command;
use common::{RECORDS_CSV, TestWorkspace, WALLETS_TXT};
use predicates::{prelude::PredicateBooleanExt, str::contains};
use wallet_sim::config::ScanConfig;
use wallet_sim::xlsx::load_workbook;

fn wallet_sim() -> Command {
    Command::cargo_bin("wallet-sim").expect("binary exists")
}

#[test]
fn run_builds_scans_and_saves_once() {
    let workspace = TestWorkspace::new();
    let records = workspace.write("lz.csv", RECORDS_CSV);
    let wallets = workspace.write("wallets.txt", WALLETS_TXT);
    let output = workspace.path().join("wallet_info.xlsx");

    wallet_sim()
        .args([
            "run",
            "-i",
            records.to_str().unwrap(),
            "-w",
            wallets.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--print",
        ])
        .assert()
        .success()
        .stdout(contains("anchor"))
        .stdout(contains("0xbbb"));

    let workbook = load_workbook(&output).expect("load output");
    assert_eq!(workbook.sheet_names(), vec!["Sheet", "similarities"]);
    assert_eq!(workbook.sheet("Sheet").unwrap().rows.len(), 4);
    assert_eq!(workbook.sheet("similarities").unwrap().rows.len(), 2);
}

#[test]
fn build_then_scan_rewrites_the_workbook_in_place() {
    let workspace = TestWorkspace::new();
    let records = workspace.write("lz.csv", RECORDS_CSV);
    let wallets = workspace.write("wallets.txt", WALLETS_TXT);
    let book = workspace.path().join("wallet_info.xlsx");

    wallet_sim()
        .args([
            "build",
            "-i",
            records.to_str().unwrap(),
            "-w",
            wallets.to_str().unwrap(),
            "-o",
            book.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert_eq!(load_workbook(&book).unwrap().sheet_names(), vec!["Sheet"]);

    wallet_sim()
        .args(["scan", "-i", book.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(
        load_workbook(&book).unwrap().sheet_names(),
        vec!["Sheet", "similarities"]
    );
}

#[test]
fn scan_reads_settings_from_config_file() {
    let workspace = TestWorkspace::new();
    let records = workspace.write("lz.csv", RECORDS_CSV);
    let wallets = workspace.write("wallets.txt", WALLETS_TXT);
    let book = workspace.path().join("wallet_info.xlsx");
    let scanned = workspace.path().join("scanned.xlsx");
    let config = workspace.path().join("scan.yaml");

    wallet_sim()
        .args(["init-config", "-o", config.to_str().unwrap()])
        .assert()
        .success();
    let mut settings = ScanConfig::load(&config).expect("load generated config");
    assert_eq!(settings, ScanConfig::default());
    settings.output_sheet = "dupes".to_string();
    settings.threshold = 20;
    settings.save(&config).expect("save edited config");

    wallet_sim()
        .args([
            "build",
            "-i",
            records.to_str().unwrap(),
            "-w",
            wallets.to_str().unwrap(),
            "-o",
            book.to_str().unwrap(),
        ])
        .assert()
        .success();
    wallet_sim()
        .args([
            "scan",
            "-i",
            book.to_str().unwrap(),
            "-o",
            scanned.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--print",
        ])
        .assert()
        .success()
        .stdout(contains("anchor").not());

    let workbook = load_workbook(&scanned).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet", "dupes"]);
}

#[test]
fn missing_excluded_column_fails() {
    let workspace = TestWorkspace::new();
    let records = workspace.write("lz.csv", RECORDS_CSV);
    let wallets = workspace.write("wallets.txt", WALLETS_TXT);
    let output = workspace.path().join("wallet_info.xlsx");

    wallet_sim()
        .args([
            "run",
            "-i",
            records.to_str().unwrap(),
            "-w",
            wallets.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--exclude",
            "notes",
        ])
        .assert()
        .failure()
        .stderr(contains("column 'notes' not found"));
    assert!(!output.exists());
}

#[test]
fn unknown_key_column_fails() {
    let workspace = TestWorkspace::new();
    let records = workspace.write("lz.csv", RECORDS_CSV);
    let wallets = workspace.write("wallets.txt", WALLETS_TXT);
    let output = workspace.path().join("wallet_info.xlsx");

    wallet_sim()
        .args([
            "build",
            "-i",
            records.to_str().unwrap(),
            "-w",
            wallets.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--key-column",
            "wallet",
        ])
        .assert()
        .failure()
        .stderr(contains("Key column 'wallet' not found"));
}
