mod common;

use common::{RECORDS_CSV, TestWorkspace, WALLETS_TXT, fills};
use encoding_rs::UTF_8;
use wallet_sim::builder::{IdentifierList, RecordTable, TableBuilder};
use wallet_sim::config::ScanConfig;
use wallet_sim::data::Value;
use wallet_sim::similarity::scan;
use wallet_sim::workbook::{Fill, is_blank_row};
use wallet_sim::xlsx::{FillColors, load_workbook, save_workbook};

fn build(workspace: &TestWorkspace) -> wallet_sim::workbook::Workbook {
    let records_path = workspace.write("lz.csv", RECORDS_CSV);
    let wallets_path = workspace.write("wallets.txt", WALLETS_TXT);
    let records = RecordTable::load(&records_path, b',', UTF_8).expect("load records");
    let identifiers = IdentifierList::load(&wallets_path, UTF_8).expect("load wallets");
    TableBuilder::default()
        .build(&records, &identifiers)
        .expect("build workbook")
}

#[test]
fn builder_orders_rows_by_identifier_and_derives_ratios() {
    let workspace = TestWorkspace::new();
    let workbook = build(&workspace);
    let sheet = workbook.sheet("Sheet").expect("wallet sheet");

    assert_eq!(
        sheet.headers(),
        vec![
            "wallet_number", "ua", "rs", "dwm", "lzd", "amt", "tc", "chain", "ibt", "lbt",
            "atad", "average"
        ]
    );
    let keys = sheet.rows[1..]
        .iter()
        .map(|row| (row[0].value.clone(), row[1].value.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec![
            (Value::Integer(1), Value::from("0xbbb")),
            (Value::Integer(2), Value::from("0xaaa")),
            (Value::Integer(4), Value::from("0xccc")),
        ]
    );
    assert_eq!(sheet.rows[1][4].value, Value::Integer(5));
    assert_eq!(sheet.rows[1][10].value, Value::Float(2.0));
    assert_eq!(sheet.rows[3][11].value, Value::Float(1.0));
}

#[test]
fn built_workbook_scans_into_one_group() {
    let workspace = TestWorkspace::new();
    let mut workbook = build(&workspace);
    let summary = scan(&mut workbook, &ScanConfig::default()).expect("scan");

    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.groups[0].anchor, 0);
    assert_eq!(summary.groups[0].members, vec![1]);

    let similar = workbook.sheet("similarities").expect("similarity sheet");
    assert_eq!(similar.rows.len(), 3);
    assert_eq!(similar.rows[0][1].value, Value::from("0xbbb"));
    assert!(similar.rows[0].iter().all(|c| c.fill == Fill::Anchor));

    use Fill::{Match as M, None as N};
    assert_eq!(
        fills(&similar.rows[1]),
        vec![N, N, M, M, M, M, M, M, N, M, M]
    );
    assert!(is_blank_row(&similar.rows[2]));
}

#[test]
fn scanned_workbook_survives_a_save_and_reload() {
    let workspace = TestWorkspace::new();
    let mut workbook = build(&workspace);
    scan(&mut workbook, &ScanConfig::default()).expect("scan");

    let path = workspace.path().join("wallet_info.xlsx");
    save_workbook(&path, &workbook, FillColors::default()).expect("save");
    let mut reloaded = load_workbook(&path).expect("reload");

    assert_eq!(reloaded.sheet_names(), vec!["Sheet", "similarities"]);
    let similar = reloaded.sheet("similarities").expect("similarity sheet");
    // the trailing delimiter has no cells and is not persisted
    assert_eq!(similar.rows.len(), 2);
    assert_eq!(similar.rows[1][1].value, Value::from("0xaaa"));

    let again = scan(&mut reloaded, &ScanConfig::default()).expect("rescan");
    assert_eq!(again.sheet_name, "similarities1");
    assert_eq!(again.groups.len(), 1);
}
