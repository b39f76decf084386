// Property tests for table ⇄ catcher JSON transposition.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use catcher_io::{
    edits_to_csv, edits_to_json_string, parse_edits_json, FieldMapping, TableOptions, TableReader,
};
use catcher_recon::CatcherEdit;
use proptest::prelude::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn mapping() -> FieldMapping {
    FieldMapping::parse("name,nick\nTitle,title\nDescription,descri\nDate,date\n").unwrap()
}

/// Cell text including delimiters, quotes and non-ASCII.
fn arb_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r#"[a-zA-Z0-9 ,"é]{1,12}"#,
        1 => Just(String::new()),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<(String, String, String)>> {
    prop::collection::vec((arb_cell(), arb_cell(), arb_cell()), 1..12)
}

fn table_text(rows: &[(String, String, String)]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Title", "Description", "Date"]).unwrap();
    for (a, b, c) in rows {
        writer.write_record([a, b, c]).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

fn to_edits(text: &str, mapping: &FieldMapping) -> Vec<CatcherEdit> {
    let options = TableOptions::default();
    TableReader::from_text(text, &options)
        .unwrap()
        .map(|row| CatcherEdit::new(None, mapping.apply(&row.unwrap(), &options.separator)))
        .collect()
}

proptest! {
    #![proptest_config(config_256())]

    /// table → JSON → table preserves every mapped cell.
    #[test]
    fn table_json_table(rows in arb_rows()) {
        let mapping = mapping();
        let edits = to_edits(&table_text(&rows), &mapping);

        let json = edits_to_json_string(&edits, &mapping.nicks()).unwrap();
        let parsed = parse_edits_json(&json).unwrap();
        prop_assert_eq!(&parsed, &edits);

        let csv_bytes = edits_to_csv(&parsed, &mapping, None, b',').unwrap();
        let again = to_edits(&String::from_utf8(csv_bytes).unwrap(), &mapping);
        prop_assert_eq!(again, edits);
    }
}

#[test]
fn repeated_headers_flow_into_one_nick() {
    let mapping = FieldMapping::parse("name,nick\nSubject,subjec\nTitle,title\n").unwrap();
    let edits = to_edits("Title,Subject,Subject\nMap,Rivers,Lakes\n", &mapping);
    assert_eq!(edits[0].value("subjec"), "Rivers; Lakes");
    let json = edits_to_json_string(&edits, &mapping.nicks()).unwrap();
    assert_eq!(
        json,
        "[\n  {\n    \"subjec\": \"Rivers; Lakes\",\n    \"title\": \"Map\"\n  }\n]\n"
    );
}
