mod common;

use chrono::NaiveDate;
use common::*;
use ledger_sheets::model::{DateRange, SourceRef};
use ledger_sheets::summary::summarize;
use ledger_sheets::{
    DetectorConfig, Ingestor, OperationRecord, TemplateCatalog, TemplateChoice, TemplateId,
};
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Records of a Rival sheet and a Microinvest sheet, in file order.
fn records() -> Vec<OperationRecord> {
    let catalog = TemplateCatalog::standard();
    let ingestor = Ingestor::new(&catalog, DetectorConfig::default());
    let microinvest = sheet(
        &MICROINVEST_HEADER,
        &[
            &["1", "01.02.2024", "501", "411", "0,10"],
            &["2", "02.02.2024", "501", "411", "0,20"],
            &["3", "29.02.2024", "503", "501", "1 000"],
        ],
    );

    let mut records = ingestor
        .ingest_sheet(&rival_sheet(), TemplateChoice::Detect, SourceRef::new("rival.xlsx"))
        .expect("rival ingested")
        .records;
    records.extend(
        ingestor
            .ingest_sheet(&microinvest, TemplateChoice::Detect, SourceRef::new("mi.xlsx"))
            .expect("microinvest ingested")
            .records,
    );
    records
}

#[test]
fn summary_counts_and_totals_every_record() {
    let records = records();
    let summary = summarize(&records, None);

    assert_eq!(summary.total_operations, 5);
    assert_eq!(summary.total_amount, Decimal::new(275_080, 2));
    assert_eq!(summary.total_amount.to_string(), "2750.80");
    assert_eq!(summary.by_template.get(&TemplateId::Rival), Some(&2));
    assert_eq!(summary.by_template.get(&TemplateId::Microinvest), Some(&3));
    assert_eq!(
        summary.by_template.values().sum::<usize>(),
        summary.total_operations
    );
}

#[test]
fn summary_does_not_depend_on_order() {
    let records = records();
    let expected = summarize(&records, None);

    let mut reversed = records.clone();
    reversed.reverse();
    assert_eq!(summarize(&reversed, None), expected);

    for shift in 1..records.len() {
        let mut rotated = records.clone();
        rotated.rotate_left(shift);
        assert_eq!(summarize(&rotated, None), expected, "rotation {shift}");
    }
}

#[test]
fn date_range_bounds_are_inclusive() {
    let records = records();

    let january = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 16)));
    let summary = summarize(&records, Some(january));
    assert_eq!(summary.total_operations, 2);
    assert_eq!(summary.total_amount, Decimal::new(175_050, 2));
    assert_eq!(summary.by_template.get(&TemplateId::Microinvest), None);

    let single_day = DateRange::new(Some(date(2024, 2, 29)), Some(date(2024, 2, 29)));
    let summary = summarize(&records, Some(single_day));
    assert_eq!(summary.total_operations, 1);
    assert_eq!(summary.total_amount, Decimal::new(100_000, 2));

    let from_february = DateRange::new(Some(date(2024, 2, 2)), None);
    assert_eq!(summarize(&records, Some(from_february)).total_operations, 2);

    let until_january = DateRange::new(None, Some(date(2024, 1, 31)));
    assert_eq!(summarize(&records, Some(until_january)).total_operations, 2);
}

#[test]
fn empty_input_summarizes_to_zero() {
    let summary = summarize(&[], None);
    assert_eq!(summary.total_operations, 0);
    assert!(summary.total_amount.is_zero());
    assert!(summary.by_template.is_empty());

    let records = records();
    let nothing = DateRange::new(Some(date(2030, 1, 1)), None);
    assert_eq!(summarize(&records, Some(nothing)).total_operations, 0);
}

fn record(amount: Decimal) -> OperationRecord {
    OperationRecord {
        source: SourceRef::new("large.xlsx"),
        operation_date: date(2024, 3, 1),
        document_type: None,
        document_number: None,
        debit_account: "501".into(),
        credit_account: "411".into(),
        amount,
        description: None,
        partner_name: None,
        analytical_debit: None,
        analytical_credit: None,
        account_name: None,
        template: TemplateId::Rival,
        raw: serde_json::Map::new(),
    }
}

#[test]
fn total_saturates_instead_of_overflowing() {
    let records = vec![record(Decimal::MAX), record(Decimal::MAX), record(Decimal::ONE)];

    let summary = summarize(&records, None);
    assert_eq!(summary.total_operations, 3);
    assert_eq!(summary.total_amount, Decimal::MAX);

    let mut reversed = records.clone();
    reversed.reverse();
    assert_eq!(summarize(&reversed, None), summary);
}
