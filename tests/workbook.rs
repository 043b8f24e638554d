use std::path::Path;

use chrono::NaiveDate;
use ledger_sheets::io::excel_read;
use ledger_sheets::model::Cell;
use ledger_sheets::{
    DetectorConfig, IngestError, Ingestor, TemplateCatalog, TemplateChoice, TemplateId,
};
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tempfile::tempdir;

const HEADER: [&str; 8] = [
    "Контиране",
    "Дата",
    "Дебит сметка",
    "Кредит сметка",
    "Сума",
    "Документ №",
    "Партньор",
    "Основание",
];

/// A Microinvest export starting at B2 under a title line, with typed date
/// and number cells.
fn write_export(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd.mm.yyyy");
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Контировки")?;

    worksheet.write_string(1, 1, "Контировки за февруари 2024")?;
    for (column, label) in HEADER.iter().enumerate() {
        worksheet.write_string(3, 1 + column as u16, *label)?;
    }

    worksheet.write_number(4, 1, 1)?;
    worksheet.write_number_with_format(4, 2, 45323, &date_format)?;
    worksheet.write_number(4, 3, 602)?;
    worksheet.write_string(4, 4, "401")?;
    worksheet.write_number(4, 5, 1250.5)?;
    worksheet.write_string(4, 6, "0000000042")?;
    worksheet.write_string(4, 7, "Софтуер ООД")?;
    worksheet.write_string(4, 8, "Абонамент")?;

    worksheet.write_number(5, 1, 2)?;
    worksheet.write_string(5, 2, "02.02.2024")?;
    worksheet.write_string(5, 3, "501 Каса")?;
    worksheet.write_number(5, 4, 411)?;
    worksheet.write_string(5, 5, "-15,00")?;

    worksheet.write_string(7, 1, "Общо")?;
    worksheet.write_number(7, 5, 1235.5)?;

    workbook.save(path)
}

#[test]
fn worksheet_keeps_sheet_coordinates() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("export.xlsx");
    write_export(&path).expect("workbook written");

    let sheet = excel_read::read_worksheet(&path, None).expect("workbook read");
    assert_eq!(sheet.name, "Контировки");
    assert_eq!(sheet.row(3).and_then(|row| row.first()), Some(&Cell::Empty));
    assert_eq!(sheet.row_text(3)[1], "Контиране");
    assert_eq!(
        sheet.row(4).and_then(|row| row.get(3)),
        Some(&Cell::Number(602.0))
    );

    let named = excel_read::read_worksheet(&path, Some("Контировки")).expect("named sheet");
    assert_eq!(named, sheet);
}

#[test]
fn xlsx_export_is_ingested_end_to_end() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("export.xlsx");
    write_export(&path).expect("workbook written");

    let catalog = TemplateCatalog::standard();
    let ingestor = Ingestor::new(&catalog, DetectorConfig::default());
    let outcome = ingestor
        .ingest_file(&path, TemplateChoice::Detect, None)
        .expect("file ingested");

    assert_eq!(outcome.template, TemplateId::Microinvest);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.issues.len(), 1);

    let record = &outcome.records[0];
    assert_eq!(
        record.operation_date,
        NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date")
    );
    assert_eq!(record.debit_account, "602");
    assert_eq!(record.credit_account, "401");
    assert_eq!(record.amount, Decimal::new(125_050, 2));
    assert_eq!(record.document_number.as_deref(), Some("0000000042"));
    assert_eq!(record.partner_name.as_deref(), Some("Софтуер ООД"));
    assert_eq!(record.source.0, path.display().to_string());
    assert_eq!(
        record.raw.get("Дата").and_then(|value| value.as_str()),
        Some("2024-02-01")
    );

    let issue = &outcome.issues[0];
    assert_eq!(issue.row, 6);
    assert_eq!(issue.value.as_deref(), Some("-15,00"));
}

#[test]
fn unknown_sheet_and_missing_file_are_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("export.xlsx");
    write_export(&path).expect("workbook written");

    let error = excel_read::read_worksheet(&path, Some("Няма такъв"))
        .expect_err("sheet does not exist");
    assert!(matches!(error, IngestError::InvalidWorkbook(_)));

    let catalog = TemplateCatalog::standard();
    let ingestor = Ingestor::new(&catalog, DetectorConfig::default());
    let missing = temp_dir.path().join("missing.xlsx");
    let error = ingestor
        .ingest_file(&missing, TemplateChoice::Detect, None)
        .expect_err("file does not exist");
    assert!(matches!(error, IngestError::MissingInput(path) if path == missing));
}
