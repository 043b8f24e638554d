#![allow(dead_code)]

use ledger_sheets::Worksheet;

pub const RIVAL_HEADER: [&str; 8] = [
    "Вид документ",
    "Номер документ",
    "Дата документ",
    "Име",
    "Сметка дебит",
    "Сметка кредит",
    "Стойност",
    "Обяснение на статия",
];

pub const AJUR_HEADER: [&str; 13] = [
    "№",
    "Дата рег.",
    "Вид док.",
    "Документ No / Дата",
    "Рег. No",
    "Дт с/ка",
    "Аналитична сметка",
    "Кт с/ка",
    "Аналитична сметка",
    "Количество",
    "Мярка",
    "Сума",
    "Обяснителен текст",
];

pub const MICROINVEST_HEADER: [&str; 12] = [
    "Контиране",
    "Дата",
    "Дебит сметка",
    "Кредит сметка",
    "Сума",
    "Док. вид",
    "Док. дата",
    "Документ №",
    "Партньор",
    "ЕИК/ДДС номер",
    "Основание",
    "Забележка",
];

pub const BUSINESS_NAVIGATOR_HEADER: [&str; 11] = [
    "Документ: тип",
    "Документ: номер",
    "Документ: дата",
    "Счетоводен текст",
    "Номер на сметка",
    "Име на сметка",
    "Номер на кор.сметка",
    "Име на кор.сметка",
    "Сума дебит",
    "Сума кредит",
    "Име на дилър",
];

pub const UNIVERSUM_HEADER: [&str; 16] = [
    "№",
    "Период",
    "Дата на операция",
    "Дневник",
    "Вид на документ",
    "Номер на документ",
    "Дата на документ",
    "Валута",
    "Дебитна сметка",
    "Кредитна сметка",
    "Сума",
    "Съдържание на операцията",
    "Аналитичност дебит",
    "Аналитичност кредит",
    "Потребител",
    "Контрагент",
];

/// Header row followed by the given data rows.
pub fn sheet(header: &[&str], rows: &[&[&str]]) -> Worksheet {
    let mut all: Vec<Vec<&str>> = vec![header.to_vec()];
    all.extend(rows.iter().map(|row| row.to_vec()));
    Worksheet::from_text_rows("Sheet1", all)
}

/// A Rival export with its title block, three postings and a totals row.
/// The third posting carries a negative amount.
pub fn rival_sheet() -> Worksheet {
    let rows: Vec<Vec<&str>> = vec![
        vec!["ХРОНОЛОГИЧЕН ОПИС"],
        vec!["Период: 01.01.2024 - 31.01.2024"],
        vec![],
        RIVAL_HEADER.to_vec(),
        vec![
            "ФК",
            "0000000123",
            "15.01.2024",
            "Доставчик ООД",
            "602",
            "401",
            "1 500,00",
            "Счетоводни услуги",
        ],
        vec!["ПКО", "45", "16.01.2024", "", "501", "411", "250.5", "Плащане"],
        vec![
            "ФК",
            "124",
            "17.01.2024",
            "Доставчик ООД",
            "602",
            "401",
            "-100,00",
            "Сторно",
        ],
        vec!["Общо", "", "", "", "", "", "1 650,50", ""],
    ];
    Worksheet::from_text_rows("Sheet1", rows)
}
