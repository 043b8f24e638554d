use chrono::NaiveDate;
use ledger_sheets::FieldError;
use ledger_sheets::model::{Cell, NormalizedValue, Role};
use ledger_sheets::normalize::{
    fuse_account, normalize, normalize_account, normalize_amount, normalize_date, normalize_text,
};
use rust_decimal::Decimal;

fn text(value: &str) -> Cell {
    Cell::text(value)
}

fn amount(value: &str, signed: bool) -> Option<Decimal> {
    normalize_amount(&text(value), signed).expect("amount parses")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn locale_spellings_of_one_amount_agree() {
    let expected = Some(Decimal::new(150_000, 2));

    for spelling in [
        "1500",
        "1500.00",
        "1 500,00",
        "1.500,00",
        "1,500.00",
        "1'500.00",
        "1\u{a0}500,00",
        "1 500 лв.",
        "BGN 1500",
        "+1500",
    ] {
        assert_eq!(amount(spelling, false), expected, "spelling {spelling:?}");
    }
    assert_eq!(
        normalize_amount(&Cell::Number(1500.0), false).expect("number"),
        expected
    );
}

#[test]
fn amounts_are_pinned_to_two_decimals() {
    let value = amount("250.5", false).expect("present");
    assert_eq!(value.to_string(), "250.50");
    assert_eq!(value.scale(), 2);

    assert_eq!(amount("12,345", false), Some(Decimal::new(1235, 2)));
    assert_eq!(amount("0,005", false), Some(Decimal::new(1, 2)));
    assert_eq!(amount("1.234.567", false), Some(Decimal::new(123_456_700, 2)));
    assert_eq!(amount(",5", false), Some(Decimal::new(50, 2)));
}

#[test]
fn normalizing_a_normalized_amount_changes_nothing() {
    for spelling in ["1 500,00", "0,1", "99999.999", "(1 234,50)"] {
        let once = amount(spelling, true).expect("present");
        let twice = amount(&once.to_string(), true).expect("present");
        assert_eq!(once, twice);
        assert_eq!(once.to_string(), twice.to_string());
    }
}

#[test]
fn negative_amounts_need_a_signed_template() {
    for spelling in ["-100,00", "(100,00)", "100,00-", "\u{2212}100.00"] {
        assert_eq!(
            amount(spelling, true),
            Some(Decimal::new(-10_000, 2)),
            "spelling {spelling:?}"
        );
        assert_eq!(
            normalize_amount(&text(spelling), false),
            Err(FieldError::InvalidAmount(spelling.to_string()))
        );
    }
}

#[test]
fn negative_zero_is_plain_zero() {
    let zero = amount("-0,00", false).expect("present");
    assert!(zero.is_zero());
    assert!(!zero.is_sign_negative());
}

#[test]
fn garbage_amounts_are_rejected() {
    for spelling in ["abc", "12a", "1.234,5,6", "-", "1,2.3.4"] {
        assert!(
            matches!(
                normalize_amount(&text(spelling), true),
                Err(FieldError::UnparseableAmount(_))
            ),
            "spelling {spelling:?}"
        );
    }
    assert_eq!(normalize_amount(&Cell::Empty, false), Ok(None));
    assert_eq!(normalize_amount(&text("   "), false), Ok(None));
}

#[test]
fn dates_from_serials_and_text() {
    let expected = Ok(Some(date(2024, 1, 15)));

    assert_eq!(normalize_date(&Cell::DateTime(45306.0)), expected);
    assert_eq!(normalize_date(&Cell::DateTime(45306.75)), expected);
    assert_eq!(normalize_date(&Cell::Number(45306.0)), expected);
    for spelling in [
        "15.01.2024",
        "15.01.2024 г.",
        "15.01.2024г",
        "15/01/2024",
        "15-01-2024",
        "2024-01-15",
        "2024-01-15T00:00:00",
        "15.01.2024 10:30",
        "15.01.24",
        "45306",
        " 15.1.2024 ",
    ] {
        assert_eq!(normalize_date(&text(spelling)), expected, "spelling {spelling:?}");
    }
}

#[test]
fn impossible_dates_are_rejected() {
    for spelling in ["31.02.2024", "2024-13-01", "вчера", "0"] {
        assert_eq!(
            normalize_date(&text(spelling)),
            Err(FieldError::UnparseableDate(spelling.to_string())),
            "spelling {spelling:?}"
        );
    }
    assert!(normalize_date(&Cell::Number(-3.0)).is_err());
    assert!(normalize_date(&Cell::Bool(true)).is_err());
    assert_eq!(normalize_date(&Cell::Empty), Ok(None));
}

#[test]
fn account_codes_drop_names_and_unify_separators() {
    let cases = [
        ("501 Каса", "501"),
        ("411 - 1", "411/1"),
        ("411-1", "411/1"),
        ("503.1", "503/1"),
        ("602/3 Услуги", "602/3"),
        ("  401  ", "401"),
        ("Каса", "Каса"),
        ("A-12.3", "A/12/3"),
        ("A-12.3 Каса", "A/12/3"),
        ("Клиент 5", "Клиент 5"),
    ];
    for (raw, expected) in cases {
        assert_eq!(
            normalize_account(&text(raw)).as_deref(),
            Some(expected),
            "raw {raw:?}"
        );
    }
    assert_eq!(normalize_account(&Cell::Number(602.0)).as_deref(), Some("602"));
    assert_eq!(normalize_account(&Cell::Empty), None);
}

#[test]
fn fused_account_prefers_the_number() {
    assert_eq!(
        fuse_account(&text("503"), &text("504 Банка")).as_deref(),
        Some("503")
    );
    assert_eq!(
        fuse_account(&Cell::Empty, &text("504 Разплащателна сметка")).as_deref(),
        Some("504")
    );
    assert_eq!(fuse_account(&Cell::Empty, &Cell::Empty), None);
}

#[test]
fn free_text_is_unescaped_and_collapsed() {
    assert_eq!(
        normalize_text(&text("  Плащане   по\nфактура_x000D_ ")).as_deref(),
        Some("Плащане по фактура")
    );
    assert_eq!(
        normalize_text(&text("Иванов &amp; син")).as_deref(),
        Some("Иванов & син")
    );
    assert_eq!(normalize_text(&text(" \t ")), None);
    assert_eq!(normalize_text(&Cell::Number(12.0)).as_deref(), Some("12"));
}

#[test]
fn normalize_dispatches_on_role_kind() {
    assert_eq!(
        normalize(&text("15.01.2024"), Role::OperationDate, false),
        Ok(Some(NormalizedValue::Date(date(2024, 1, 15))))
    );
    assert_eq!(
        normalize(&text("1 200"), Role::Amount, false),
        Ok(Some(NormalizedValue::Amount(Decimal::new(120_000, 2))))
    );
    assert_eq!(
        normalize(&text("501 Каса"), Role::DebitAccount, false),
        Ok(Some(NormalizedValue::Account("501".into())))
    );
    assert_eq!(
        normalize(&text("0000000123"), Role::DocumentNumber, false),
        Ok(Some(NormalizedValue::Text("0000000123".into())))
    );
    assert_eq!(normalize(&Cell::Empty, Role::Description, false), Ok(None));
}
