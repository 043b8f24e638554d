use rust_decimal::Decimal;

use crate::model::{
    IssueKind, NormalizedRow, NormalizedValue, OperationRecord, Role, SourceRef, TemplateId,
    ValidationIssue,
};

/// Roles every operation must carry.
pub const MANDATORY_ROLES: [Role; 4] = [
    Role::OperationDate,
    Role::DebitAccount,
    Role::CreditAccount,
    Role::Amount,
];

/// Assembles a canonical record from a normalized row.
///
/// Checks run in a fixed order and the first failure is the one reported:
/// mandatory roles present, then distinct debit/credit accounts, then a
/// non-negative amount, then a valid operation date.
pub fn build(
    row: NormalizedRow,
    template: TemplateId,
    source: &SourceRef,
) -> Result<OperationRecord, ValidationIssue> {
    let issue = |field: Role, kind: IssueKind| ValidationIssue::new(row.row, Some(field), kind);

    if let Some(missing) = MANDATORY_ROLES
        .iter()
        .find(|role| !row.fields.contains_key(*role))
    {
        return Err(issue(*missing, IssueKind::MissingField));
    }

    let (Some(debit), Some(credit)) = (row.text(Role::DebitAccount), row.text(Role::CreditAccount))
    else {
        return Err(issue(Role::DebitAccount, IssueKind::MissingField));
    };
    if debit.is_empty() {
        return Err(issue(Role::DebitAccount, IssueKind::MissingField));
    }
    if credit.is_empty() {
        return Err(issue(Role::CreditAccount, IssueKind::MissingField));
    }
    if debit == credit {
        let mut issue = issue(Role::CreditAccount, IssueKind::InvalidAccountPair);
        issue.value = Some(format!("{debit} / {credit}"));
        return Err(issue);
    }

    let amount = match row.amount(Role::Amount) {
        Some(amount) if amount >= Decimal::ZERO => amount,
        Some(amount) => {
            let mut issue = issue(Role::Amount, IssueKind::InvalidAmount);
            issue.value = Some(amount.to_string());
            return Err(issue);
        }
        None => return Err(issue(Role::Amount, IssueKind::UnparseableAmount)),
    };

    let Some(operation_date) = row.date(Role::OperationDate) else {
        return Err(issue(Role::OperationDate, IssueKind::UnparseableDate));
    };

    let debit_account = debit.to_string();
    let credit_account = credit.to_string();
    let NormalizedRow {
        mut fields,
        payload,
        ..
    } = row;
    let mut take = |role: Role| match fields.remove(&role) {
        Some(NormalizedValue::Text(value)) | Some(NormalizedValue::Account(value)) => Some(value),
        Some(NormalizedValue::Date(value)) => Some(value.format("%d.%m.%Y").to_string()),
        Some(NormalizedValue::Amount(value)) => Some(value.to_string()),
        None => None,
    };

    Ok(OperationRecord {
        source: source.clone(),
        operation_date,
        document_type: take(Role::DocumentType),
        document_number: take(Role::DocumentNumber),
        debit_account,
        credit_account,
        amount,
        description: take(Role::Description),
        partner_name: take(Role::PartnerName),
        analytical_debit: take(Role::AnalyticalDebit),
        analytical_credit: take(Role::AnalyticalCredit),
        account_name: take(Role::AccountName),
        template,
        raw: payload,
    })
}
