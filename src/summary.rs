use crate::model::{DateRange, OperationRecord, SummaryResult};
use crate::normalize::canonical_amount;

/// Count, amount total and per-template counts of `records`, restricted to
/// `range` when one is given. A single commutative fold, so the result does
/// not depend on input order. A total beyond the range of `Decimal`
/// saturates at `Decimal::MAX`.
pub fn summarize<'a, I>(records: I, range: Option<DateRange>) -> SummaryResult
where
    I: IntoIterator<Item = &'a OperationRecord>,
{
    let mut summary = records
        .into_iter()
        .filter(|record| range.is_none_or(|range| range.contains(record.operation_date)))
        .fold(SummaryResult::default(), |mut summary, record| {
            summary.total_operations += 1;
            summary.total_amount = summary.total_amount.saturating_add(record.amount);
            *summary.by_template.entry(record.template).or_insert(0) += 1;
            summary
        });
    summary.total_amount = canonical_amount(summary.total_amount);
    summary
}
