use std::path::Path;

use calamine::{DataType, Reader, Sheets, open_workbook_auto};

use crate::error::{IngestError, Result};
use crate::model::{Cell, Worksheet};

/// Reads one worksheet of a spreadsheet file (`.xlsx`, `.xlsm`, `.xls`,
/// `.ods`) into a [`Worksheet`]. Without a sheet name the first sheet of the
/// workbook is used.
pub fn read_worksheet(path: &Path, sheet: Option<&str>) -> Result<Worksheet> {
    let mut workbook = open_workbook_auto(path)?;

    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestError::InvalidWorkbook("workbook has no worksheets".into()))?,
    };

    let range = read_required_sheet(&mut workbook, &name)?;
    Ok(range_to_worksheet(name, &range))
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Sheets<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| IngestError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(IngestError::from)?;
    Ok(range)
}

/// Calamine ranges start at the first used cell; pad them back so row and
/// column indices match the sheet.
fn range_to_worksheet(name: String, range: &calamine::Range<DataType>) -> Worksheet {
    let (start_row, start_col) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(start_row + range.height());
    rows.resize_with(start_row, Vec::new);

    for source in range.rows() {
        let mut cells = Vec::with_capacity(start_col + source.len());
        cells.resize(start_col, Cell::Empty);
        cells.extend(source.iter().map(convert_cell));
        rows.push(cells);
    }

    Worksheet::new(name, rows)
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(serial) => Cell::DateTime(*serial),
        other => Cell::Text(other.to_string()),
    }
}
