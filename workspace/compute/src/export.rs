//! Serialization of ad-hoc query results into downloadable files.

use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ComputeError, Result};

/// Largest integer a double (and therefore a spreadsheet cell) represents exactly.
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Sheet that holds the result set in XLSX exports.
pub const SHEET_NAME: &str = "Results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "export.csv",
            ExportFormat::Excel => "export.xlsx",
        }
    }

    /// Renders the rows, which must be JSON objects, into the file body.
    pub fn render(&self, rows: &[Value]) -> Result<Vec<u8>> {
        let table = Table::from_rows(rows)?;
        debug!(
            format = ?self,
            columns = table.columns.len(),
            rows = table.rows.len(),
            "Rendering export"
        );
        match self {
            ExportFormat::Csv => table.to_csv(),
            ExportFormat::Excel => table.to_xlsx(),
        }
    }
}

/// Result set flattened into a header and positional cells.
#[derive(Debug)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    fn from_rows(rows: &[Value]) -> Result<Self> {
        let objects = rows
            .iter()
            .map(|row| match row {
                Value::Object(map) => Ok(map),
                other => Err(ComputeError::Export(format!(
                    "expected a row object, got {}",
                    other
                ))),
            })
            .collect::<Result<Vec<&Map<String, Value>>>>()?;

        // Columns in first-seen order; rows from loosely typed sources may differ in shape
        let mut columns: Vec<String> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = objects
            .iter()
            .map(|object| {
                columns
                    .iter()
                    .map(|column| widen_integer(object.get(column).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(csv_cell))?;
        }
        writer
            .into_inner()
            .map_err(|e| ComputeError::Export(format!("CSV: {}", e.error())))
    }

    fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, name) in self.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, column_index(col)?, name, &header_format)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let row_num = u32::try_from(index + 1)
                .map_err(|_| ComputeError::Export("too many rows for a worksheet".to_string()))?;
            for (col, value) in row.iter().enumerate() {
                let col = column_index(col)?;
                match value {
                    Value::Null => {}
                    Value::Bool(b) => {
                        worksheet.write_boolean(row_num, col, *b)?;
                    }
                    Value::Number(n) => match n.as_f64() {
                        Some(f) => {
                            worksheet.write_number(row_num, col, f)?;
                        }
                        None => {
                            worksheet.write_string(row_num, col, n.to_string())?;
                        }
                    },
                    Value::String(s) => {
                        worksheet.write_string(row_num, col, s.as_str())?;
                    }
                    nested => {
                        worksheet.write_string(row_num, col, nested.to_string())?;
                    }
                }
            }
        }

        worksheet.autofit();
        Ok(workbook.save_to_buffer()?)
    }
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| ComputeError::Export("too many columns for a worksheet".to_string()))
}

/// Integers beyond the exactly representable float range are exported as text.
fn widen_integer(value: Value) -> Value {
    let too_large = match &value {
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.unsigned_abs() > MAX_SAFE_INTEGER,
            (None, Some(u)) => u > MAX_SAFE_INTEGER,
            _ => false,
        },
        _ => false,
    };
    if too_large { Value::String(value.to_string()) } else { value }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_has_header_and_rows() {
        let rows = vec![
            json!({"invoice_number": "INV-1", "invoice_total": 119.5, "note": null}),
            json!({"invoice_number": "INV-2", "invoice_total": 20, "note": "a, b"}),
        ];
        let body = ExportFormat::Csv.render(&rows).unwrap();
        let text = String::from_utf8(body).unwrap();
        assert_eq!(
            text,
            "invoice_number,invoice_total,note\nINV-1,119.5,\nINV-2,20,\"a, b\"\n"
        );
    }

    #[test]
    fn test_large_integers_become_strings() {
        assert_eq!(widen_integer(json!(42)), json!(42));
        assert_eq!(widen_integer(json!(9_007_199_254_740_993_i64)), json!("9007199254740993"));
        assert_eq!(widen_integer(json!(-9_007_199_254_740_993_i64)), json!("-9007199254740993"));
        assert_eq!(widen_integer(json!(u64::MAX)), json!(u64::MAX.to_string()));
        assert_eq!(widen_integer(json!(1.5)), json!(1.5));
    }

    #[test]
    fn test_rows_with_different_columns() {
        let rows = vec![json!({"a": 1}), json!({"b": 2})];
        let text = String::from_utf8(ExportFormat::Csv.render(&rows).unwrap()).unwrap();
        assert_eq!(text, "a,b\n1,\n,2\n");
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let rows = vec![json!({"vendor": "ACME", "total": 10.25, "paid": true})];
        let body = ExportFormat::Excel.render(&rows).unwrap();
        assert!(body.starts_with(b"PK"));
    }

    #[test]
    fn test_non_object_rows_are_rejected() {
        let rows = vec![json!([1, 2, 3])];
        assert!(matches!(
            ExportFormat::Csv.render(&rows),
            Err(ComputeError::Export(_))
        ));
    }

    #[test]
    fn test_metadata() {
        assert_eq!(ExportFormat::Csv.file_name(), "export.csv");
        assert_eq!(ExportFormat::Excel.file_name(), "export.xlsx");
        assert!(ExportFormat::Excel.content_type().contains("spreadsheetml"));
    }
}
