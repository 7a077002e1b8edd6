//! CSV export of difference lists.
//!
//! Output starts with a UTF-8 byte-order mark, uses CRLF line endings and
//! quotes every field, doubling embedded quotes.

use std::io::Write;

use crate::diff::DiffRecord;
use crate::error::Result;

const BOM: &str = "\u{feff}";
const HEADER: [&str; 4] = ["Path", "Status", "Left Value", "Right Value"];

/// Writes `records` as CSV with the columns Path, Status, Left Value and
/// Right Value. Missing values are written as empty fields.
pub fn write_csv<'a, W, I>(writer: &mut W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a DiffRecord>,
{
    writer.write_all(BOM.as_bytes())?;
    write_row(writer, HEADER)?;
    for record in records {
        write_row(
            writer,
            [
                record.key.as_str(),
                record.status().as_str(),
                record.left_value().unwrap_or(""),
                record.right_value().unwrap_or(""),
            ],
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders `records` as a CSV string.
pub fn to_csv_string<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a DiffRecord>,
{
    let mut output = Vec::new();
    write_csv(&mut output, records)?;
    // Every field written above is valid UTF-8
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn write_row<W: Write>(writer: &mut W, fields: [&str; 4]) -> Result<()> {
    let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    write!(writer, "{}\r\n", row.join(","))?;
    Ok(())
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
