use csv::{Terminator, WriterBuilder};

use crate::error::{AppError, AppResult};
use crate::models::CsvRow;

/// Serialize rows as headerless `owner,value` lines, each ending in `\n`.
/// Values use six fractional digits.
pub fn write_rows(rows: &[CsvRow]) -> AppResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        let value = format!("{:.6}", row.value);
        writer.write_record([row.owner.as_str(), value.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Csv(e.into_error().into()))
}
