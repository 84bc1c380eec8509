use crate::error::{CoverageError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write dataset ids one per line
pub fn write_id_list<'a, I>(path: &Path, ids: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a String>,
{
    let file = File::create(path).map_err(|e| CoverageError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;
    for id in ids {
        writeln!(writer, "{}", id).map_err(|e| CoverageError::io(path, e))?;
        written += 1;
    }
    writer.flush().map_err(|e| CoverageError::io(path, e))?;
    info!("Wrote {} dataset ids to {}", written, path.display());
    Ok(written)
}
