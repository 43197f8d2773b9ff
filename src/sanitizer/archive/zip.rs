use std::path::Path;

use crate::error::SanitizeResult;
use crate::sanitizer::package::{EntryTimestamps, rewrite_zip};

/// Copia cada entrada con la fecha de modificación puesta en la época ZIP.
pub(crate) fn strip_zip_metadata(source: &Path, temp: &Path) -> SanitizeResult<()> {
    rewrite_zip(
        source,
        temp,
        "ZIP",
        EntryTimestamps::ResetToEpoch,
        |_, contents| Ok((contents, false)),
    )?;
    Ok(())
}
