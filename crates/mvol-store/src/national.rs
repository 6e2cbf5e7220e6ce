//! National benchmark file loader.

use crate::error::StoreResult;
use crate::fsio::read_if_exists;
use mvol_core::NationalSeries;
use std::path::Path;
use tracing::{debug, warn};

/// Load the three national sequences from `path`.
///
/// A missing file yields empty series; callers decide whether that is fatal.
/// An unparsable token is an error.
pub fn load_national(path: &Path) -> StoreResult<NationalSeries> {
    let Some(text) = read_if_exists(path)? else {
        warn!(path = %path.display(), "National benchmark file not found");
        return Ok(NationalSeries::default());
    };

    let national = NationalSeries::parse(&text)?;
    debug!(
        path = %path.display(),
        rent_growth = national.rent_growth.len(),
        vacancy = national.vacancy.len(),
        cap_rate = national.cap_rate.len(),
        "National benchmark loaded"
    );
    Ok(national)
}
