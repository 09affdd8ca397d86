use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Property;

/// Write listings as CSV under the same headers the loader reads.
pub fn write_listings<W: Write>(writer: W, listings: &[Property]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for listing in listings {
        wtr.serialize(listing).context("serializing listing")?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

pub fn export_csv(path: &Path, listings: &[Property]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_listings(file, listings)?;
    log::info!("Exported {} listings to {}", listings.len(), path.display());
    Ok(())
}
