//! Leaf records describing a single NWM output file.

use std::fmt;

use serde::Serialize;

use crate::attributes::{extract_attributes, FileAttributes};
use crate::error::AttributeError;
use crate::loader::FileListing;

/// A file that may be retrieved from an NWM data set structured like NOMADS.
///
/// Built once from its name and address and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    /// Name of the file, unique within its configuration
    pub name: String,
    /// Where the file is located (path or URL)
    pub address: String,
    /// Hour of the day (zulu) when the forecast begins
    pub reference: u32,
    /// Configuration named in the file, e.g. `short_range`
    pub configuration: String,
    /// Output category, e.g. `channel_rt`, `land`, `reservoir`
    pub model_type: String,
    /// Forecast step within the run
    pub step: Option<u64>,
    /// Spatial domain, e.g. `conus`, `hawaii`
    pub area: String,
    /// Ensemble member, if the run was part of an ensemble
    pub member: Option<u64>,
}

impl File {
    /// Build a file record from already extracted attributes.
    pub fn new(name: impl Into<String>, address: impl Into<String>, attributes: FileAttributes) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            reference: attributes.reference,
            configuration: attributes.configuration,
            model_type: attributes.model_type,
            step: attributes.step,
            area: attributes.area,
            member: attributes.member,
        }
    }

    /// Parse a file name and attach its address.
    pub fn parse(name: impl Into<String>, address: impl Into<String>) -> Result<Self, AttributeError> {
        let name = name.into();
        let attributes = extract_attributes(&name)?;
        Ok(Self::new(name, address, attributes))
    }
}

impl TryFrom<FileListing> for File {
    type Error = AttributeError;

    fn try_from(listing: FileListing) -> Result<Self, Self::Error> {
        File::parse(listing.name, listing.address)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file() {
        let file = File::parse(
            "nwm.t18z.medium_range.land_2.f006.conus.nc",
            "/data/nwm.20200821/medium_range_mem2/nwm.t18z.medium_range.land_2.f006.conus.nc",
        )
        .unwrap();

        assert_eq!(file.reference, 18);
        assert_eq!(file.model_type, "land");
        assert_eq!(file.member, Some(2));
        assert_eq!(file.step, Some(6));
        assert!(file.to_string().starts_with("nwm.t18z.medium_range.land_2.f006.conus.nc (/data/"));
    }

    #[test]
    fn test_from_listing_rejects_short_names() {
        let listing = FileListing {
            name: "broken.nc".to_string(),
            address: "/data/broken.nc".to_string(),
        };
        assert!(File::try_from(listing).is_err());
    }
}
