//! The permit fields the extractor knows about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A semantic field of a building permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermitField {
    ProjectAddress,
    ContractorName,
    ContractorLicense,
    Valuation,
    SquareFootage,
    OwnerName,
    ParcelNumber,
    ProjectDescription,
    PermitType,
}

impl PermitField {
    /// All fields, in extraction order.
    pub const ALL: [PermitField; 9] = [
        Self::ProjectAddress,
        Self::ContractorName,
        Self::ContractorLicense,
        Self::Valuation,
        Self::SquareFootage,
        Self::OwnerName,
        Self::ParcelNumber,
        Self::ProjectDescription,
        Self::PermitType,
    ];

    /// Snake-case field name, as used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectAddress => "project_address",
            Self::ContractorName => "contractor_name",
            Self::ContractorLicense => "contractor_license",
            Self::Valuation => "valuation",
            Self::SquareFootage => "square_footage",
            Self::OwnerName => "owner_name",
            Self::ParcelNumber => "parcel_number",
            Self::ProjectDescription => "project_description",
            Self::PermitType => "permit_type",
        }
    }
}

impl fmt::Display for PermitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermitField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown permit field: {}", s))
    }
}
