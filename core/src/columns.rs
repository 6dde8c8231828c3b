//! Column names the pipeline refers to by name.
//!
//! These MUST match the training data's headers exactly (Ames housing
//! naming, including the leading digits on the floor-area columns).

pub const GR_LIV_AREA: &str = "GrLivArea";
pub const OVERALL_QUAL: &str = "OverallQual";
pub const NEIGHBORHOOD: &str = "Neighborhood";

pub const TOTAL_BSMT_SF: &str = "TotalBsmtSF";
pub const BSMT_FIN_SF1: &str = "BsmtFinSF1";
pub const FIRST_FLR_SF: &str = "1stFlrSF";
pub const SECOND_FLR_SF: &str = "2ndFlrSF";

pub const YEAR_BUILT: &str = "YearBuilt";
pub const YR_SOLD: &str = "YrSold";

pub const FULL_BATH: &str = "FullBath";
pub const HALF_BATH: &str = "HalfBath";
pub const BSMT_FULL_BATH: &str = "BsmtFullBath";
pub const BSMT_HALF_BATH: &str = "BsmtHalfBath";

// Engineered columns.
pub const TOTAL_HOUSE_SQFT: &str = "TotalHouseSqFt";
pub const HOUSE_AGE: &str = "HouseAge";
pub const TOTAL_BATH: &str = "TotalBath";
pub const LAT: &str = "Lat";
pub const LON: &str = "Lon";
