//! Shared domain enumerations aligned with persisted database enums.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "gallery_category", rename_all = "snake_case")]
pub enum GalleryCategory {
    Residential,
    Commercial,
    Renovation,
}

impl GalleryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Renovation => "renovation",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
            Self::Renovation => "Renovation",
        }
    }

    pub fn all() -> &'static [GalleryCategory] {
        &[Self::Residential, Self::Commercial, Self::Renovation]
    }
}

impl Display for GalleryCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GalleryCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residential" => Ok(Self::Residential),
            "commercial" => Ok(Self::Commercial),
            "renovation" => Ok(Self::Renovation),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "realty_category", rename_all = "snake_case")]
pub enum RealtyCategory {
    Residential,
    Commercial,
}

impl RealtyCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
        }
    }

    pub fn all() -> &'static [RealtyCategory] {
        &[Self::Residential, Self::Commercial]
    }
}

impl Display for RealtyCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RealtyCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residential" => Ok(Self::Residential),
            "commercial" => Ok(Self::Commercial),
            _ => Err(()),
        }
    }
}

/// Whether a realty listing is offered for sale or for lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "listing_kind", rename_all = "snake_case")]
pub enum ListingKind {
    Sale,
    Lease,
}

impl ListingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Lease => "lease",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sale => "For Sale",
            Self::Lease => "For Lease",
        }
    }

    pub fn all() -> &'static [ListingKind] {
        &[Self::Sale, Self::Lease]
    }
}

impl Display for ListingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "lease" => Ok(Self::Lease),
            _ => Err(()),
        }
    }
}

/// Whether a price is a one-off amount or a monthly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "price_period", rename_all = "snake_case")]
pub enum PricePeriod {
    Total,
    PerMonth,
}

impl PricePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::PerMonth => "per_month",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Total => "One-off",
            Self::PerMonth => "Monthly",
        }
    }
}

impl FromStr for PricePeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(Self::Total),
            "per_month" => Ok(Self::PerMonth),
            _ => Err(()),
        }
    }
}

/// Account role stored alongside credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "account_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Moderator => "Moderator",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminates the two managed post aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Gallery,
    Realty,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Realty => "realty",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gallery => "Gallery",
            Self::Realty => "Realty",
        }
    }
}

impl FromStr for PostKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gallery" => Ok(Self::Gallery),
            "realty" => Ok(Self::Realty),
            _ => Err(()),
        }
    }
}

/// Formats an integer cent amount for display, e.g. `$850,000` or `$12,000/mo`.
pub fn format_price(cents: i64, period: PricePeriod) -> String {
    let dollars = cents / 100;
    let remainder = (cents % 100).unsigned_abs();

    let mut grouped = String::new();
    let digits = dollars.unsigned_abs().to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if dollars < 0 { "-" } else { "" };
    let mut out = if remainder == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{remainder:02}")
    };

    if period == PricePeriod::PerMonth {
        out.push_str("/mo");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_category_round_trips_slugs() {
        for category in GalleryCategory::all() {
            assert_eq!(category.as_str().parse(), Ok(*category));
        }
        assert!("garage".parse::<GalleryCategory>().is_err());
    }

    #[test]
    fn listing_kind_round_trips_slugs() {
        for kind in ListingKind::all() {
            assert_eq!(kind.as_str().parse(), Ok(*kind));
        }
    }

    #[test]
    fn price_formatting_groups_thousands() {
        assert_eq!(format_price(85_000_000, PricePeriod::Total), "$850,000");
        assert_eq!(format_price(1_200_000, PricePeriod::PerMonth), "$12,000/mo");
        assert_eq!(format_price(99_950, PricePeriod::Total), "$999.50");
        assert_eq!(format_price(0, PricePeriod::Total), "$0");
    }
}
