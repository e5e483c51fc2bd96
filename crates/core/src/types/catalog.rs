//! Shoot package catalog and pricing.
//!
//! Two vehicle categories, four packages, one fixed base-price table. The
//! promotional first-booking price is a flat amount regardless of package,
//! except `delivery`, which is never offer-eligible (that rule lives in the
//! server's offer engine; the exclusion constant is here with the catalog).

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::Price;

/// The fixed first-booking promotional price.
pub const OFFER_PRICE: Price = Price::new(9);

/// Vehicle category a shoot is booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Bike,
    Car,
}

impl VehicleCategory {
    /// Stable wire/database name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Car => "car",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VehicleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bike" => Ok(Self::Bike),
            "car" => Ok(Self::Car),
            _ => Err(format!("unknown vehicle category: {s}")),
        }
    }
}

/// Shoot package offered for every vehicle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShootPackage {
    Cinematic,
    Rolling,
    Combo,
    Delivery,
}

impl ShootPackage {
    /// Stable wire/database name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cinematic => "cinematic",
            Self::Rolling => "rolling",
            Self::Combo => "combo",
            Self::Delivery => "delivery",
        }
    }

    /// Human-readable package title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Cinematic => "Cinematic Shots",
            Self::Rolling => "Rolling Shots",
            Self::Combo => "Combo (Cinematic + Rolling)",
            Self::Delivery => "New Vehicle Delivery",
        }
    }

    /// Listed base price for this package on the given vehicle category.
    #[must_use]
    pub const fn base_price(&self, vehicle: VehicleCategory) -> Price {
        let rupees = match vehicle {
            VehicleCategory::Bike => match self {
                Self::Cinematic => 499,
                Self::Rolling => 599,
                Self::Combo => 999,
                Self::Delivery => 759,
            },
            VehicleCategory::Car => match self {
                Self::Cinematic => 799,
                Self::Rolling => 899,
                Self::Combo => 1599,
                Self::Delivery => 1259,
            },
        };
        Price::new(rupees)
    }

    /// Whether the promotional price may ever apply to this package.
    #[must_use]
    pub const fn offer_eligible(&self) -> bool {
        !matches!(self, Self::Delivery)
    }
}

impl fmt::Display for ShootPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShootPackage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cinematic" => Ok(Self::Cinematic),
            "rolling" => Ok(Self::Rolling),
            "combo" => Ok(Self::Combo),
            "delivery" => Ok(Self::Delivery),
            _ => Err(format!("unknown shoot package: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL_VEHICLES: [VehicleCategory; 2] = [VehicleCategory::Bike, VehicleCategory::Car];
    const ALL_PACKAGES: [ShootPackage; 4] = [
        ShootPackage::Cinematic,
        ShootPackage::Rolling,
        ShootPackage::Combo,
        ShootPackage::Delivery,
    ];

    #[test]
    fn test_price_table() {
        assert_eq!(
            ShootPackage::Cinematic.base_price(VehicleCategory::Bike),
            Price::new(499)
        );
        assert_eq!(
            ShootPackage::Rolling.base_price(VehicleCategory::Car),
            Price::new(899)
        );
        assert_eq!(
            ShootPackage::Combo.base_price(VehicleCategory::Car),
            Price::new(1599)
        );
        assert_eq!(
            ShootPackage::Delivery.base_price(VehicleCategory::Bike),
            Price::new(759)
        );
    }

    #[test]
    fn test_offer_price_below_every_base_price() {
        for vehicle in ALL_VEHICLES {
            for package in ALL_PACKAGES {
                assert!(OFFER_PRICE <= package.base_price(vehicle));
            }
        }
    }

    #[test]
    fn test_delivery_never_offer_eligible() {
        assert!(!ShootPackage::Delivery.offer_eligible());
        assert!(ShootPackage::Cinematic.offer_eligible());
        assert!(ShootPackage::Rolling.offer_eligible());
        assert!(ShootPackage::Combo.offer_eligible());
    }

    #[test]
    fn test_wire_names_roundtrip() {
        for package in ALL_PACKAGES {
            assert_eq!(package.as_str().parse::<ShootPackage>().unwrap(), package);
        }
        for vehicle in ALL_VEHICLES {
            assert_eq!(
                vehicle.as_str().parse::<VehicleCategory>().unwrap(),
                vehicle
            );
        }
    }
}
