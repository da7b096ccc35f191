//! Building catalog: static per-kind, per-level economics.
//!
//! The catalog is the single source for costs and effects. Nothing else caches
//! these numbers, so a data edit here reaches every caller.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{SimError, SimResult};

/// Catalog key of the road kind.
pub const ROAD: &str = "road";

/// Longest allowed upgrade chain.
pub const MAX_LEVELS: usize = 3;

/// Broad building category. Drives which aggregates a building feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingCategory {
    /// Housing.
    Residential,
    /// Shops and offices.
    Commercial,
    /// Factories and plants.
    Industrial,
    /// Roads.
    Infrastructure,
    /// Utilities and green energy.
    Environment,
    /// Parks and monuments.
    Social,
    /// Hospitals, police, fire.
    Governance,
}

impl BuildingCategory {
    /// Whether connected buildings of this category earn daily income.
    #[must_use]
    pub const fn earns_income(self) -> bool {
        matches!(self, Self::Commercial | Self::Industrial)
    }

    /// Whether connected buildings of this category house residents.
    #[must_use]
    pub const fn houses_residents(self) -> bool {
        matches!(self, Self::Residential)
    }

    /// Lowercase name as used in data files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Infrastructure => "infrastructure",
            Self::Environment => "environment",
            Self::Social => "social",
            Self::Governance => "governance",
        }
    }
}

/// Economics of one building level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSpec {
    /// Level number, starting at 1.
    pub level: u8,
    /// Price of building at this level (used for demolition refunds).
    pub cost: u64,
    /// Price of upgrading away from this level.
    #[serde(default)]
    pub upgrade_cost: Option<u64>,
    /// Level reached by upgrading, `None` at the end of the chain.
    #[serde(default)]
    pub next_level: Option<u8>,
    /// Residents housed (residential only).
    #[serde(default)]
    pub max_population: u32,
    /// Jobs provided (non-residential).
    #[serde(default)]
    pub jobs: u32,
    /// Power drawn while connected.
    #[serde(default)]
    pub power_usage: u32,
    /// Power generated while connected.
    #[serde(default)]
    pub power_output: u32,
    /// Pollution emitted, negative values clean the air.
    #[serde(default)]
    pub pollution: i32,
    /// Credits earned per day while connected.
    #[serde(default)]
    pub coin_output: u64,
    /// Whether the level is offered in the build menu.
    #[serde(default)]
    pub visible: bool,
}

impl LevelSpec {
    /// A level with the given cost and no effects.
    #[must_use]
    pub const fn new(level: u8, cost: u64) -> Self {
        Self {
            level,
            cost,
            upgrade_cost: None,
            next_level: None,
            max_population: 0,
            jobs: 0,
            power_usage: 0,
            power_output: 0,
            pollution: 0,
            coin_output: 0,
            visible: false,
        }
    }

    /// Set housing capacity.
    #[must_use]
    pub const fn housing(mut self, residents: u32) -> Self {
        self.max_population = residents;
        self
    }

    /// Set job capacity.
    #[must_use]
    pub const fn jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set power draw.
    #[must_use]
    pub const fn uses_power(mut self, usage: u32) -> Self {
        self.power_usage = usage;
        self
    }

    /// Set power generation.
    #[must_use]
    pub const fn generates_power(mut self, output: u32) -> Self {
        self.power_output = output;
        self
    }

    /// Set pollution.
    #[must_use]
    pub const fn pollutes(mut self, pollution: i32) -> Self {
        self.pollution = pollution;
        self
    }

    /// Set daily income.
    #[must_use]
    pub const fn earns(mut self, coins: u64) -> Self {
        self.coin_output = coins;
        self
    }

    /// Link to the next level at the given upgrade price.
    #[must_use]
    pub const fn upgrades_to(mut self, next_level: u8, upgrade_cost: u64) -> Self {
        self.next_level = Some(next_level);
        self.upgrade_cost = Some(upgrade_cost);
        self
    }

    /// Record an upgrade price without a next level.
    #[must_use]
    pub const fn upgrade_cost(mut self, upgrade_cost: u64) -> Self {
        self.upgrade_cost = Some(upgrade_cost);
        self
    }

    /// Offer the level in the build menu.
    #[must_use]
    pub const fn visible(mut self) -> Self {
        self.visible = true;
        self
    }

    /// Upgrade target and price, if this level can be upgraded.
    #[must_use]
    pub fn upgrade(&self) -> Option<(u8, u64)> {
        Some((self.next_level?, self.upgrade_cost?))
    }
}

/// A building kind and its level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingDefinition {
    /// Unique catalog key.
    pub key: String,
    /// Category.
    pub category: BuildingCategory,
    /// Levels, level 1 first.
    pub levels: Vec<LevelSpec>,
}

impl BuildingDefinition {
    /// Create a definition.
    #[must_use]
    pub fn new(key: &str, category: BuildingCategory, levels: Vec<LevelSpec>) -> Self {
        Self {
            key: key.to_string(),
            category,
            levels,
        }
    }

    /// Look up a level.
    #[must_use]
    pub fn level(&self, level: u8) -> Option<&LevelSpec> {
        self.levels.iter().find(|spec| spec.level == level)
    }

    /// Whether this is the road kind.
    #[must_use]
    pub fn is_road(&self) -> bool {
        self.key == ROAD
    }
}

/// Error building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file is not valid JSON.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two definitions share a key.
    #[error("building '{0}' is defined more than once")]
    DuplicateKind(String),
    /// A definition has no level 1.
    #[error("building '{0}' has no level 1")]
    MissingLevelOne(String),
    /// Level 1 is hidden from the build menu.
    #[error("building '{0}' level 1 must be visible")]
    HiddenLevelOne(String),
    /// A level number appears twice.
    #[error("building '{kind}' defines level {level} twice")]
    DuplicateLevel {
        /// Building key.
        kind: String,
        /// Repeated level.
        level: u8,
    },
    /// `next_level` points at a level that does not exist or loops back.
    #[error("building '{kind}' level {level} links to invalid level {next}")]
    BrokenChain {
        /// Building key.
        kind: String,
        /// Level holding the bad link.
        level: u8,
        /// Target of the link.
        next: u8,
    },
    /// A level links to a next level without an upgrade price.
    #[error("building '{kind}' level {level} links to a next level without an upgrade cost")]
    MissingUpgradeCost {
        /// Building key.
        kind: String,
        /// Level holding the link.
        level: u8,
    },
    /// The upgrade chain is longer than [`MAX_LEVELS`].
    #[error("building '{kind}' upgrade chain has {length} levels (max {MAX_LEVELS})")]
    ChainTooLong {
        /// Building key.
        kind: String,
        /// Chain length found.
        length: usize,
    },
    /// The catalog has no road kind, or the road kind is upgradable.
    #[error("catalog must define a single-level '{ROAD}' kind")]
    InvalidRoad,
}

/// Read-only table of every building kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    buildings: BTreeMap<String, BuildingDefinition>,
}

impl Catalog {
    /// Build a catalog from definitions and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if keys repeat or a level table breaks the catalog rules.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = BuildingDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut buildings = BTreeMap::new();
        for definition in definitions {
            let key = definition.key.clone();
            if buildings.insert(key.clone(), definition).is_some() {
                return Err(CatalogError::DuplicateKind(key));
            }
        }
        let catalog = Self { buildings };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a JSON array of definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<BuildingDefinition> = serde_json::from_str(text)?;
        Self::from_definitions(definitions)
    }

    /// Serialize the catalog as a JSON array of definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let definitions: Vec<&BuildingDefinition> = self.buildings.values().collect();
        Ok(serde_json::to_string_pretty(&definitions)?)
    }

    /// Check every definition against the catalog rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule violation found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for definition in self.buildings.values() {
            validate_definition(definition)?;
        }
        match self.buildings.get(ROAD) {
            Some(road) if road.levels.len() == 1 && road.levels[0].next_level.is_none() => Ok(()),
            _ => Err(CatalogError::InvalidRoad),
        }
    }

    /// Look up a building kind.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownBuildingKind`] if the key is not in the catalog.
    pub fn definition(&self, key: &str) -> SimResult<&BuildingDefinition> {
        self.buildings
            .get(key)
            .ok_or_else(|| SimError::UnknownBuildingKind(key.to_string()))
    }

    /// Look up one level of a building kind.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownBuildingKind`] or [`SimError::UnknownLevel`].
    pub fn level_spec(&self, key: &str, level: u8) -> SimResult<&LevelSpec> {
        self.definition(key)?
            .level(level)
            .ok_or_else(|| SimError::UnknownLevel {
                kind: key.to_string(),
                level,
            })
    }

    /// Whether the key names a building kind.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.buildings.contains_key(key)
    }

    /// All definitions, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &BuildingDefinition> {
        self.buildings.values()
    }

    /// Definitions offered in the build menu (level 1 visible).
    pub fn visible_kinds(&self) -> impl Iterator<Item = &BuildingDefinition> {
        self.iter()
            .filter(|definition| definition.level(1).is_some_and(|spec| spec.visible))
    }

    /// Number of building kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// The standard game data set.
    #[must_use]
    pub fn standard() -> Self {
        let buildings = standard_definitions()
            .into_iter()
            .map(|definition| (definition.key.clone(), definition))
            .collect();
        Self { buildings }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_definition(definition: &BuildingDefinition) -> Result<(), CatalogError> {
    let kind = &definition.key;

    let mut seen = HashSet::new();
    for spec in &definition.levels {
        if !seen.insert(spec.level) {
            return Err(CatalogError::DuplicateLevel {
                kind: kind.clone(),
                level: spec.level,
            });
        }
        if spec.next_level.is_some() && spec.upgrade_cost.is_none() {
            return Err(CatalogError::MissingUpgradeCost {
                kind: kind.clone(),
                level: spec.level,
            });
        }
    }

    let first = definition
        .level(1)
        .ok_or_else(|| CatalogError::MissingLevelOne(kind.clone()))?;
    if !first.visible {
        return Err(CatalogError::HiddenLevelOne(kind.clone()));
    }

    // Walk the chain from level 1; links must climb so the walk terminates.
    let mut current = first;
    let mut length = 1;
    while let Some(next) = current.next_level {
        let target = definition
            .level(next)
            .filter(|_| next > current.level)
            .ok_or_else(|| CatalogError::BrokenChain {
                kind: kind.clone(),
                level: current.level,
                next,
            })?;
        length += 1;
        if length > MAX_LEVELS {
            return Err(CatalogError::ChainTooLong {
                kind: kind.clone(),
                length,
            });
        }
        current = target;
    }

    Ok(())
}

fn standard_definitions() -> Vec<BuildingDefinition> {
    use BuildingCategory::{
        Commercial, Environment, Governance, Industrial, Infrastructure, Residential, Social,
    };

    vec![
        BuildingDefinition::new(
            "house",
            Residential,
            vec![
                LevelSpec::new(1, 300)
                    .housing(30)
                    .uses_power(10)
                    .pollutes(2)
                    .earns(5)
                    .upgrades_to(2, 600)
                    .visible(),
                LevelSpec::new(2, 600)
                    .housing(72)
                    .uses_power(15)
                    .pollutes(3)
                    .earns(11)
                    .upgrades_to(3, 1200),
                LevelSpec::new(3, 1200)
                    .housing(120)
                    .uses_power(20)
                    .pollutes(5)
                    .earns(24),
            ],
        ),
        BuildingDefinition::new(
            "house2",
            Residential,
            vec![
                LevelSpec::new(1, 400)
                    .housing(39)
                    .uses_power(8)
                    .pollutes(1)
                    .earns(7)
                    .upgrades_to(2, 800)
                    .visible(),
                LevelSpec::new(2, 800)
                    .housing(98)
                    .uses_power(12)
                    .pollutes(2)
                    .earns(14)
                    .upgrades_to(3, 1600),
                LevelSpec::new(3, 1600)
                    .housing(156)
                    .uses_power(18)
                    .pollutes(3)
                    .earns(32),
            ],
        ),
        BuildingDefinition::new(
            "factory",
            Industrial,
            vec![
                LevelSpec::new(1, 500)
                    .uses_power(40)
                    .pollutes(22)
                    .earns(70)
                    .jobs(20)
                    .upgrade_cost(1000)
                    .visible(),
            ],
        ),
        BuildingDefinition::new(
            "chemistry_factory",
            Industrial,
            vec![
                LevelSpec::new(1, 1000)
                    .uses_power(60)
                    .pollutes(45)
                    .earns(140)
                    .jobs(35)
                    .upgrades_to(2, 1500)
                    .visible(),
                LevelSpec::new(2, 1500)
                    .uses_power(80)
                    .pollutes(65)
                    .earns(240)
                    .jobs(55)
                    .upgrades_to(3, 2000),
                LevelSpec::new(3, 2000)
                    .uses_power(100)
                    .pollutes(90)
                    .earns(350)
                    .jobs(80),
            ],
        ),
        BuildingDefinition::new(
            "nuke_factory",
            Industrial,
            vec![
                LevelSpec::new(1, 5000)
                    .generates_power(300)
                    .pollutes(40)
                    .jobs(50)
                    .visible(),
            ],
        ),
        BuildingDefinition::new(
            "shop",
            Commercial,
            vec![
                LevelSpec::new(1, 400)
                    .uses_power(15)
                    .pollutes(6)
                    .earns(24)
                    .jobs(10)
                    .upgrades_to(2, 800)
                    .visible(),
                LevelSpec::new(2, 800)
                    .uses_power(25)
                    .pollutes(8)
                    .earns(60)
                    .jobs(20)
                    .upgrades_to(3, 1600),
                LevelSpec::new(3, 1600)
                    .uses_power(40)
                    .pollutes(12)
                    .earns(140)
                    .jobs(40),
            ],
        ),
        BuildingDefinition::new(
            "office",
            Commercial,
            vec![
                LevelSpec::new(1, 500)
                    .uses_power(30)
                    .pollutes(7)
                    .earns(30)
                    .jobs(15)
                    .upgrades_to(2, 1000)
                    .visible(),
                LevelSpec::new(2, 1000)
                    .uses_power(45)
                    .pollutes(12)
                    .earns(80)
                    .jobs(30)
                    .upgrades_to(3, 2000),
                LevelSpec::new(3, 2000)
                    .uses_power(65)
                    .pollutes(18)
                    .earns(180)
                    .jobs(60),
            ],
        ),
        BuildingDefinition::new(
            "park",
            Social,
            vec![
                LevelSpec::new(1, 200)
                    .uses_power(5)
                    .pollutes(-10)
                    .upgrades_to(2, 400)
                    .visible(),
                LevelSpec::new(2, 400)
                    .uses_power(8)
                    .pollutes(-20)
                    .upgrades_to(3, 800),
                LevelSpec::new(3, 800).uses_power(12).pollutes(-40),
            ],
        ),
        BuildingDefinition::new(
            "garbage_station",
            Environment,
            vec![
                LevelSpec::new(1, 500)
                    .uses_power(20)
                    .pollutes(-15)
                    .jobs(10)
                    .visible(),
            ],
        ),
        BuildingDefinition::new(
            "sun_power",
            Environment,
            vec![
                LevelSpec::new(1, 800)
                    .generates_power(50)
                    .pollutes(-10)
                    .jobs(5)
                    .visible(),
            ],
        ),
        BuildingDefinition::new(
            "water_tower",
            Environment,
            vec![LevelSpec::new(1, 700).uses_power(15).jobs(3).visible()],
        ),
        BuildingDefinition::new(
            "wind_power",
            Environment,
            vec![
                LevelSpec::new(1, 900)
                    .generates_power(70)
                    .pollutes(-15)
                    .jobs(5)
                    .visible(),
            ],
        ),
        BuildingDefinition::new(
            "hero_park",
            Social,
            vec![LevelSpec::new(1, 1200).uses_power(10).pollutes(-5).visible()],
        ),
        BuildingDefinition::new(ROAD, Infrastructure, vec![LevelSpec::new(1, 50).visible()]),
        BuildingDefinition::new(
            "hospital",
            Governance,
            vec![LevelSpec::new(1, 1000).uses_power(40).jobs(40).visible()],
        ),
        BuildingDefinition::new(
            "police",
            Governance,
            vec![LevelSpec::new(1, 1200).uses_power(30).jobs(25).visible()],
        ),
        BuildingDefinition::new(
            "fire_station",
            Governance,
            vec![LevelSpec::new(1, 900).uses_power(35).jobs(20).visible()],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = Catalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.len(), 17);
    }

    #[test]
    fn test_house_level_one() {
        let catalog = Catalog::standard();
        let spec = catalog.level_spec("house", 1).unwrap();
        assert_eq!(spec.cost, 300);
        assert_eq!(spec.max_population, 30);
        assert_eq!(spec.power_usage, 10);
        assert_eq!(spec.pollution, 2);
        assert_eq!(spec.upgrade(), Some((2, 600)));
    }

    #[test]
    fn test_road_costs_fifty() {
        let catalog = Catalog::standard();
        let road = catalog.definition(ROAD).unwrap();
        assert!(road.is_road());
        assert_eq!(road.levels.len(), 1);
        assert_eq!(road.levels[0].cost, 50);
    }

    #[test]
    fn test_factory_has_price_but_no_next_level() {
        let catalog = Catalog::standard();
        let spec = catalog.level_spec("factory", 1).unwrap();
        assert_eq!(spec.upgrade_cost, Some(1000));
        assert_eq!(spec.upgrade(), None);
    }

    #[test]
    fn test_unknown_kind_and_level() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.definition("castle").unwrap_err(),
            SimError::UnknownBuildingKind("castle".to_string())
        );
        assert_eq!(
            catalog.level_spec("road", 2).unwrap_err(),
            SimError::UnknownLevel {
                kind: "road".to_string(),
                level: 2
            }
        );
    }

    #[test]
    fn test_visible_kinds_exclude_nothing_in_standard_data() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.visible_kinds().count(), catalog.len());
    }

    #[test]
    fn test_json_round_trip_preserves_catalog() {
        let catalog = Catalog::standard();
        let json = catalog.to_json().unwrap();
        let loaded = Catalog::from_json(&json).unwrap();
        assert_eq!(catalog, loaded);
    }

    fn road() -> BuildingDefinition {
        BuildingDefinition::new(ROAD, BuildingCategory::Infrastructure, vec![
            LevelSpec::new(1, 50).visible(),
        ])
    }

    #[test]
    fn test_missing_level_one_rejected() {
        let bad = BuildingDefinition::new("tower", BuildingCategory::Social, vec![
            LevelSpec::new(2, 10).visible(),
        ]);
        let err = Catalog::from_definitions([road(), bad]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingLevelOne(ref k) if k == "tower"));
    }

    #[test]
    fn test_hidden_level_one_rejected() {
        let bad = BuildingDefinition::new("tower", BuildingCategory::Social, vec![
            LevelSpec::new(1, 10),
        ]);
        let err = Catalog::from_definitions([road(), bad]).unwrap_err();
        assert!(matches!(err, CatalogError::HiddenLevelOne(_)));
    }

    #[test]
    fn test_looping_chain_rejected() {
        let bad = BuildingDefinition::new("tower", BuildingCategory::Social, vec![
            LevelSpec::new(1, 10).upgrades_to(2, 5).visible(),
            LevelSpec::new(2, 20).upgrades_to(1, 5),
        ]);
        let err = Catalog::from_definitions([road(), bad]).unwrap_err();
        assert!(matches!(err, CatalogError::BrokenChain { level: 2, next: 1, .. }));
    }

    #[test]
    fn test_next_level_without_price_rejected() {
        let mut first = LevelSpec::new(1, 10).visible();
        first.next_level = Some(2);
        let bad = BuildingDefinition::new("tower", BuildingCategory::Social, vec![
            first,
            LevelSpec::new(2, 20),
        ]);
        assert_eq!(first.upgrade(), None);
        let err = Catalog::from_definitions([road(), bad]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingUpgradeCost { ref kind, level: 1 } if kind == "tower"
        ));
    }

    #[test]
    fn test_dangling_chain_rejected() {
        let bad = BuildingDefinition::new("tower", BuildingCategory::Social, vec![
            LevelSpec::new(1, 10).upgrades_to(2, 5).visible(),
        ]);
        let err = Catalog::from_definitions([road(), bad]).unwrap_err();
        assert!(matches!(err, CatalogError::BrokenChain { next: 2, .. }));
    }

    #[test]
    fn test_four_level_chain_rejected() {
        let bad = BuildingDefinition::new("tower", BuildingCategory::Social, vec![
            LevelSpec::new(1, 10).upgrades_to(2, 5).visible(),
            LevelSpec::new(2, 20).upgrades_to(3, 5),
            LevelSpec::new(3, 30).upgrades_to(4, 5),
            LevelSpec::new(4, 40),
        ]);
        let err = Catalog::from_definitions([road(), bad]).unwrap_err();
        assert!(matches!(err, CatalogError::ChainTooLong { length: 4, .. }));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let err = Catalog::from_definitions([road(), road()]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKind(_)));
    }

    #[test]
    fn test_catalog_without_road_rejected() {
        let house = BuildingDefinition::new("hut", BuildingCategory::Residential, vec![
            LevelSpec::new(1, 10).visible(),
        ]);
        let err = Catalog::from_definitions([house]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRoad));
    }

    #[test]
    fn test_category_flags() {
        assert!(BuildingCategory::Commercial.earns_income());
        assert!(BuildingCategory::Industrial.earns_income());
        assert!(!BuildingCategory::Residential.earns_income());
        assert!(BuildingCategory::Residential.houses_residents());
        assert_eq!(BuildingCategory::Governance.as_str(), "governance");
    }
}
