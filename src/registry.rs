//! Charity registry
//!
//! A fixed, read-only catalog of verified charities built once at startup.
//! The dialogue engine and the API hold shared references to it; nothing
//! mutates a record after construction.

mod catalog;

#[allow(unused_imports)] // Public API re-exports
pub use catalog::{all_brands, BrandDef, DEMO_CHARITY_ADDRESS, ID_SUFFIX};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Cause categories a charity can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Environment,
    Education,
    Animals,
    Health,
    Arts,
    Tech,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Environment,
        Category::Education,
        Category::Animals,
        Category::Health,
        Category::Arts,
        Category::Tech,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Environment => "Environment",
            Category::Education => "Education",
            Category::Animals => "Animals",
            Category::Health => "Health",
            Category::Arts => "Arts",
            Category::Tech => "Tech",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::UnknownCategory(s.to_string()))
    }
}

/// Stable lookup key for a charity (e.g. `cronosgreenearth.cro`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharityId(String);

impl CharityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from a display name: lowercase, whitespace removed, suffixed
    pub fn from_name(name: &str) -> Self {
        let slug: String = name
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        Self(format!("{slug}{ID_SUFFIX}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A verified charity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharityRecord {
    pub id: CharityId,
    pub name: String,
    /// Beneficiary account on the target chain
    pub address: String,
    pub category: Category,
    pub description: String,
    /// Long-form profile shown when the user asks for details
    pub bio: String,
    pub icon: String,
}

impl CharityRecord {
    pub fn from_brand(brand: &BrandDef) -> Self {
        let category = brand.category;
        let category_lower = category.as_str().to_lowercase();
        Self {
            id: CharityId::from_name(brand.name),
            name: brand.name.to_string(),
            address: DEMO_CHARITY_ADDRESS.to_string(),
            category,
            description: format!(
                "Verified impact project focused on {category_lower} initiatives."
            ),
            bio: format!(
                "**{name}** has been verified by Cronos ID since 2024. \n\n\
                 They specialize in **{category}** solutions, leveraging blockchain technology \
                 to ensure 100% transparency in fund allocation. \n\n\
                 Recent milestones:\n\
                 • 50+ Successful on-chain campaigns\n\
                 • 1M+ CRO deployed to impact causes\n\
                 • Top-rated by the decentralized communityDAO.\n\n\
                 Your donation will directly fund their upcoming Q3 initiative.",
                name = brand.name,
            ),
            icon: brand.icon.to_string(),
        }
    }

    /// Whether a case-folded utterance mentions this charity by name, category or id
    pub fn is_mentioned_in(&self, folded_text: &str) -> bool {
        folded_text.contains(&self.name.to_lowercase())
            || folded_text.contains(&self.category.as_str().to_lowercase())
            || folded_text.contains(self.id.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Charity has an empty id: {0}")]
    EmptyId(String),
    #[error("Duplicate charity id: {0}")]
    DuplicateId(CharityId),
    #[error("Registry has no charities in required category {0}")]
    MissingCategory(Category),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Category that must always be populated (emergency routing depends on it)
const REQUIRED_CATEGORY: Category = Category::Health;

/// Expand the seeded brands into full records, in catalog order
pub fn build() -> Vec<CharityRecord> {
    all_brands().iter().map(CharityRecord::from_brand).collect()
}

/// Immutable charity catalog
#[derive(Debug, Clone)]
pub struct Registry {
    records: Vec<CharityRecord>,
}

impl Registry {
    /// Validate and wrap a set of records.
    ///
    /// Ids must be unique and non-empty, and the Health category must be
    /// populated so emergency requests always have a recommendation.
    pub fn new(records: Vec<CharityRecord>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.id.as_str().is_empty() {
                return Err(RegistryError::EmptyId(record.name.clone()));
            }
            if !seen.insert(record.id.clone()) {
                return Err(RegistryError::DuplicateId(record.id.clone()));
            }
        }
        if !records.iter().any(|r| r.category == REQUIRED_CATEGORY) {
            return Err(RegistryError::MissingCategory(REQUIRED_CATEGORY));
        }
        Ok(Self { records })
    }

    /// The seeded demo catalog
    pub fn seeded() -> Result<Self, RegistryError> {
        Self::new(build())
    }

    pub fn all(&self) -> &[CharityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// First record matching the predicate, in catalog order
    pub fn find(&self, predicate: impl Fn(&CharityRecord) -> bool) -> Option<&CharityRecord> {
        self.records.iter().find(|r| predicate(r))
    }

    /// Records in a category, in catalog order
    pub fn filter(&self, category: Category) -> Vec<&CharityRecord> {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    pub fn get(&self, id: &CharityId) -> Option<&CharityRecord> {
        self.find(|r| &r.id == id)
    }

    /// First record mentioned in an already case-folded utterance
    pub fn search(&self, folded_text: &str) -> Option<&CharityRecord> {
        self.find(|r| r.is_mentioned_in(folded_text))
    }
}
