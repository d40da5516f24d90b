//! Seeded charity brands
//!
//! The demo catalog: 50 verified causes across all six categories.

use super::Category;

/// A catalog entry before it is expanded into a full record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandDef {
    pub name: &'static str,
    pub category: Category,
    pub icon: &'static str,
}

const fn brand(name: &'static str, category: Category, icon: &'static str) -> BrandDef {
    BrandDef {
        name,
        category,
        icon,
    }
}

/// Demo beneficiary address shared by every seeded charity
pub const DEMO_CHARITY_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// Suffix appended to every derived charity id
pub const ID_SUFFIX: &str = ".cro";

static BRANDS: &[BrandDef] = &[
    // Environment
    brand("Cronos Green Earth", Category::Environment, "🌳"),
    brand("Ocean Cleanup DAO", Category::Environment, "🌊"),
    brand("Reforest The Future", Category::Environment, "🌲"),
    brand("Solar For All", Category::Environment, "☀️"),
    brand("Carbon Zero Initiative", Category::Environment, "♻️"),
    brand("Clean Water Protocol", Category::Environment, "💧"),
    brand("Save The Amazon", Category::Environment, "🦜"),
    brand("Urban Vertical Farms", Category::Environment, "🏢"),
    brand("EcoGrid Energy", Category::Environment, "⚡"),
    brand("Plastic Free Oceans", Category::Environment, "🐳"),
    // Education
    brand("Blockchain For Kids", Category::Education, "🎓"),
    brand("Global Literacy Fund", Category::Education, "📚"),
    brand("Code The Future", Category::Education, "💻"),
    brand("Stem Girls Initiative", Category::Education, "🧬"),
    brand("Open Source Academy", Category::Education, "🏺"),
    brand("Rural School Connect", Category::Education, "🏫"),
    brand("Scholarship DAO", Category::Education, "📜"),
    brand("Digital Libraries", Category::Education, "📖"),
    brand("Teacher Support Fund", Category::Education, "🍎"),
    brand("University Research Grant", Category::Education, "🧪"),
    // Animals
    brand("Save The Whales DAO", Category::Animals, "🐋"),
    brand("Tiger Conservation", Category::Animals, "🐯"),
    brand("Stray Dog Rescue", Category::Animals, "🐕"),
    brand("Wild Bird Sanctuary", Category::Animals, "🦅"),
    brand("Panda Protection", Category::Animals, "🐼"),
    brand("Koala Habitat Resto", Category::Animals, "🐨"),
    brand("Marine Life Guard", Category::Animals, "🐠"),
    brand("Elephant Sanctuary", Category::Animals, "🐘"),
    brand("Bee Population Revive", Category::Animals, "🐝"),
    brand("Animal Shelter Alpha", Category::Animals, "🏠"),
    // Health
    brand("MediChain Relief", Category::Health, "🚑"),
    brand("Cancer Research DAO", Category::Health, "🔬"),
    brand("Mental Health Aware", Category::Health, "🧠"),
    brand("Global Vaccine Fund", Category::Health, "💉"),
    brand("Heart Care Foundation", Category::Health, "❤️"),
    brand("Red Cross On-Chain", Category::Health, "🏥"),
    brand("Vision For All", Category::Health, "👓"),
    brand("Diabetes Support", Category::Health, "🩺"),
    brand("Elderly Care Connect", Category::Health, "👵"),
    brand("Emergency Response", Category::Health, "🚨"),
    // Arts
    brand("Digital Artists Fund", Category::Arts, "🎨"),
    brand("Museum On-Chain", Category::Arts, "🏛️"),
    brand("Music For Peace", Category::Arts, "🎵"),
    // Tech
    brand("Web3 Developer Grant", Category::Tech, "⌨️"),
    brand("Privacy Tooling Fund", Category::Tech, "🔒"),
    brand("AI Safety Research", Category::Tech, "🤖"),
    brand("DeSci Lab Equipment", Category::Tech, "🔭"),
    brand("Internet For All", Category::Tech, "📡"),
    brand("Civic Tech Alliance", Category::Tech, "🏙️"),
    brand("Open Data Protocol", Category::Tech, "💾"),
];

/// All seeded brands in catalog order
pub fn all_brands() -> &'static [BrandDef] {
    BRANDS
}
