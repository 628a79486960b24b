//! Static game data: species definitions and the shop inventory.
//!
//! Loaded once at process start from RON and shared read-only (`Arc<Catalog>`)
//! by every component. Nothing mutates a catalog after it is built.

use crate::errors::{CatalogError, CatalogResult};
use schema::{ShopItem, Species, SpeciesData};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const SPECIES_FILE: &str = "species.ron";
const SHOP_FILE: &str = "shop.ron";

const BUILTIN_SPECIES: &str = include_str!("../data/species.ron");
const BUILTIN_SHOP: &str = include_str!("../data/shop.ron");

#[derive(Debug, Clone)]
pub struct Catalog {
    species: Vec<SpeciesData>,
    species_index: HashMap<Species, usize>,
    items: Vec<ShopItem>,
}

impl Catalog {
    /// The catalog bundled into the binary.
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_ron(BUILTIN_SPECIES, BUILTIN_SHOP)
    }

    /// Load `species.ron` and `shop.ron` from a data directory.
    pub fn load(data_path: &Path) -> CatalogResult<Self> {
        let species = read_file(&data_path.join(SPECIES_FILE))?;
        let shop = read_file(&data_path.join(SHOP_FILE))?;
        Self::from_ron(&species, &shop)
    }

    pub fn from_ron(species_ron: &str, shop_ron: &str) -> CatalogResult<Self> {
        let species: Vec<SpeciesData> =
            ron::from_str(species_ron).map_err(|e| CatalogError::Parse {
                path: SPECIES_FILE.to_string(),
                message: e.to_string(),
            })?;
        let items: Vec<ShopItem> = ron::from_str(shop_ron).map_err(|e| CatalogError::Parse {
            path: SHOP_FILE.to_string(),
            message: e.to_string(),
        })?;
        Self::new(species, items)
    }

    pub fn new(species: Vec<SpeciesData>, items: Vec<ShopItem>) -> CatalogResult<Self> {
        if species.is_empty() {
            return Err(CatalogError::Invalid("no species defined".to_string()));
        }

        let mut species_index = HashMap::new();
        for (position, data) in species.iter().enumerate() {
            validate_chain(data)?;
            if species_index.insert(data.species, position).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "species {:?} defined twice",
                    data.species
                )));
            }
        }

        for (position, item) in items.iter().enumerate() {
            if items[..position].iter().any(|other| other.name == item.name) {
                return Err(CatalogError::Invalid(format!(
                    "shop item 「{}」 defined twice",
                    item.name
                )));
            }
        }

        Ok(Self {
            species,
            species_index,
            items,
        })
    }

    pub fn species(&self, species: Species) -> Option<&SpeciesData> {
        self.species_index
            .get(&species)
            .and_then(|&index| self.species.get(index))
    }

    /// All species in catalog order. Adoption and wild encounters roll over this list.
    pub fn all_species(&self) -> &[SpeciesData] {
        &self.species
    }

    pub fn item(&self, name: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }
}

fn read_file(path: &Path) -> CatalogResult<String> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Every chain is non-empty, and only its last stage lacks an evolve level.
fn validate_chain(data: &SpeciesData) -> CatalogResult<()> {
    let Some((last, earlier)) = data.evolutions.split_last() else {
        return Err(CatalogError::Invalid(format!(
            "{} has no evolution stages",
            data.name
        )));
    };
    if last.evolve_level.is_some() {
        return Err(CatalogError::Invalid(format!(
            "final stage of {} must not have an evolve level",
            data.name
        )));
    }
    if let Some(open) = earlier.iter().find(|stage| stage.evolve_level.is_none()) {
        return Err(CatalogError::Invalid(format!(
            "stage {} of {} is marked final but is not last",
            open.name, data.name
        )));
    }
    Ok(())
}
