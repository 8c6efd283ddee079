//! PokéAPI records and the catalog entities derived from them
//!
//! Wire types mirror the JSON returned by the API. Catalog entities are the
//! immutable snapshots the rest of the system works with. Conversions between
//! the two are pure.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

// ============================================================================
// Wire types
// ============================================================================

/// A `{name, url}` reference as returned in list and type responses.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ListItemRef {
    pub name: String,
    pub url: String,
}

impl ListItemRef {
    /// Entity id derived from the trailing path segment of `url`.
    pub fn id(&self) -> Result<u32, CatalogError> {
        parse_entity_id(&self.url)
    }
}

/// `GET /pokemon?offset=&limit=`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonListResponse {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<ListItemRef>,
}

/// `GET /pokemon/{idOrName}`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    pub types: Vec<PokemonTypeSlot>,
    pub sprites: PokemonSprites,
    #[serde(default)]
    pub abilities: Vec<PokemonAbility>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonTypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: ListItemRef,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PokemonSprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork")]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Artwork {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonAbility {
    pub ability: ListItemRef,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: ListItemRef,
}

/// `GET /type`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeListResponse {
    pub results: Vec<ListItemRef>,
}

/// `GET /type/{name}`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeResponse {
    pub name: String,
    pub pokemon: Vec<TypePokemonSlot>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypePokemonSlot {
    pub pokemon: ListItemRef,
}

// ============================================================================
// Catalog entities
// ============================================================================

/// One page of the default list, or the complete unpaged search index.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ListPage {
    pub total_count: usize,
    pub items: Vec<ListItemRef>,
}

impl ListPage {
    /// Ids of every item in server order. Fails if any url is malformed.
    pub fn ids(&self) -> Result<Vec<u32>, CatalogError> {
        self.items.iter().map(ListItemRef::id).collect()
    }
}

impl From<PokemonListResponse> for ListPage {
    fn from(response: PokemonListResponse) -> Self {
        ListPage {
            total_count: response.count,
            items: response.results,
        }
    }
}

/// Complete membership of one category (elemental type).
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryMembership {
    pub category_name: String,
    pub members: Vec<ListItemRef>,
}

impl CategoryMembership {
    pub fn ids(&self) -> Result<Vec<u32>, CatalogError> {
        self.members.iter().map(ListItemRef::id).collect()
    }
}

impl From<TypeResponse> for CategoryMembership {
    fn from(response: TypeResponse) -> Self {
        CategoryMembership {
            category_name: response.name,
            members: response.pokemon.into_iter().map(|p| p.pokemon).collect(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct BaseStat {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Ability {
    pub name: String,
    pub hidden: bool,
}

/// Immutable detail snapshot of one entity, keyed by `id`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct EntityDetail {
    pub id: u32,
    pub name: String,
    /// Category names in server order.
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    pub artwork_url: Option<String>,
    /// Decimetres.
    pub height: u32,
    /// Hectograms.
    pub weight: u32,
    pub stats: Vec<BaseStat>,
    pub abilities: Vec<Ability>,
}

impl From<Pokemon> for EntityDetail {
    fn from(pokemon: Pokemon) -> Self {
        let mut slots = pokemon.types;
        slots.sort_by_key(|t| t.slot);

        EntityDetail {
            id: pokemon.id,
            name: pokemon.name,
            categories: slots.into_iter().map(|t| t.kind.name).collect(),
            image_url: pokemon.sprites.front_default,
            artwork_url: pokemon
                .sprites
                .other
                .and_then(|o| o.official_artwork)
                .and_then(|a| a.front_default),
            height: pokemon.height,
            weight: pokemon.weight,
            stats: pokemon
                .stats
                .into_iter()
                .map(|s| BaseStat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
            abilities: pokemon
                .abilities
                .into_iter()
                .map(|a| Ability {
                    name: a.ability.name,
                    hidden: a.is_hidden,
                })
                .collect(),
        }
    }
}

/// Projection of [`EntityDetail`] shown as one table row.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: u32,
    pub name: String,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
}

impl From<&EntityDetail> for DisplayRow {
    fn from(detail: &EntityDetail) -> Self {
        DisplayRow {
            id: detail.id,
            name: detail.name.clone(),
            categories: detail.categories.clone(),
            image_url: detail.image_url.clone(),
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Parse the entity id out of a resource url.
///
/// PokéAPI urls end with a slash (`.../pokemon/25/`), so the id is the
/// second-to-last `/`-delimited segment. A url without the trailing slash
/// uses its last segment.
pub fn parse_entity_id(url: &str) -> Result<u32, CatalogError> {
    let trimmed = url.strip_suffix('/').unwrap_or(url);

    trimmed
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .and_then(|segment| segment.parse::<u32>().ok())
        .ok_or_else(|| CatalogError::MalformedId {
            url: url.to_string(),
        })
}

/// How a user referred to a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Id(u32),
    Name(String),
}

impl EntityRef {
    /// Accepts a numeric id, a resource url, or a name (lower-cased).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(id) = input.parse::<u32>() {
            return Some(EntityRef::Id(id));
        }

        if input.contains("://") {
            return parse_entity_id(input).ok().map(EntityRef::Id);
        }

        Some(EntityRef::Name(input.to_lowercase()))
    }

    /// Path segment used in `GET /pokemon/{idOrName}`.
    pub fn path_segment(&self) -> String {
        match self {
            EntityRef::Id(id) => id.to_string(),
            EntityRef::Name(name) => name.clone(),
        }
    }
}

// ============================================================================
// Detail view
// ============================================================================

/// Highest base stat value any entity can have; stat bars scale to it.
pub const MAX_BASE_STAT: u32 = 255;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatLine {
    pub name: String,
    pub value: u32,
    /// Share of [`MAX_BASE_STAT`], capped at 100.
    pub percent: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AbilityLine {
    pub name: String,
    pub hidden: bool,
}

/// Everything the detail screen renders for one entity.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DetailView {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub image_url: Option<String>,
    pub height_m: f64,
    pub weight_kg: f64,
    pub stats: Vec<StatLine>,
    pub stat_total: u32,
    pub abilities: Vec<AbilityLine>,
}

impl From<&EntityDetail> for DetailView {
    fn from(detail: &EntityDetail) -> Self {
        let stats: Vec<StatLine> = detail
            .stats
            .iter()
            .map(|s| StatLine {
                name: s.name.replacen('-', " ", 1),
                value: s.value,
                percent: (f64::from(s.value) / f64::from(MAX_BASE_STAT) * 100.0).min(100.0),
            })
            .collect();

        DetailView {
            id: detail.id,
            name: detail.name.clone(),
            types: detail.categories.clone(),
            image_url: detail
                .artwork_url
                .clone()
                .or_else(|| detail.image_url.clone()),
            height_m: f64::from(detail.height) / 10.0,
            weight_kg: f64::from(detail.weight) / 10.0,
            stat_total: detail.stats.iter().map(|s| s.value).sum(),
            stats,
            abilities: detail
                .abilities
                .iter()
                .map(|a| AbilityLine {
                    name: a.name.replace('-', " "),
                    hidden: a.hidden,
                })
                .collect(),
        }
    }
}
