//! # Model Catalog
//!
//! Turns a directory listing of model files into catalog entries the user can
//! pick from. Display names, icons and categories are derived from the file
//! name with keyword heuristics, so the model repository needs no metadata.
//!
//! ## Usage
//!
//! ```no_run
//! use room_arranger::catalog::{Catalog, GitHubListing, ListingSource};
//! use room_arranger::config::CatalogSource;
//!
//! let listing = GitHubListing::new(CatalogSource::default());
//! let catalog = Catalog::fetch(&listing)?;
//! for group in catalog.grouped("") {
//!     println!("{} ({} models)", group.category.label(), group.entries.len());
//! }
//! # Ok::<(), room_arranger::catalog::CatalogError>(())
//! ```

pub mod listing;

pub use listing::{GitHubListing, ListingEntry, ListingKind, ListingSource, LocalListing};

use std::cmp::Ordering;

/// Errors raised while building the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("GitHub API returned {0}")]
    Status(u16),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("could not parse directory listing: {0}")]
    Parse(String),
    #[error("could not read model folder {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no .glb files found in the model folder")]
    NoModels,
}

/// Model file formats the placement engine knows how to import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Glb,
    Obj,
}

impl ModelFormat {
    const EXTENSIONS: [(&'static str, ModelFormat); 2] =
        [(".glb", ModelFormat::Glb), (".obj", ModelFormat::Obj)];

    /// Detects the format from a file name, ignoring case
    pub fn from_file_name(file: &str) -> Option<Self> {
        let lower = file.to_ascii_lowercase();
        Self::EXTENSIONS
            .iter()
            .find(|(ext, _)| lower.ends_with(ext) && lower.len() > ext.len())
            .map(|(_, format)| *format)
    }

    fn strip_extension(file: &str) -> &str {
        let lower = file.to_ascii_lowercase();
        for (ext, _) in Self::EXTENSIONS.iter() {
            if lower.ends_with(ext) {
                return &file[..file.len() - ext.len()];
            }
        }
        file
    }
}

/// Furniture category inferred from a model name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Seating,
    Bedroom,
    Tables,
    Storage,
    Bathroom,
    Decor,
    Other,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Seating => "Seating",
            Category::Bedroom => "Bedroom",
            Category::Tables => "Tables",
            Category::Storage => "Storage",
            Category::Bathroom => "Bathroom",
            Category::Decor => "Decor",
            Category::Other => "Other",
        }
    }
}

/// Catalog icon: an emoji plus an ASCII badge for fonts without emoji glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub emoji: &'static str,
    pub badge: &'static str,
}

const fn icon(emoji: &'static str, badge: &'static str) -> Icon {
    Icon { emoji, badge }
}

// First matching row wins, so "nightstand" never reaches its own row.
const ICON_RULES: &[(&[&str], Icon)] = &[
    (&["sofa", "couch"], icon("🛋", "SOF")),
    (&["chair", "stool", "seat", "bench"], icon("🪑", "CHR")),
    (&["bed", "mattress"], icon("🛏", "BED")),
    (&["table", "desk", "counter"], icon("🪵", "TBL")),
    (&["shelf", "bookcase", "bookshelf"], icon("📚", "SHF")),
    (&["wardrobe", "closet", "cabinet", "dresser"], icon("🗄", "CAB")),
    (&["lamp", "light", "sconce"], icon("💡", "LMP")),
    (&["plant", "tree", "flower"], icon("🌿", "PLT")),
    (&["tv", "television", "screen", "stand"], icon("📺", "TV")),
    (&["door"], icon("🚪", "DR")),
    (&["nightstand", "bedside"], icon("🕯", "NST")),
    (&["rug", "carpet"], icon("🟫", "RUG")),
    (&["mirror"], icon("🪞", "MIR")),
    (&["picture", "frame", "art"], icon("🖼", "ART")),
    (&["curtain", "blind"], icon("🪟", "WIN")),
    (&["bath", "tub", "toilet", "sink"], icon("🛁", "BTH")),
];

const FALLBACK_ICON: Icon = icon("📦", "BOX");

const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["sofa", "couch", "chair", "stool", "bench", "seat"], Category::Seating),
    (&["bed", "mattress", "nightstand", "bedside"], Category::Bedroom),
    (&["table", "desk", "counter"], Category::Tables),
    (
        &["shelf", "bookcase", "wardrobe", "closet", "cabinet", "dresser"],
        Category::Storage,
    ),
    (&["bath", "tub", "toilet", "sink"], Category::Bathroom),
    (
        &[
            "lamp", "light", "plant", "tree", "tv", "rug", "mirror", "picture", "frame",
            "curtain", "blind",
        ],
        Category::Decor,
    ),
];

fn first_match<T: Copy>(name: &str, rules: &[(&[&str], T)]) -> Option<T> {
    let lower = name.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, value)| *value)
}

/// Icon for a display name
pub fn icon_for(name: &str) -> Icon {
    first_match(name, ICON_RULES).unwrap_or(FALLBACK_ICON)
}

/// Category for a display name
pub fn category_for(name: &str) -> Category {
    first_match(name, CATEGORY_RULES).unwrap_or(Category::Other)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Human readable name for a model file: `sofa_chair.glb` becomes `Sofa Chair`
pub fn display_name(file: &str) -> String {
    let stem = ModelFormat::strip_extension(file);
    let mut name = String::with_capacity(stem.len());
    let mut previous_is_word = false;

    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let is_word = is_word_char(c);
        if is_word && !previous_is_word {
            name.push(c.to_ascii_uppercase());
        } else {
            name.push(c);
        }
        previous_is_word = is_word;
    }

    name
}

/// A model the user can add to the room
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub file: String,
    pub icon: Icon,
    pub category: Category,
    pub format: ModelFormat,
    /// Direct download location when the listing provides one
    pub download_url: Option<String>,
}

impl CatalogEntry {
    /// Builds an entry from a model file name, or `None` for unsupported files
    pub fn from_file(file: &str) -> Option<Self> {
        let format = ModelFormat::from_file_name(file)?;
        let name = display_name(file);
        Some(Self {
            icon: icon_for(&name),
            category: category_for(&name),
            name,
            file: file.to_string(),
            format,
            download_url: None,
        })
    }

    pub fn with_download_url(mut self, url: Option<String>) -> Self {
        self.download_url = url;
        self
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// One category block of the catalog panel
#[derive(Debug)]
pub struct CatalogGroup<'a> {
    pub category: Category,
    pub entries: Vec<&'a CatalogEntry>,
}

/// Sorted set of catalog entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Lists `source` and builds the catalog from the formats it serves
    pub fn fetch(source: &dyn ListingSource) -> Result<Self, CatalogError> {
        let catalog = Self::from_listing(source.list()?, source.formats())?;
        log::info!("Catalog from {}: {} models", source.describe(), catalog.len());
        Ok(catalog)
    }

    /// Builds the catalog from a directory listing
    ///
    /// Keeps files in one of `formats` only, then sorts by category label and
    /// name. A listing without any model file is an error so the UI can say so.
    pub fn from_listing(
        listing: Vec<ListingEntry>,
        formats: &[ModelFormat],
    ) -> Result<Self, CatalogError> {
        let mut entries: Vec<CatalogEntry> = listing
            .into_iter()
            .filter(|entry| entry.kind == ListingKind::File)
            .filter_map(|entry| {
                CatalogEntry::from_file(&entry.name)
                    .filter(|catalog_entry| formats.contains(&catalog_entry.format))
                    .map(|catalog_entry| catalog_entry.with_download_url(entry.download_url))
            })
            .collect();

        if entries.is_empty() {
            return Err(CatalogError::NoModels);
        }

        entries.sort_by(|a, b| {
            compare_text(a.category.label(), b.category.label())
                .then_with(|| compare_text(&a.name, &b.name))
        });

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups entries whose name contains `filter` (case-insensitive)
    ///
    /// Groups come out in catalog order; an empty vector means nothing matched.
    pub fn grouped(&self, filter: &str) -> Vec<CatalogGroup<'_>> {
        let needle = filter.trim().to_lowercase();
        let mut groups: Vec<CatalogGroup<'_>> = Vec::new();

        for entry in &self.entries {
            if !needle.is_empty() && !entry.name.to_lowercase().contains(&needle) {
                continue;
            }
            match groups.iter_mut().find(|g| g.category == entry.category) {
                Some(group) => group.entries.push(entry),
                None => groups.push(CatalogGroup {
                    category: entry.category,
                    entries: vec![entry],
                }),
            }
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> ListingEntry {
        ListingEntry::file(name)
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("sofa_chair.glb"), "Sofa Chair");
        assert_eq!(display_name("coffee-table.GLB"), "Coffee Table");
        assert_eq!(display_name("tv stand.glb"), "Tv Stand");
        assert_eq!(display_name("kid's bed.glb"), "Kid'S Bed");
        assert_eq!(display_name("2_seater.obj"), "2 Seater");
    }

    #[test]
    fn test_icon_first_match_wins() {
        assert_eq!(icon_for("Sofa Chair").emoji, "🛋");
        assert_eq!(icon_for("Office Chair").emoji, "🪑");
        // "nightstand" contains "stand" which belongs to the tv row
        assert_eq!(icon_for("Nightstand").emoji, "📺");
        assert_eq!(icon_for("Bedside Lamp").emoji, "🛏");
        assert_eq!(icon_for("Thing").emoji, "📦");
    }

    #[test]
    fn test_category_heuristics() {
        assert_eq!(category_for("Sofa"), Category::Seating);
        assert_eq!(category_for("Nightstand"), Category::Bedroom);
        assert_eq!(category_for("Desk Lamp"), Category::Tables);
        assert_eq!(category_for("Bookcase"), Category::Storage);
        assert_eq!(category_for("Toilet"), Category::Bathroom);
        assert_eq!(category_for("Floor Lamp"), Category::Decor);
        assert_eq!(category_for("Piano"), Category::Other);
    }

    #[test]
    fn test_listing_filters_and_sorts() {
        let listing = vec![
            file("table.glb"),
            file("readme.md"),
            ListingEntry::dir("textures"),
            file("armchair.glb"),
            file("bar_stool.glb"),
            file("plant.GLB"),
        ];
        let catalog = Catalog::from_listing(listing, &[ModelFormat::Glb]).unwrap();

        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Plant", "Armchair", "Bar Stool", "Table"]);
        assert_eq!(catalog.entries()[0].category, Category::Decor);
        assert_eq!(catalog.entries()[3].file, "table.glb");
    }

    #[test]
    fn test_empty_listing_is_an_error() {
        let result = Catalog::from_listing(
            vec![file("notes.txt"), ListingEntry::dir("glb")],
            &[ModelFormat::Glb, ModelFormat::Obj],
        );
        assert!(matches!(result, Err(CatalogError::NoModels)));
    }

    #[test]
    fn test_grouped_filter() {
        let listing = vec![file("sofa.glb"), file("chair.glb"), file("desk.glb")];
        let catalog = Catalog::from_listing(listing, &[ModelFormat::Glb]).unwrap();

        let groups = catalog.grouped("");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, Category::Seating);
        assert_eq!(groups[0].entries.len(), 2);

        let groups = catalog.grouped("DESK");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries[0].name, "Desk");

        assert!(catalog.grouped("wardrobe").is_empty());
    }

    #[test]
    fn test_formats_filter() {
        let listing = || vec![file("bed.obj"), file("bed.glb"), file("lamp.obj")];

        let glb_only = Catalog::from_listing(listing(), &[ModelFormat::Glb]).unwrap();
        assert_eq!(glb_only.len(), 1);
        assert_eq!(glb_only.entries()[0].format, ModelFormat::Glb);

        let both = Catalog::from_listing(listing(), &[ModelFormat::Glb, ModelFormat::Obj]).unwrap();
        assert_eq!(both.len(), 3);

        let none = Catalog::from_listing(vec![file("lamp.obj")], &[ModelFormat::Glb]);
        assert!(matches!(none, Err(CatalogError::NoModels)));
    }
}
