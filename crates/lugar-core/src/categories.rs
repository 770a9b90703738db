use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Slug of the catch-all entry. Always present in a [`CategoryStyles`] table.
pub const DEFAULT_CATEGORY_SLUG: &str = "default";

/// Marker color and icon for a business category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub label: String,
    /// `#rrggbb`
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStyleConfig {
    pub slug: String,
    pub label: String,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryStyleConfig>,
}

const BUILTIN: &[(&str, &str, &str, &str)] = &[
    ("restaurantes", "Restaurantes", "#e74c3c", "utensils"),
    ("cafeterias", "Cafeterías", "#8e5b3a", "coffee"),
    ("bares", "Bares", "#f39c12", "glass"),
    ("tiendas", "Tiendas", "#9b59b6", "shopping-bag"),
    ("ocio", "Ocio", "#1abc9c", "ticket"),
    ("servicios", "Servicios", "#3498db", "wrench"),
    ("salud", "Salud", "#2ecc71", "heart"),
    ("belleza", "Belleza", "#e84393", "scissors"),
    ("alojamiento", "Alojamiento", "#34495e", "bed"),
    (DEFAULT_CATEGORY_SLUG, "Otros", "#7f8c8d", "map-pin"),
];

/// Category slug → visual style lookup table.
///
/// Lookups never fail: unknown slugs resolve to the `default` entry.
#[derive(Debug, Clone)]
pub struct CategoryStyles {
    by_slug: HashMap<String, CategoryStyle>,
    fallback: CategoryStyle,
}

impl Default for CategoryStyles {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryStyles {
    /// The table compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        let by_slug: HashMap<String, CategoryStyle> = BUILTIN
            .iter()
            .map(|(slug, label, color, icon)| {
                (
                    (*slug).to_string(),
                    CategoryStyle {
                        label: (*label).to_string(),
                        color: (*color).to_string(),
                        icon: (*icon).to_string(),
                    },
                )
            })
            .collect();
        let fallback = by_slug
            .get(DEFAULT_CATEGORY_SLUG)
            .cloned()
            .unwrap_or_else(|| CategoryStyle {
                label: "Otros".to_string(),
                color: "#7f8c8d".to_string(),
                icon: "map-pin".to_string(),
            });
        Self { by_slug, fallback }
    }

    /// Normalizes a raw slug: trims and lowercases.
    #[must_use]
    pub fn normalize_slug(slug: &str) -> String {
        slug.trim().to_lowercase()
    }

    /// Resolves a slug to its normalized key and style.
    ///
    /// Returns `(DEFAULT_CATEGORY_SLUG, default style)` for unknown or absent slugs.
    #[must_use]
    pub fn resolve(&self, slug: Option<&str>) -> (String, &CategoryStyle) {
        let key = slug.map(Self::normalize_slug).unwrap_or_default();
        match self.by_slug.get(&key) {
            Some(style) => (key, style),
            None => (DEFAULT_CATEGORY_SLUG.to_string(), &self.fallback),
        }
    }

    /// Style for `slug`, falling back to the default entry.
    #[must_use]
    pub fn style_for(&self, slug: &str) -> &CategoryStyle {
        self.resolve(Some(slug)).1
    }

    /// Reverse lookup: the slug whose label equals `label` (case-insensitive).
    #[must_use]
    pub fn slug_for_label(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.entries()
            .into_iter()
            .find(|(slug, style)| {
                *slug != DEFAULT_CATEGORY_SLUG && style.label.to_lowercase() == wanted
            })
            .map(|(slug, _)| slug)
    }

    /// All entries sorted by slug, `default` included.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &CategoryStyle)> {
        let mut entries: Vec<(&str, &CategoryStyle)> = self
            .by_slug
            .iter()
            .map(|(slug, style)| (slug.as_str(), style))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }

    /// Overlays `overrides` on top of this table. Entries with the same slug
    /// replace the existing style; a `default` entry replaces the fallback.
    fn merge(mut self, overrides: Vec<CategoryStyleConfig>) -> Self {
        for entry in overrides {
            let slug = Self::normalize_slug(&entry.slug);
            let style = CategoryStyle {
                label: entry.label,
                color: entry.color.to_lowercase(),
                icon: entry.icon,
            };
            if slug == DEFAULT_CATEGORY_SLUG {
                self.fallback = style.clone();
            }
            self.by_slug.insert(slug, style);
        }
        self
    }
}

/// Load the built-in category table merged with overrides from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_category_styles(path: &Path) -> Result<CategoryStyles, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CategoriesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CategoriesFileParse)?;

    validate_categories(&file)?;

    Ok(CategoryStyles::builtin().merge(file.categories))
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for entry in &file.categories {
        let slug = CategoryStyles::normalize_slug(&entry.slug);
        if slug.is_empty() {
            return Err(ConfigError::Validation(
                "category slug must be non-empty".to_string(),
            ));
        }

        if entry.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{slug}' has an empty label"
            )));
        }

        if !is_hex_color(&entry.color) {
            return Err(ConfigError::Validation(format!(
                "category '{slug}' has invalid color '{}'; expected #rrggbb",
                entry.color
            )));
        }

        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category slug: '{slug}'"
            )));
        }
    }

    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
