use std::path::Path;

use lugar_core::{load_category_styles, CategoryStyles};

/// Resolve the category style table: the YAML override when a path is given,
/// the built-in table otherwise.
///
/// # Errors
///
/// Returns an error if the override file cannot be read or fails validation.
pub(crate) fn load_styles(path: Option<&Path>) -> anyhow::Result<CategoryStyles> {
    match path {
        Some(path) => {
            let styles = load_category_styles(path)?;
            tracing::info!(
                path = %path.display(),
                categories = styles.len(),
                "loaded category styles"
            );
            Ok(styles)
        }
        None => Ok(CategoryStyles::builtin()),
    }
}

/// Print every category slug with its label, color and icon.
///
/// # Errors
///
/// Returns an error if the style table cannot be loaded or serialized.
pub(crate) fn run_categories(path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let styles = load_styles(path)?;

    if json {
        let rows: Vec<serde_json::Value> = styles
            .entries()
            .into_iter()
            .map(|(slug, style)| {
                serde_json::json!({
                    "slug": slug,
                    "label": style.label,
                    "color": style.color,
                    "icon": style.icon,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<16}{:<18}{:<10}ICON", "SLUG", "LABEL", "COLOR");
    for (slug, style) in styles.entries() {
        println!(
            "{:<16}{:<18}{:<10}{}",
            slug, style.label, style.color, style.icon
        );
    }
    Ok(())
}
