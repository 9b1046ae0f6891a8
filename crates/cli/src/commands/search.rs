use anyhow::{bail, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use imagepack_core::query::{self, Filter};
use imagepack_core::Collection;

/// Turn the search flags into filters. At least one criterion is required.
pub fn filters(
    tags: Vec<String>,
    description: Option<String>,
    category: Option<String>,
    keyword: Option<String>,
    key: Option<String>,
) -> Result<Vec<Filter>> {
    let mut filters = Vec::new();
    if !tags.is_empty() {
        filters.push(Filter::Tags(tags));
    }
    filters.extend(description.map(Filter::Description));
    filters.extend(category.map(Filter::Category));
    filters.extend(keyword.map(Filter::Keyword));
    filters.extend(key.map(Filter::Key));

    if filters.is_empty() {
        bail!("no search criteria given; use --tag, --description, --category, --keyword or --key (see --help)");
    }
    Ok(filters)
}

pub fn run(collection: &Collection, filters: &[Filter], details: bool) -> Result<()> {
    for filter in filters {
        println!("Searching {}", describe(filter));
    }

    let results = query::sorted(query::search(collection, filters)?);
    if results.is_empty() {
        println!("No images found matching your search criteria.");
        return Ok(());
    }

    println!();
    println!("Found {} image(s):", results.len());
    println!();

    if details {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Placeholder"),
            Cell::new("Description"),
            Cell::new("Category"),
            Cell::new("Tags"),
        ]);
        for key in &results {
            let Some(record) = collection.get(key) else {
                continue;
            };
            let tags = if record.tags.is_empty() {
                "No tags".to_string()
            } else {
                record.tags.join(", ")
            };
            table.add_row(vec![
                Cell::new(placeholder(key)),
                Cell::new(or_default(&record.description, "No description")),
                Cell::new(or_default(&record.category, imagepack_core::UNCATEGORIZED)),
                Cell::new(tags),
            ]);
        }
        println!("{table}");
    } else {
        for key in &results {
            println!("  {}", placeholder(key));
        }
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("Usage in HTML template:");
    for key in &results {
        let alt = collection
            .get(key)
            .map(|r| or_default(&r.description, key))
            .unwrap_or(key.as_str());
        println!("  <img src=\"{}\" alt=\"{}\">", placeholder(key), alt);
    }
    println!("{}", "=".repeat(60));
    Ok(())
}

pub fn list_categories(collection: &Collection) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![Cell::new("Category"), Cell::new("Images")]);
    for (category, count) in query::category_counts(collection) {
        table.add_row(vec![Cell::new(category), Cell::new(count)]);
    }
    println!("{table}");
}

pub fn list_tags(collection: &Collection) {
    let tags = query::all_tags(collection);
    println!("Available tags ({}):", tags.len());
    for tag in &tags {
        println!("  {tag}");
    }
}

fn describe(filter: &Filter) -> String {
    match filter {
        Filter::Tags(tags) => format!("for images with tags: {}", tags.join(", ")),
        Filter::Description(term) => format!("descriptions for: {term}"),
        Filter::Category(category) => format!("category: {category}"),
        Filter::Keyword(term) => format!("all fields for: {term}"),
        Filter::Key(term) => format!("keys for: {term}"),
    }
}

fn placeholder(key: &str) -> String {
    format!("{{{{{key}}}}}")
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_require_a_criterion() {
        assert!(filters(vec![], None, None, None, None).is_err());
    }

    #[test]
    fn test_filters_collects_all_flags() {
        let f = filters(
            vec!["woman".into(), "sitting".into()],
            None,
            Some("people".into()),
            None,
            Some("woman".into()),
        )
        .unwrap();
        assert_eq!(
            f,
            vec![
                Filter::Tags(vec!["woman".into(), "sitting".into()]),
                Filter::Category("people".into()),
                Filter::Key("woman".into()),
            ]
        );
    }

    #[test]
    fn test_placeholder_format() {
        assert_eq!(placeholder("cat"), "{{cat}}");
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default("", "fallback"), "fallback");
        assert_eq!(or_default("value", "fallback"), "value");
    }
}
