//! The `promptgrade list` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use promptgrade_core::catalog::{Catalog, CatalogFilter};
use promptgrade_core::model::{Difficulty, ExerciseKind};
use promptgrade_core::parser::load_catalogs;

pub fn execute(
    catalog_path: PathBuf,
    category: Option<String>,
    technique: Option<String>,
    difficulty: Option<Difficulty>,
    options: bool,
) -> Result<()> {
    let catalogs = load_catalogs(&catalog_path)?;
    if options {
        print_options(&catalogs);
        return Ok(());
    }
    let filter = CatalogFilter {
        category,
        technique,
        difficulty,
    };

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Difficulty",
        "Category",
        "Technique",
        "Type",
    ]);

    let mut shown = 0usize;
    for catalog in &catalogs {
        for exercise in catalog.filter(&filter) {
            let kind = match exercise.kind {
                ExerciseKind::Normal => "normal",
                ExerciseKind::Competition => "competition",
            };
            table.add_row(vec![
                Cell::new(&exercise.id),
                Cell::new(&exercise.title),
                Cell::new(exercise.difficulty),
                Cell::new(&exercise.category),
                Cell::new(&exercise.technique),
                Cell::new(kind),
            ]);
            shown += 1;
        }
    }

    if shown == 0 {
        println!("No exercises match.");
        return Ok(());
    }

    println!("{table}");
    println!("{shown} exercise(s)");

    Ok(())
}

/// Print the filter values accepted by `--category` and `--technique`.
fn print_options(catalogs: &[Catalog]) {
    let merge = |values: fn(&Catalog) -> Vec<String>| -> Vec<String> {
        let distinct: BTreeSet<String> = catalogs.iter().flat_map(values).collect();
        std::iter::once("All".to_string()).chain(distinct).collect()
    };
    println!("Categories: {}", merge(Catalog::categories).join(", "));
    println!("Techniques: {}", merge(Catalog::techniques).join(", "));
}
