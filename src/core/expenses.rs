use super::types::{BudgetItem, CategoryTotal, ExpenseSummary};

/// Groups items by category, keeping the order in which categories first appear.
pub fn aggregate_expenses(items: &[BudgetItem]) -> ExpenseSummary {
    let mut categories: Vec<CategoryTotal> = Vec::new();
    let mut total_minimum = 0.0;
    let mut total_preferred = 0.0;

    for item in items {
        let minimum = item.minimum_payment;
        let preferred = item.effective_preferred();
        total_minimum += minimum;
        total_preferred += preferred;

        match categories.iter_mut().find(|c| c.category == item.category) {
            Some(existing) => {
                existing.item_count += 1;
                existing.minimum += minimum;
                existing.preferred += preferred;
            }
            None => categories.push(CategoryTotal {
                category: item.category.clone(),
                item_count: 1,
                minimum,
                preferred,
                percent_of_minimum: 0.0,
            }),
        }
    }

    if total_minimum > 0.0 {
        for category in &mut categories {
            category.percent_of_minimum = category.minimum / total_minimum * 100.0;
        }
    }

    ExpenseSummary {
        categories,
        total_minimum,
        total_preferred,
    }
}

/// Label for one of the preset expense choices, or a title-cased form of the
/// id for anything custom.
pub fn category_display_name(category: &str, item_id: &str) -> String {
    let preset = match (category, item_id) {
        ("housing", "rent") => Some("Rent/Mortgage"),
        ("housing", "property_tax") => Some("Property Tax"),
        ("housing", "hoa") => Some("HOA Fee"),
        ("housing", "home_insurance") => Some("Home Insurance"),
        ("housing", "home_repairs") => Some("Home Repairs"),
        ("utility", "electricity") => Some("Electricity"),
        ("utility", "water") => Some("Water"),
        ("utility", "gas") => Some("Gas"),
        ("utility", "trash") => Some("Trash"),
        ("utility", "sewer") => Some("Sewer"),
        ("bill", "internet") => Some("Internet"),
        ("bill", "cell_phone") => Some("Cell Phone"),
        ("bill", "cable") => Some("Cable/Streaming"),
        ("bill", "insurance") => Some("Insurance"),
        ("bill", "gym") => Some("Gym Membership"),
        ("bill", "cloud_storage") => Some("Cloud Storage"),
        ("transport", "car_payment") => Some("Car Payment"),
        ("transport", "car_insurance") => Some("Car Insurance"),
        ("transport", "fuel") => Some("Fuel"),
        ("transport", "maintenance") => Some("Maintenance"),
        ("transport", "public_transport") => Some("Public Transportation"),
        _ => None,
    };
    match preset {
        Some(name) => name.to_string(),
        None => title_case(item_id),
    }
}

fn title_case(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
