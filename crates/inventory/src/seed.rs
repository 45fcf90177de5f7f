//! Sample catalogue loaded into a freshly created inventory table.

use crate::item::NewItem;

const CATALOGUE: &[(&str, i64, i64, i64, &str)] = &[
    // Beverages
    ("Bottled Water (500ml)", 115, 15, 16, "Hydrating bottled water"),
    ("Soda (355ml)", 93, 8, 10, "Carbonated soft drink"),
    ("Energy Drink (250ml)", 12, 18, 8, "High-caffeine energy drink"),
    ("Coffee (hot, large)", 11, 14, 5, "Freshly brewed hot coffee"),
    ("Juice (200ml)", 11, 9, 5, "Fruit juice blend"),
    // Snacks
    ("Potato Chips (small)", 34, 16, 10, "Salted and crispy potato chips"),
    ("Candy Bar", 6, 19, 15, "Chocolate and candy bar"),
    ("Granola Bar", 3, 12, 8, "Healthy and nutritious granola bar"),
    ("Cookies (pack of 6)", 8, 8, 5, "Soft and chewy cookies"),
    ("Fruit Snack Pack", 5, 10, 8, "Assortment of dried fruits and nuts"),
    // Personal care
    ("Toothpaste", 1, 9, 5, "Minty toothpaste for oral hygiene"),
    ("Hand Sanitizer (small)", 2, 13, 8, "Small sanitizer bottle for on-the-go"),
    ("Pain Relievers (pack)", 1, 5, 3, "Over-the-counter pain relief medication"),
    ("Bandages (box)", 0, 10, 5, "Box of adhesive bandages for minor cuts"),
    ("Sunscreen (small)", 6, 5, 3, "Small bottle of sunscreen for sun protection"),
    // Household
    ("Batteries (AA, pack of 4)", 1, 5, 3, "Pack of 4 AA batteries"),
    ("Light Bulbs (LED, 2-pack)", 3, 3, 2, "Energy-efficient LED light bulbs"),
    ("Trash Bags (small, 10-pack)", 5, 10, 5, "Small trash bags for everyday use"),
    ("Paper Towels (single roll)", 3, 8, 5, "Single roll of paper towels"),
    ("Multi-Surface Cleaner", 2, 5, 3, "All-purpose cleaning spray"),
    // Others
    ("Lottery Tickets", 17, 20, 10, "Assorted lottery tickets"),
    ("Newspaper", 22, 20, 5, "Daily newspaper"),
];

/// Corner-store sample items, in insertion order.
pub fn sample_catalogue() -> Vec<NewItem> {
    CATALOGUE
        .iter()
        .map(|&(name, sold, on_hand, reorder, description)| {
            NewItem::named(name)
                .units_sold(sold)
                .units_on_hand(on_hand)
                .reorder_point(reorder)
                .description(description)
        })
        .collect()
}
