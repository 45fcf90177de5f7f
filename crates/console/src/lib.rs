//! Text rendering for the `stockroom` console.

use std::fmt::Write as _;

use stockroom_core::Entity;
use stockroom_inventory::{ApplyReport, ReorderAlert, Snapshot, best_sellers};

/// Inventory table, low-stock alert and best sellers.
pub fn render_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:>4}  {:<30} {:>6} {:>6} {:>8}  {}",
        "id", "item", "sold", "left", "reorder", "description"
    );
    for item in snapshot {
        let _ = writeln!(
            out,
            "{:>4}  {:<30} {:>6} {:>6} {:>8}  {}",
            item.id(),
            item.name(),
            item.units_sold(),
            item.units_on_hand(),
            item.reorder_point(),
            item.description()
        );
    }

    out.push('\n');
    match ReorderAlert::from_snapshot(snapshot) {
        Some(alert) => {
            let _ = writeln!(out, "{alert}");
        }
        None => out.push_str("Stock levels are fine.\n"),
    }

    out.push_str("\nBest sellers:\n");
    for (rank, item) in best_sellers(snapshot).into_iter().take(5).enumerate() {
        let _ = writeln!(out, "{:>2}. {} ({} sold)", rank + 1, item.name(), item.units_sold());
    }

    out
}

/// One line per skipped row, or `None` when everything applied.
pub fn render_rejections(report: &ApplyReport) -> Option<String> {
    if report.is_clean() {
        return None;
    }
    let lines: Vec<_> = report
        .rejected
        .iter()
        .map(|r| format!("skipped {}: {}", r.row, r.error))
        .collect();
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::ItemId;
    use stockroom_inventory::{Changeset, NewItem};

    fn snapshot() -> Snapshot {
        let changeset = Changeset::new()
            .add(NewItem::named("Soda").units_sold(93).units_on_hand(8).reorder_point(10))
            .add(NewItem::named("Newspaper").units_sold(22).units_on_hand(20).reorder_point(5));
        Snapshot::default().plan(&changeset, ItemId::new(1)).snapshot
    }

    #[test]
    fn report_contains_alert_and_ranking() {
        let report = render_report(&snapshot());
        assert!(report.contains("We're running dangerously low on the items below:\n* Soda"));
        assert!(!report.contains("* Newspaper"));
        assert!(report.contains(" 1. Soda (93 sold)"));
        assert!(report.contains(" 2. Newspaper (22 sold)"));
    }

    #[test]
    fn rejections_are_listed() {
        let plan = snapshot().plan(&Changeset::new().delete(ItemId::new(9)), ItemId::new(3));
        assert_eq!(
            render_rejections(&plan.report).as_deref(),
            Some("skipped item 9: item 9 not found")
        );
        assert!(render_rejections(&ApplyReport::default()).is_none());
    }
}
