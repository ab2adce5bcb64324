//! Grid placement records and the canonical form used to decide whether a
//! layout actually changed.

use serde::{Deserialize, Serialize};

/// Reserved id for a panel slot that was just dropped on the grid and has
/// not been configured yet. Entries carrying it are rendered as an empty
/// card and never reach the store.
pub const PLACEHOLDER_PANEL_ID: &str = "empty";

/// Grid placement for one panel: position and size in cells, plus whatever
/// drag metadata the grid surface happens to set mid-interaction.
///
/// Identity is `id`. The collection order is insertion order; it carries no
/// meaning beyond keeping comparisons stable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
}

impl LayoutEntry {
    pub fn new(id: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            moved: None,
            pinned: None,
            min_w: None,
            min_h: None,
        }
    }

    /// A not-yet-configured panel slot at the given position.
    pub fn placeholder(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self::new(PLACEHOLDER_PANEL_ID, x, y, w, h)
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_PANEL_ID
    }

    fn canonical(&self) -> CanonicalEntry {
        let mut extras = Vec::new();
        if let Some(moved) = self.moved {
            extras.push(("moved", u64::from(moved)));
        }
        if let Some(pinned) = self.pinned {
            extras.push(("pinned", u64::from(pinned)));
        }
        if let Some(min_w) = self.min_w {
            extras.push(("min_w", u64::from(min_w)));
        }
        if let Some(min_h) = self.min_h {
            extras.push(("min_h", u64::from(min_h)));
        }
        CanonicalEntry {
            id: self.id.clone(),
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            extras,
        }
    }
}

/// One entry of the comparable form: the required placement fields plus only
/// the metadata fields that are actually set. Used for comparison only,
/// never persisted, never rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalEntry {
    id: String,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    extras: Vec<(&'static str, u64)>,
}

/// Strip unset metadata from every entry. Pure and total: preserves length
/// and order, empty input yields empty output.
pub fn normalize_layout(layout: &[LayoutEntry]) -> Vec<CanonicalEntry> {
    layout.iter().map(LayoutEntry::canonical).collect()
}

/// True iff the normalized forms are structurally equal. Order-sensitive:
/// the grid surface keeps entry order stable across drags and resizes, so a
/// reordering without value changes is not expected from normal interaction.
/// All compared fields are integers; there is no tolerance to apply.
pub fn layouts_equal(a: &[LayoutEntry], b: &[LayoutEntry]) -> bool {
    normalize_layout(a) == normalize_layout(b)
}

/// The layout as submitted to the store: placeholder slots removed.
pub fn filter_placeholders(layout: &[LayoutEntry]) -> Vec<LayoutEntry> {
    layout
        .iter()
        .filter(|entry| !entry.is_placeholder())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_preserves_length_and_order() {
        let layout = vec![
            LayoutEntry::new("b", 4, 0, 4, 2),
            LayoutEntry::new("a", 0, 0, 4, 2),
        ];
        let canonical = normalize_layout(&layout);
        assert_eq!(canonical.len(), 2);
        assert_eq!(canonical[0].id, "b");
        assert_eq!(canonical[1].id, "a");
        assert!(normalize_layout(&[]).is_empty());
    }

    #[test]
    fn unset_metadata_does_not_count_as_a_change() {
        let plain = vec![LayoutEntry::new("w1", 0, 0, 4, 2)];
        let mut with_unset = plain.clone();
        with_unset[0].moved = None;
        with_unset[0].min_w = None;
        assert!(layouts_equal(&plain, &with_unset));
    }

    #[test]
    fn set_metadata_is_material() {
        let plain = vec![LayoutEntry::new("w1", 0, 0, 4, 2)];
        let mut flagged = plain.clone();
        flagged[0].moved = Some(true);
        assert!(!layouts_equal(&plain, &flagged));

        let mut unmoved = plain.clone();
        unmoved[0].moved = Some(false);
        assert!(!layouts_equal(&plain, &unmoved));
        assert!(!layouts_equal(&flagged, &unmoved));
    }

    #[test]
    fn position_changes_are_material() {
        let before = vec![LayoutEntry::new("w1", 0, 0, 4, 2)];
        let mut after = before.clone();
        after[0].x = 1;
        assert!(!layouts_equal(&before, &after));
    }

    #[test]
    fn order_is_significant() {
        let a = LayoutEntry::new("a", 0, 0, 4, 2);
        let b = LayoutEntry::new("b", 4, 0, 4, 2);
        assert!(!layouts_equal(
            &[a.clone(), b.clone()],
            &[b, a]
        ));
    }

    #[test]
    fn placeholders_are_filtered_for_submission() {
        let layout = vec![
            LayoutEntry::new("w1", 0, 0, 4, 2),
            LayoutEntry::placeholder(4, 0, 4, 2),
            LayoutEntry::new("w2", 8, 0, 4, 2),
        ];
        let filtered = filter_placeholders(&layout);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|entry| !entry.is_placeholder()));
    }
}
