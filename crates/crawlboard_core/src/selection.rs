use std::collections::BTreeSet;

use crate::RecordId;

/// Cross-page set of selected record ids.
///
/// Membership is keyed only by id, so it survives paging, sorting,
/// filtering and background refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: BTreeSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn toggle(&mut self, id: RecordId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Page-scoped select-all: deselect the page if it is fully selected,
    /// otherwise select every id on it.
    pub fn toggle_all_on_page<'a, I>(&mut self, page_ids: I)
    where
        I: IntoIterator<Item = &'a RecordId>,
        I::IntoIter: Clone,
    {
        let page_ids = page_ids.into_iter();
        let all_selected = page_ids.clone().all(|id| self.ids.contains(id));
        if all_selected {
            for id in page_ids {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(page_ids.cloned());
        }
    }

    /// True iff the page is non-empty and every id on it is selected.
    pub fn all_selected_on_page<'a, I>(&self, page_ids: I) -> bool
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let mut seen_any = false;
        for id in page_ids {
            if !self.ids.contains(id) {
                return false;
            }
            seen_any = true;
        }
        seen_any
    }

    pub fn remove(&mut self, id: &RecordId) -> bool {
        self.ids.remove(id)
    }

    /// Drop ids for which `keep` returns false. Returns whether anything was dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&RecordId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Ordered snapshot of the selection, ascending by id.
    pub fn snapshot(&self) -> Vec<RecordId> {
        self.ids.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RecordId> {
        raw.iter().map(|id| RecordId::from(*id)).collect()
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::new();
        selection.toggle("a".into());
        assert!(selection.contains(&"a".into()));
        selection.toggle("a".into());
        assert!(selection.is_empty());
    }

    #[test]
    fn page_toggle_adds_missing_then_removes_page_only() {
        let mut selection = Selection::new();
        selection.toggle("other".into());
        selection.toggle("a".into());
        let page = ids(&["a", "b"]);

        selection.toggle_all_on_page(&page);
        assert_eq!(selection.snapshot(), ids(&["a", "b", "other"]));

        selection.toggle_all_on_page(&page);
        assert_eq!(selection.snapshot(), ids(&["other"]));
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let selection = Selection::new();
        assert!(!selection.all_selected_on_page(&Vec::<RecordId>::new()));
    }
}
