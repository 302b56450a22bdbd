/// "Show more" cursor over a sorted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    initial: usize,
    step: usize,
    visible: usize,
}

impl Pagination {
    pub fn new(initial: usize, step: usize) -> Self {
        Self {
            initial,
            step,
            visible: initial,
        }
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn show_more(&mut self) {
        self.visible = self.visible.saturating_add(self.step);
    }

    pub fn reset(&mut self) {
        self.visible = self.initial;
    }

    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..items.len().min(self.visible)]
    }

    pub fn has_more(&self, total: usize) -> bool {
        total > self.visible
    }

    pub fn remaining(&self, total: usize) -> usize {
        total.saturating_sub(self.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_more_and_reset() {
        let mut pagination = Pagination::new(12, 12);
        let items: Vec<u32> = (0..30).collect();

        assert_eq!(pagination.page(&items).len(), 12);
        assert!(pagination.has_more(items.len()));
        assert_eq!(pagination.remaining(items.len()), 18);

        pagination.show_more();
        pagination.show_more();
        assert_eq!(pagination.page(&items).len(), 30);
        assert!(!pagination.has_more(items.len()));
        assert_eq!(pagination.remaining(items.len()), 0);

        pagination.reset();
        assert_eq!(pagination.visible(), 12);
    }

    #[test]
    fn test_page_shorter_than_cursor() {
        let pagination = Pagination::new(20, 20);
        assert_eq!(pagination.page(&[1, 2, 3]), &[1, 2, 3]);
    }
}
