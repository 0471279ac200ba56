/// Page request handed to repositories
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        let (page, limit) = crate::shared::validate_pagination(Some(page), Some(limit));
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Paginated response wrapper
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit)
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Slice an already filtered and sorted collection.
    pub fn from_vec(all: Vec<T>, req: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(req.offset() as usize)
            .take(req.limit as usize)
            .collect();
        Self::new(items, total, req.page, req.limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_slices_requested_page() {
        let page = PaginatedResult::from_vec((1..=45).collect::<Vec<_>>(), PageRequest::new(3, 20));
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let page = PaginatedResult::<u8>::from_vec(vec![], PageRequest::default());
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
