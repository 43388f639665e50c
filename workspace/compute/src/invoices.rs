use common::{InvoiceSortKey, SortOrder, UnknownSortValue};

/// Validated parameters of the invoice list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// Case-insensitive substring of the invoice number or vendor name
    pub search: Option<String>,
    /// Explicit ordering; `None` means newest invoice date first
    pub sort: Option<(InvoiceSortKey, SortOrder)>,
}

impl InvoiceQuery {
    /// Parses raw query-string values. Unknown sort keys or directions are rejected
    /// instead of being passed on to the database.
    pub fn parse(
        search: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Self, UnknownSortValue> {
        let order = match sort_order.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<SortOrder>()?,
            None => SortOrder::default(),
        };
        let sort = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some((raw.parse::<InvoiceSortKey>()?, order)),
            None => None,
        };

        Ok(Self {
            search: search.map(str::to_string),
            sort,
        })
    }

    /// The trimmed search term, if there is anything to search for.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}
