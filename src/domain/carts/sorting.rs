//! Saved cart sort codes.

use std::cmp::Ordering;

use crate::domain::carts::records::CartRecord;

/// Sort order selectable by paged saved-cart queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCode {
    #[default]
    ByDateModified,
    ByDateSaved,
    ByName,
    ByCode,
    ByTotal,
}

/// A single descending sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    ModifiedAt,
    SaveTime,
    Name,
    Code,
    TotalPrice,
}

impl SortKey {
    fn compare(self, left: &CartRecord, right: &CartRecord) -> Ordering {
        match self {
            Self::ModifiedAt => right.modified_at.cmp(&left.modified_at),
            Self::SaveTime => right.save_time.cmp(&left.save_time),
            Self::Name => right.name.cmp(&left.name),
            Self::Code => right.code.cmp(&left.code),
            Self::TotalPrice => right.total_price.cmp(&left.total_price),
        }
    }
}

impl SortCode {
    pub const BY_DATE_MODIFIED: &'static str = "byDateModified";
    pub const BY_DATE_SAVED: &'static str = "byDateSaved";
    pub const BY_NAME: &'static str = "byName";
    pub const BY_CODE: &'static str = "byCode";
    pub const BY_TOTAL: &'static str = "byTotal";

    /// Resolve a sort code, falling back to [`SortCode::ByDateModified`] for
    /// blank or unknown codes.
    pub fn parse(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(Self::BY_DATE_SAVED) => Self::ByDateSaved,
            Some(Self::BY_NAME) => Self::ByName,
            Some(Self::BY_CODE) => Self::ByCode,
            Some(Self::BY_TOTAL) => Self::ByTotal,
            _ => Self::ByDateModified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByDateModified => Self::BY_DATE_MODIFIED,
            Self::ByDateSaved => Self::BY_DATE_SAVED,
            Self::ByName => Self::BY_NAME,
            Self::ByCode => Self::BY_CODE,
            Self::ByTotal => Self::BY_TOTAL,
        }
    }

    fn keys(self) -> &'static [SortKey] {
        match self {
            Self::ByDateModified => &[SortKey::ModifiedAt],
            Self::ByDateSaved => &[SortKey::SaveTime],
            Self::ByName => &[SortKey::Name, SortKey::ModifiedAt],
            Self::ByCode => &[SortKey::Code, SortKey::ModifiedAt],
            Self::ByTotal => &[SortKey::TotalPrice, SortKey::ModifiedAt],
        }
    }

    /// Compare two carts key by key, stopping at the first non-equal key.
    pub fn compare(self, left: &CartRecord, right: &CartRecord) -> Ordering {
        self.keys()
            .iter()
            .map(|key| key.compare(left, right))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable in-place sort of `carts` by this code.
    pub fn sort(self, carts: &mut [CartRecord]) {
        carts.sort_by(|left, right| self.compare(left, right));
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use super::*;

    fn cart(code: &str, minutes: i64, total: u64) -> Result<CartRecord, jiff::Error> {
        let modified_at = Timestamp::UNIX_EPOCH.checked_add(SignedDuration::from_mins(minutes))?;
        let mut cart = CartRecord::new(code, "U1", "S1", modified_at);
        cart.total_price = total;

        Ok(cart)
    }

    fn codes(carts: &[CartRecord]) -> Vec<&str> {
        carts.iter().map(|cart| cart.code.as_str()).collect()
    }

    #[test]
    fn unknown_and_blank_codes_default_to_date_modified() {
        assert_eq!(SortCode::parse(None), SortCode::ByDateModified);
        assert_eq!(SortCode::parse(Some("")), SortCode::ByDateModified);
        assert_eq!(SortCode::parse(Some("byColour")), SortCode::ByDateModified);
        assert_eq!(SortCode::parse(Some("byTotal")), SortCode::ByTotal);
        assert_eq!(SortCode::parse(Some(SortCode::ByName.as_str())), SortCode::ByName);
    }

    #[test]
    fn by_total_breaks_ties_on_modified_desc() -> TestResult {
        let mut carts = vec![
            cart("A", 1, 500)?,
            cart("B", 2, 900)?,
            cart("C", 3, 500)?,
            cart("D", 4, 100)?,
        ];

        SortCode::ByTotal.sort(&mut carts);

        assert_eq!(codes(&carts), vec!["B", "C", "A", "D"]);

        Ok(())
    }

    #[test]
    fn by_name_sorts_descending() -> TestResult {
        let mut alpha = cart("A", 1, 0)?;
        alpha.name = Some("alpha".to_owned());
        let mut beta = cart("B", 2, 0)?;
        beta.name = Some("beta".to_owned());
        let mut other_alpha = cart("C", 3, 0)?;
        other_alpha.name = Some("alpha".to_owned());

        let mut carts = vec![alpha, beta, other_alpha];

        SortCode::ByName.sort(&mut carts);

        assert_eq!(codes(&carts), vec!["B", "C", "A"]);

        Ok(())
    }

    #[test]
    fn by_code_and_by_date_modified_sort_descending() -> TestResult {
        let mut carts = vec![cart("B", 3, 0)?, cart("C", 1, 0)?, cart("A", 2, 0)?];

        SortCode::ByCode.sort(&mut carts);
        assert_eq!(codes(&carts), vec!["C", "B", "A"]);

        SortCode::ByDateModified.sort(&mut carts);
        assert_eq!(codes(&carts), vec!["B", "A", "C"]);

        Ok(())
    }
}
