use super::model::Property;
use super::normalize::parse_optional_int;

// ---------------------------------------------------------------------------
// Filter state: raw text from the two filter inputs
// ---------------------------------------------------------------------------

/// What the user typed into the filter boxes.  Empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub bedrooms: String,
    pub zip_code: String,
}

impl FilterState {
    /// Bedroom count to match, or `None` when the input is empty or does not
    /// parse as a number.
    pub fn bedrooms(&self) -> Option<i64> {
        parse_optional_int(Some(self.bedrooms.as_str()))
    }

    /// ZIP code to match exactly, or `None` when the input is empty.
    pub fn zip_code(&self) -> Option<&str> {
        Some(self.zip_code.as_str()).filter(|z| !z.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.bedrooms().is_some() || self.zip_code().is_some()
    }

    pub fn clear(&mut self) {
        self.bedrooms.clear();
        self.zip_code.clear();
    }

    fn matches(&self, property: &Property) -> bool {
        if let Some(beds) = self.bedrooms() {
            if property.beds != beds {
                return false;
            }
        }
        if let Some(zip) = self.zip_code() {
            if property.zip_code != zip {
                return false;
            }
        }
        true
    }
}

/// Return the listings that pass every active filter, in input order.
pub fn apply_filters(listings: &[Property], filters: &FilterState) -> Vec<Property> {
    listings
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}
