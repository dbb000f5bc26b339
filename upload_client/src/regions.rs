use std::collections::BTreeMap;

pub const UNKNOWN_REGION: &str = "Unknown State";

const REGIONS: [(&str, &str); 35] = [
    ("AN", "Andaman and Nicobar Islands"),
    ("AP", "Andhra Pradesh"),
    ("AR", "Arunachal Pradesh"),
    ("AS", "Assam"),
    ("BR", "Bihar"),
    ("CG", "Chhattisgarh"),
    ("CH", "Chandigarh"),
    ("DL", "Delhi"),
    ("DN", "Dadra and Nagar Haveli and Daman and Diu"),
    ("GA", "Goa"),
    ("GJ", "Gujarat"),
    ("HP", "Himachal Pradesh"),
    ("HR", "Haryana"),
    ("JH", "Jharkhand"),
    ("JK", "Jammu and Kashmir"),
    ("KA", "Karnataka"),
    ("KL", "Kerala"),
    ("LA", "Ladakh"),
    ("MH", "Maharashtra"),
    ("ML", "Meghalaya"),
    ("MN", "Manipur"),
    ("MP", "Madhya Pradesh"),
    ("MZ", "Mizoram"),
    ("NL", "Nagaland"),
    ("OD", "Odisha"),
    ("PB", "Punjab"),
    ("PY", "Puducherry"),
    ("RJ", "Rajasthan"),
    ("SK", "Sikkim"),
    ("TN", "Tamil Nadu"),
    ("TR", "Tripura"),
    ("TS", "Telangana"),
    ("UK", "Uttarakhand"),
    ("UP", "Uttar Pradesh"),
    ("WB", "West Bengal"),
];

/// Registration authority code to the state or union territory it belongs to.
/// Presentation only; the classifier never sees it.
#[derive(Debug, Clone)]
pub struct RegionTable {
    names: BTreeMap<&'static str, &'static str>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionTable {
    pub fn new() -> Self {
        Self {
            names: REGIONS.into_iter().collect(),
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&'static str> {
        self.names.get(code).copied()
    }

    pub fn display_name(&self, code: &str) -> &'static str {
        self.lookup(code).unwrap_or(UNKNOWN_REGION)
    }

    /// `"Maharashtra (MH)"`, or `"Unknown State (ZZ)"` for codes outside the table.
    pub fn describe(&self, code: &str) -> String {
        format!("{} ({})", self.display_name(code), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code() {
        let regions = RegionTable::new();

        assert_eq!(regions.lookup("MH"), Some("Maharashtra"));
        assert_eq!(regions.describe("MH"), "Maharashtra (MH)");
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let regions = RegionTable::new();

        assert_eq!(regions.lookup("ZZ"), None);
        assert_eq!(regions.display_name("ZZ"), "Unknown State");
        assert_eq!(regions.describe("ZZ"), "Unknown State (ZZ)");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(RegionTable::new().lookup("mh"), None);
    }

    #[test]
    fn test_table_has_one_entry_per_code() {
        let regions = RegionTable::new();

        assert_eq!(regions.names.len(), REGIONS.len());
        assert!(regions
            .names
            .keys()
            .all(|code| code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())));
    }
}
