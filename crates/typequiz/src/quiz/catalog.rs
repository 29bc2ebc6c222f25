use super::domain::ResultType;
use super::validation::MAX_AXES;

/// Read-only view over a quiz's result types, keyed by code.
#[derive(Debug, Clone, Copy)]
pub struct ResultCatalog<'a> {
    entries: &'a [ResultType],
}

impl<'a> ResultCatalog<'a> {
    pub fn new(entries: &'a [ResultType]) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, code: &str) -> Option<&'a ResultType> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    /// Codes of `axis_count` digits with no catalog entry, in ascending order.
    ///
    /// Counts above [`MAX_AXES`] are rejected by definition validation and
    /// yield no codes here.
    pub fn missing_codes(&self, axis_count: usize) -> Vec<String> {
        all_codes(axis_count)
            .into_iter()
            .filter(|code| self.lookup(code).is_none())
            .collect()
    }
}

pub(crate) fn all_codes(axis_count: usize) -> Vec<String> {
    if axis_count == 0 || axis_count > MAX_AXES {
        return Vec::new();
    }

    (0..1u32 << axis_count)
        .map(|bits| format!("{bits:0width$b}", width = axis_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_type(code: &str) -> ResultType {
        ResultType {
            code: code.to_string(),
            name: format!("type {code}"),
            tagline: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn enumerates_every_code_for_axis_count() {
        assert_eq!(all_codes(2), vec!["00", "01", "10", "11"]);
        assert_eq!(all_codes(4).len(), 16);
        assert!(all_codes(0).is_empty());
        assert!(all_codes(MAX_AXES + 1).is_empty());
    }

    #[test]
    fn lookup_matches_exact_code() {
        let entries = [result_type("01"), result_type("10")];
        let catalog = ResultCatalog::new(&entries);

        assert_eq!(catalog.lookup("10").map(|entry| entry.name.as_str()), Some("type 10"));
        assert!(catalog.lookup("1").is_none());
        assert!(catalog.lookup("11").is_none());
    }

    #[test]
    fn reports_uncovered_codes() {
        let entries = [result_type("00"), result_type("11"), result_type("999")];
        let catalog = ResultCatalog::new(&entries);

        assert_eq!(catalog.missing_codes(2), vec!["01", "10"]);
    }
}
