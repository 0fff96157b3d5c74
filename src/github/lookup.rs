//! Typed outcome for API reads where "not found" is an expected answer.

/// The result of a read that may legitimately find nothing.
///
/// Transport and API failures other than 404 stay in the `Err` arm of the
/// surrounding `Result`, so callers only recover from `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_and_map() {
        let hit = Lookup::Found(2).map(|n| n * 10);
        assert!(hit.is_found());
        assert_eq!(hit.found(), Some(20));
    }

    #[test]
    fn test_not_found() {
        let miss: Lookup<u8> = None.into();
        assert!(!miss.is_found());
        assert_eq!(miss.found(), None);
    }
}
