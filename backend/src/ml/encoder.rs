//! Label encoding of categorical columns
//!
//! Classes are the sorted distinct values seen at fit time and a value's code
//! is its position, so codes are stable for a fixed vocabulary regardless of
//! row order. There is no incremental update; refit to change the vocabulary.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn fit<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code))
            .collect();
        Self {
            column: column.to_string(),
            classes,
            index,
        }
    }

    /// Code of a fitted value. Values outside the vocabulary are an error,
    /// never a silent default.
    pub fn encode(&self, value: &str) -> AppResult<usize> {
        self.index
            .get(value.trim())
            .copied()
            .ok_or_else(|| AppError::UnseenCategory {
                column: self.column.clone(),
                value: value.trim().to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
