//! Titled sample series produced by one experiment run.

use serde::Serialize;

/// Ordered (x, y) pairs. Insertion order is the sample order and is kept as is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    title: String,
    points: Vec<(f64, f64)>,
}

impl Dataset {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            points: Vec::new(),
        }
    }

    pub fn add(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
