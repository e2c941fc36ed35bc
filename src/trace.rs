/// Per-step errors of a training run, indexed by step starting at 1.
///
/// Entries can only be appended, so step `k` always refers to the `k`-th
/// recorded error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorTrace {
    errors: Vec<f64>,
}

impl ErrorTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            errors: Vec::with_capacity(capacity),
        }
    }

    /// Record the error of the next step and return its step index.
    pub fn push(&mut self, error: f64) -> usize {
        self.errors.push(error);
        self.errors.len()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error recorded at `step`, `None` for step 0 or beyond the last step.
    pub fn get(&self, step: usize) -> Option<f64> {
        step.checked_sub(1).and_then(|i| self.errors.get(i)).copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.errors.last().copied()
    }

    /// `(step, error)` pairs in step order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.errors.iter().enumerate().map(|(i, &e)| (i + 1, e))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.errors
    }

    /// The `window` errors recorded right before the last one, newest first.
    /// `None` while fewer than `window` such errors exist.
    pub fn preceding(&self, window: usize) -> Option<impl Iterator<Item = f64> + '_> {
        let before_last = self.errors.len().checked_sub(1)?;
        let start = before_last.checked_sub(window)?;
        Some(self.errors[start..before_last].iter().rev().copied())
    }
}

impl FromIterator<f64> for ErrorTrace {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}
