//! Dataset handle returned by the Polars engine.

use std::sync::Arc;

use polars::prelude::DataFrame as PlDataFrame;

/// Thin, cheaply cloned wrapper around an eager Polars `DataFrame`.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub(crate) df: Arc<PlDataFrame>,
}

impl Dataset {
    pub fn from_polars(df: PlDataFrame) -> Self {
        Dataset { df: Arc::new(df) }
    }

    pub fn empty() -> Self {
        Self::from_polars(PlDataFrame::empty())
    }

    /// Borrow the underlying frame.
    pub fn as_polars(&self) -> &PlDataFrame {
        &self.df
    }

    /// Owned copy of the frame, for transforms.
    pub fn to_polars(&self) -> PlDataFrame {
        self.df.as_ref().clone()
    }

    /// Apply a Polars transform, producing a new dataset.
    pub fn transform<F, Err>(&self, f: F) -> Result<Dataset, Err>
    where
        F: FnOnce(PlDataFrame) -> Result<PlDataFrame, Err>,
    {
        f(self.to_polars()).map(Dataset::from_polars)
    }

    pub fn count(&self) -> usize {
        self.df.height()
    }

    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Same shape, column names, dtypes and values (nulls compare equal).
    pub fn frame_equal(&self, other: &Dataset) -> bool {
        self.df.dtypes() == other.df.dtypes() && self.df.equals_missing(&other.df)
    }
}

impl From<PlDataFrame> for Dataset {
    fn from(df: PlDataFrame) -> Self {
        Dataset::from_polars(df)
    }
}
