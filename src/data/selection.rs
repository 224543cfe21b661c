//! Channel selection for operations that process "all data channels".
use crate::data::{
    errors::{DataError, DataResult},
    series::{STP, TIME, TimeSeries},
};

/// Which channels an operation should process.
///
/// Variants
/// --------
/// - `Only(names)`: exactly these channels, in the given order. Every name
///   must exist in the series.
/// - `AllExcept(names)`: every channel of the series except these. Names
///   absent from the series are ignored.
///
/// The default is `AllExcept(["time", "stp"])`: the independent variable
/// and the step counter are never smoothed unless explicitly requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelection {
    Only(Vec<String>),
    AllExcept(Vec<String>),
}

impl Default for ChannelSelection {
    fn default() -> Self {
        ChannelSelection::AllExcept(vec![TIME.to_string(), STP.to_string()])
    }
}

impl ChannelSelection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChannelSelection::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn all_except<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChannelSelection::AllExcept(names.into_iter().map(Into::into).collect())
    }

    /// Resolve to concrete channel names present in `series`.
    ///
    /// Errors
    /// ------
    /// - `DataError::MissingChannel` if an `Only` name is absent.
    pub fn resolve(&self, series: &TimeSeries) -> DataResult<Vec<String>> {
        match self {
            ChannelSelection::Only(names) => {
                for name in names {
                    if !series.contains(name) {
                        return Err(DataError::MissingChannel { name: name.clone() });
                    }
                }
                Ok(names.clone())
            }
            ChannelSelection::AllExcept(excluded) => Ok(series
                .names()
                .filter(|name| !excluded.iter().any(|e| e == name))
                .map(str::to_string)
                .collect()),
        }
    }
}
