//! Named, pre-rendered values sent in one submission.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::BuildHasher;

/// One batch of `(name, rendered value)` pairs, kept sorted by name.
///
/// Names are unique: inserting an existing name replaces its value. Values
/// are text rendered on the producer side, so the window never sees the
/// original types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct Snapshot {
    entries: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already rendered value.
    pub fn insert(&mut self, name: impl Into<String>, rendered: impl Into<String>) {
        self.entries.insert(name.into(), rendered.into());
    }

    /// Render `value` with its pretty `Debug` form and insert it.
    pub fn capture<T: Debug + ?Sized>(&mut self, name: impl Into<String>, value: &T) {
        self.insert(name, format!("{value:#?}"));
    }

    /// Builder form of [`Snapshot::capture`].
    pub fn with<T: Debug + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.capture(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the bindings whose name is listed in `names`.
    ///
    /// Listed names missing from `source` are skipped. Repeated names keep
    /// the last value seen.
    pub fn select<S, N>(source: &S, names: &[N]) -> Self
    where
        S: SnapshotSource + ?Sized,
        N: AsRef<str>,
    {
        source
            .bindings()
            .into_iter()
            .filter(|(name, _)| names.iter().any(|n| n.as_ref() == name))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (name, rendered) in iter {
            snapshot.insert(name, rendered);
        }
        snapshot
    }
}

impl From<Vec<(String, String)>> for Snapshot {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<Snapshot> for Vec<(String, String)> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.entries.into_iter().collect()
    }
}

/// A name -> value mapping the host program hands over for capture.
///
/// Rust has no portable way to reach into a caller's locals, so the caller
/// passes them in: a map, a list of pairs, or a [`Snapshot`] built with
/// [`crate::snapshot!`].
pub trait SnapshotSource {
    /// Every binding as `(name, rendered value)`, in source order.
    fn bindings(&self) -> Vec<(String, String)>;
}

impl SnapshotSource for Snapshot {
    fn bindings(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: AsRef<str>, V: Debug> SnapshotSource for BTreeMap<K, V> {
    fn bindings(&self) -> Vec<(String, String)> {
        render_pairs(self.iter())
    }
}

impl<K: AsRef<str>, V: Debug, S: BuildHasher> SnapshotSource for HashMap<K, V, S> {
    fn bindings(&self) -> Vec<(String, String)> {
        render_pairs(self.iter())
    }
}

impl<K: AsRef<str>, V: Debug> SnapshotSource for [(K, V)] {
    fn bindings(&self) -> Vec<(String, String)> {
        render_pairs(self.iter().map(|(k, v)| (k, v)))
    }
}

impl<K: AsRef<str>, V: Debug> SnapshotSource for Vec<(K, V)> {
    fn bindings(&self) -> Vec<(String, String)> {
        self.as_slice().bindings()
    }
}

fn render_pairs<'a, K, V, I>(pairs: I) -> Vec<(String, String)>
where
    K: AsRef<str> + 'a,
    V: Debug + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    pairs
        .map(|(k, v)| (k.as_ref().to_string(), format!("{v:#?}")))
        .collect()
}

/// Capture local variables by name into a [`Snapshot`].
///
/// ```
/// let (a, b) = (1, "two");
/// let snap = xtbug::snapshot!(a, b);
/// assert_eq!(snap.get("a"), Some("1"));
/// assert_eq!(snap.get("b"), Some("\"two\""));
/// ```
#[macro_export]
macro_rules! snapshot {
    ($($var:ident),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut snapshot = $crate::Snapshot::new();
        $( snapshot.capture(stringify!($var), &$var); )*
        snapshot
    }};
}
