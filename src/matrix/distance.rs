//! Dense distance matrix with a name <-> index table.

use super::options::{MatrixOptions, SymmetryPolicy};
use crate::error::{Result, TspError};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Immutable `N x N` table of travel costs between named nodes.
///
/// Costs are kilometres. `cost(i, i)` is `+inf` (self-loops are not
/// edges) and a missing edge is `+inf` as well, so any tour using one
/// evaluates to `+inf`.
///
/// Nodes are addressed by dense index `0..N` in the hot search loops; the
/// name table is only consulted at the boundary.
///
/// # Examples
///
/// ```
/// use u_tsp::matrix::{DistanceMatrix, MatrixOptions};
///
/// let matrix = DistanceMatrix::from_rows(
///     &["A", "B", "C"],
///     &[
///         vec![0.0, 2.0, 4.0],
///         vec![2.0, 0.0, 3.0],
///         vec![4.0, 3.0, 0.0],
///     ],
///     MatrixOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(matrix.node_count(), 3);
/// assert_eq!(matrix.cost(0, 2), 4.0);
/// assert!(matrix.cost(1, 1).is_infinite());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    names: Vec<String>,
    index: HashMap<String, usize>,
    costs: Vec<f64>,
    symmetric: bool,
}

impl DistanceMatrix {
    /// Builds a matrix from a full table of rows, e.g. a routing-service
    /// response already converted to kilometres.
    ///
    /// The diagonal is ignored. `+inf` marks a missing edge; negative or
    /// NaN values are rejected.
    pub fn from_rows<S: AsRef<str>>(
        names: &[S],
        rows: &[Vec<f64>],
        options: MatrixOptions,
    ) -> Result<Self> {
        let mut builder = DistanceMatrixBuilder::new(names)?.with_options(options);
        let n = builder.names.len();
        if rows.len() != n {
            return Err(TspError::invalid_input(format!(
                "expected {n} rows, got {}",
                rows.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(TspError::invalid_input(format!(
                    "row '{}' has {} entries, expected {n}",
                    builder.names[i],
                    row.len()
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if i != j {
                    builder.edge_by_index(i, j, value)?;
                }
            }
        }
        builder.build()
    }

    /// Same as [`from_rows`](Self::from_rows) for a table in metres.
    pub fn from_meters<S: AsRef<str>>(
        names: &[S],
        rows: &[Vec<f64>],
        options: MatrixOptions,
    ) -> Result<Self> {
        let km: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.iter().map(|&m| m / 1000.0).collect())
            .collect();
        Self::from_rows(names, &km, options)
    }

    /// Builds a matrix from a `from -> to -> distance` mapping.
    ///
    /// Node order is the sorted set of every name appearing in the mapping.
    pub fn from_nested(
        mapping: &BTreeMap<String, BTreeMap<String, f64>>,
        options: MatrixOptions,
    ) -> Result<Self> {
        let mut names = BTreeSet::new();
        for (from, row) in mapping {
            names.insert(from.as_str());
            names.extend(row.keys().map(String::as_str));
        }
        let names: Vec<&str> = names.into_iter().collect();
        Self::from_nested_ordered(&names, mapping, options)
    }

    /// Builds a matrix from a nested mapping using an explicit node order.
    ///
    /// Every name in the mapping must appear in `names`. Names listed but
    /// absent from the mapping become isolated nodes.
    pub fn from_nested_ordered<S: AsRef<str>>(
        names: &[S],
        mapping: &BTreeMap<String, BTreeMap<String, f64>>,
        options: MatrixOptions,
    ) -> Result<Self> {
        let mut builder = DistanceMatrixBuilder::new(names)?.with_options(options);
        for (from, row) in mapping {
            for (to, &value) in row {
                if from != to {
                    builder.edge(from, to, value)?;
                }
            }
        }
        builder.build()
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Cost of the edge `from -> to`, `+inf` if missing or `from == to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from * self.names.len() + to]
    }

    /// Checked edge lookup.
    pub fn edge(&self, from: usize, to: usize) -> Result<f64> {
        self.check_node(from)?;
        self.check_node(to)?;
        let cost = self.cost(from, to);
        if cost.is_finite() {
            Ok(cost)
        } else {
            Err(TspError::MissingEdge {
                from: self.names[from].clone(),
                to: self.names[to].clone(),
            })
        }
    }

    /// Checked edge lookup by name.
    pub fn edge_by_name(&self, from: &str, to: &str) -> Result<f64> {
        self.edge(self.index_of(from)?, self.index_of(to)?)
    }

    #[inline]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.cost(from, to).is_finite()
    }

    /// Row of outgoing costs for `from`.
    #[inline]
    pub fn row(&self, from: usize) -> &[f64] {
        let n = self.names.len();
        &self.costs[from * n..(from + 1) * n]
    }

    /// Whether `cost(i, j) == cost(j, i)` for every pair.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Display name of a node.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Index of the node called `name`.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TspError::UnknownNode(name.to_string()))
    }

    /// Returns an error unless `index` names a node.
    pub fn check_node(&self, index: usize) -> Result<()> {
        if index < self.names.len() {
            Ok(())
        } else {
            Err(TspError::NodeOutOfRange {
                index,
                count: self.names.len(),
            })
        }
    }
}

/// Incremental constructor for [`DistanceMatrix`].
///
/// Entries are recorded per direction; [`build`](Self::build) reconciles
/// the two directions according to the [`SymmetryPolicy`].
///
/// # Examples
///
/// ```
/// use u_tsp::matrix::DistanceMatrixBuilder;
///
/// let mut builder = DistanceMatrixBuilder::new(&["Nairobi", "Nyeri"]).unwrap();
/// builder.edge("Nairobi", "Nyeri", 151.0).unwrap();
/// let matrix = builder.build().unwrap();
///
/// assert_eq!(matrix.cost(1, 0), 151.0);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrixBuilder {
    names: Vec<String>,
    index: HashMap<String, usize>,
    entries: Vec<Option<f64>>,
    options: MatrixOptions,
}

impl DistanceMatrixBuilder {
    /// Starts a builder over the given node names. Names must be unique.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut index = HashMap::with_capacity(names.len());
        let mut owned = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref().to_string();
            if index.insert(name.clone(), i).is_some() {
                return Err(TspError::DuplicateNode(name));
            }
            owned.push(name);
        }
        let n = owned.len();
        Ok(Self {
            names: owned,
            index,
            entries: vec![None; n * n],
            options: MatrixOptions::default(),
        })
    }

    pub fn with_options(mut self, options: MatrixOptions) -> Self {
        self.options = options;
        self
    }

    /// Records the cost of `from -> to`.
    pub fn edge(&mut self, from: &str, to: &str, distance: f64) -> Result<&mut Self> {
        let i = self.lookup(from)?;
        let j = self.lookup(to)?;
        self.edge_by_index(i, j, distance)
    }

    /// Records the cost of `from -> to` by index. `+inf` leaves the
    /// direction undefined.
    pub fn edge_by_index(&mut self, from: usize, to: usize, distance: f64) -> Result<&mut Self> {
        let n = self.names.len();
        for index in [from, to] {
            if index >= n {
                return Err(TspError::NodeOutOfRange { index, count: n });
            }
        }
        if from == to {
            return Err(TspError::invalid_input(format!(
                "self-loop on '{}'",
                self.names[from]
            )));
        }
        if distance.is_nan() || distance < 0.0 {
            return Err(TspError::InvalidDistance {
                from: self.names[from].clone(),
                to: self.names[to].clone(),
                value: distance,
            });
        }
        self.entries[from * n + to] = if distance.is_finite() {
            Some(distance)
        } else {
            None
        };
        Ok(self)
    }

    /// Reconciles both directions of every pair and freezes the matrix.
    pub fn build(self) -> Result<DistanceMatrix> {
        self.options.validate()?;
        let n = self.names.len();
        let mut costs = vec![f64::INFINITY; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (forward, backward) = match (self.entries[i * n + j], self.entries[j * n + i]) {
                    (Some(f), Some(b)) => self.reconcile(i, j, f, b)?,
                    (Some(f), None) => (f, f),
                    (None, Some(b)) => (b, b),
                    (None, None) => {
                        if self.options.require_complete {
                            return Err(TspError::MissingEdge {
                                from: self.names[i].clone(),
                                to: self.names[j].clone(),
                            });
                        }
                        (f64::INFINITY, f64::INFINITY)
                    }
                };
                costs[i * n + j] = forward;
                costs[j * n + i] = backward;
            }
        }

        let symmetric = (0..n).all(|i| ((i + 1)..n).all(|j| costs[i * n + j] == costs[j * n + i]));

        Ok(DistanceMatrix {
            names: self.names,
            index: self.index,
            costs,
            symmetric,
        })
    }

    fn reconcile(&self, i: usize, j: usize, forward: f64, backward: f64) -> Result<(f64, f64)> {
        match self.options.symmetry {
            SymmetryPolicy::Strict { tolerance } => {
                if (forward - backward).abs() > tolerance {
                    Err(TspError::Asymmetry {
                        from: self.names[i].clone(),
                        to: self.names[j].clone(),
                        forward,
                        backward,
                    })
                } else {
                    Ok((forward, forward))
                }
            }
            SymmetryPolicy::Shorter => {
                if forward != backward {
                    log::warn!(
                        "matrix: asymmetric edge kept shorter direction from={} to={} forward={forward} backward={backward}",
                        self.names[i],
                        self.names[j]
                    );
                }
                let shorter = forward.min(backward);
                Ok((shorter, shorter))
            }
            SymmetryPolicy::Directed => Ok((forward, backward)),
        }
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TspError::UnknownNode(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(entries: &[(&str, &str, f64)]) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut map: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for &(from, to, d) in entries {
            map.entry(from.to_string())
                .or_default()
                .insert(to.to_string(), d);
        }
        map
    }

    #[test]
    fn test_from_rows_lookup() {
        let m = DistanceMatrix::from_rows(
            &["A", "B", "C"],
            &[
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 3.0],
                vec![2.0, 3.0, 0.0],
            ],
            MatrixOptions::default(),
        )
        .unwrap();

        assert_eq!(m.node_count(), 3);
        assert_eq!(m.cost(1, 2), 3.0);
        assert_eq!(m.cost(2, 1), 3.0);
        assert!(m.cost(0, 0).is_infinite());
        assert!(m.is_symmetric());
        assert_eq!(m.index_of("C").unwrap(), 2);
        assert_eq!(m.name(1), "B");
        assert_eq!(m.row(0)[2], 2.0);
    }

    #[test]
    fn test_from_rows_bad_shape() {
        let err = DistanceMatrix::from_rows(
            &["A", "B"],
            &[vec![0.0, 1.0], vec![1.0]],
            MatrixOptions::default(),
        );
        assert!(matches!(err, Err(TspError::InvalidInput(_))));

        let err = DistanceMatrix::from_rows(&["A", "B"], &[vec![0.0, 1.0]], MatrixOptions::default());
        assert!(matches!(err, Err(TspError::InvalidInput(_))));
    }

    #[test]
    fn test_from_meters_converts_to_km() {
        let m = DistanceMatrix::from_meters(
            &["A", "B"],
            &[vec![0.0, 151_000.0], vec![151_000.0, 0.0]],
            MatrixOptions::default(),
        )
        .unwrap();
        assert!((m.cost(0, 1) - 151.0).abs() < 1e-10);
    }

    #[test]
    fn test_one_direction_fills_both() {
        let map = nested(&[("A", "B", 4.0), ("C", "A", 2.0)]);
        let m = DistanceMatrix::from_nested(&map, MatrixOptions::default()).unwrap();

        assert_eq!(m.names(), &["A", "B", "C"]);
        assert_eq!(m.cost(1, 0), 4.0);
        assert_eq!(m.cost(0, 2), 2.0);
        assert!(m.cost(1, 2).is_infinite());
        assert!(!m.has_edge(1, 2));
    }

    #[test]
    fn test_missing_edge_checked_lookup() {
        let map = nested(&[("A", "B", 4.0), ("A", "C", 2.0)]);
        let m = DistanceMatrix::from_nested(&map, MatrixOptions::default()).unwrap();

        assert_eq!(m.edge_by_name("B", "A").unwrap(), 4.0);
        match m.edge_by_name("B", "C") {
            Err(TspError::MissingEdge { from, to }) => {
                assert_eq!(from, "B");
                assert_eq!(to, "C");
            }
            other => panic!("expected MissingEdge, got {other:?}"),
        }
        assert!(matches!(m.edge(0, 7), Err(TspError::NodeOutOfRange { .. })));
        assert!(matches!(m.index_of("Z"), Err(TspError::UnknownNode(_))));
    }

    #[test]
    fn test_require_complete_rejects_missing() {
        let map = nested(&[("A", "B", 4.0), ("A", "C", 2.0)]);
        let options = MatrixOptions::default().with_require_complete(true);
        let err = DistanceMatrix::from_nested(&map, options);
        assert!(matches!(err, Err(TspError::MissingEdge { .. })));
    }

    #[test]
    fn test_strict_rejects_asymmetry() {
        let map = nested(&[("A", "B", 4.0), ("B", "A", 4.5)]);
        let err = DistanceMatrix::from_nested(&map, MatrixOptions::default());
        assert!(matches!(err, Err(TspError::Asymmetry { .. })));

        let loose = MatrixOptions::default().with_symmetry(SymmetryPolicy::Strict { tolerance: 1.0 });
        let m = DistanceMatrix::from_nested(&map, loose).unwrap();
        assert_eq!(m.cost(1, 0), 4.0);
    }

    #[test]
    fn test_shorter_policy() {
        let map = nested(&[("A", "B", 4.0), ("B", "A", 3.0)]);
        let options = MatrixOptions::default().with_symmetry(SymmetryPolicy::Shorter);
        let m = DistanceMatrix::from_nested(&map, options).unwrap();
        assert_eq!(m.cost(0, 1), 3.0);
        assert_eq!(m.cost(1, 0), 3.0);
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_directed_policy_keeps_both() {
        let map = nested(&[("A", "B", 4.0), ("B", "A", 3.0)]);
        let options = MatrixOptions::default().with_symmetry(SymmetryPolicy::Directed);
        let m = DistanceMatrix::from_nested(&map, options).unwrap();
        assert_eq!(m.cost(0, 1), 4.0);
        assert_eq!(m.cost(1, 0), 3.0);
        assert!(!m.is_symmetric());
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        assert!(matches!(
            DistanceMatrixBuilder::new(&["A", "A"]),
            Err(TspError::DuplicateNode(_))
        ));

        let mut b = DistanceMatrixBuilder::new(&["A", "B"]).unwrap();
        assert!(matches!(
            b.edge("A", "B", -1.0),
            Err(TspError::InvalidDistance { .. })
        ));
        assert!(matches!(
            b.edge("A", "B", f64::NAN),
            Err(TspError::InvalidDistance { .. })
        ));
        assert!(matches!(b.edge("A", "A", 1.0), Err(TspError::InvalidInput(_))));
        assert!(matches!(b.edge("A", "Q", 1.0), Err(TspError::UnknownNode(_))));
    }

    #[test]
    fn test_ordered_mapping_rejects_unknown_names() {
        let map = nested(&[("A", "B", 4.0), ("A", "Z", 1.0)]);
        let err = DistanceMatrix::from_nested_ordered(&["A", "B"], &map, MatrixOptions::default());
        assert!(matches!(err, Err(TspError::UnknownNode(name)) if name == "Z"));
    }
}
