use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a metadata column
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value mirroring common Pandas dtypes.
/// Row indices and unique-value sets are ordered, so `MetadataValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// Equality follows `Ord`: floats compare by `total_cmp`, so `NaN == NaN`
// and `0.0 != -0.0`, matching `Hash` on the bit pattern.
impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use MetadataValue::*;
        fn rank(v: &MetadataValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for MetadataValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            MetadataValue::String(s) => s.hash(state),
            MetadataValue::Integer(i) => i.hash(state),
            MetadataValue::Float(f) => f.to_bits().hash(state),
            MetadataValue::Bool(b) => b.hash(state),
            MetadataValue::Null => {}
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            // `{:?}` keeps the decimal point, so "1.0" reads back as a float.
            MetadataValue::Float(v) => write!(f, "{v:?}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => Ok(()),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl MetadataValue {
    /// Guess the type of a textual cell (CSV): int, float, bool, else string.
    /// Empty cells become `Null`.
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return MetadataValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return MetadataValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return MetadataValue::Float(f);
        }
        // Pandas writes booleans as `True` / `False`.
        match s {
            "true" | "True" | "TRUE" => MetadataValue::Bool(true),
            "false" | "False" | "FALSE" => MetadataValue::Bool(false),
            _ => MetadataValue::String(s.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the metadata table
// ---------------------------------------------------------------------------

/// A single sample (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Row label, unique within a table. Not necessarily contiguous.
    pub index: MetadataValue,
    /// Dynamic metadata columns: column_name → value.
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl Record {
    pub fn new(index: impl Into<MetadataValue>) -> Self {
        Record {
            index: index.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style column setter, handy for constructing tables in code.
    pub fn with(mut self, column: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&MetadataValue> {
        self.metadata.get(column)
    }
}

// ---------------------------------------------------------------------------
// MetadataTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The full table with pre-computed column indices.
///
/// Rows keep their source order; all positional APIs (`positions_where`,
/// `take`, `assign`) refer to that order.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    /// All records (rows).
    pub records: Vec<Record>,
    /// Name of the index column in the source file, if it had one.
    pub index_name: Option<String>,
    /// Ordered list of metadata column names (excludes the index).
    pub column_names: Vec<String>,
    /// For each metadata column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<MetadataValue>>,
}

impl MetadataTable {
    /// Build column indices from the given records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = MetadataTable {
            records,
            ..Default::default()
        };
        table.rebuild_columns();
        table
    }

    pub fn with_index_name(mut self, name: Option<String>) -> Self {
        self.index_name = name;
        self
    }

    /// Recompute `column_names` and `unique_values` after rows changed.
    pub fn rebuild_columns(&mut self) {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<MetadataValue>> = BTreeMap::new();

        for rec in &self.records {
            for (col, val) in &rec.metadata {
                column_names_set.insert(col.clone());
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        self.column_names = column_names_set.into_iter().collect();
        self.unique_values = unique_values;
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// Positions of records matching `pred`, in table order.
    pub fn positions_where<F>(&self, mut pred: F) -> Vec<usize>
    where
        F: FnMut(&Record) -> bool,
    {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, rec)| pred(rec))
            .map(|(i, _)| i)
            .collect()
    }

    /// Records at the given positions, in the order given.
    /// Out-of-range positions are skipped.
    pub fn take<'a>(&'a self, positions: &'a [usize]) -> impl Iterator<Item = &'a Record> + 'a {
        positions.iter().filter_map(move |&p| self.records.get(p))
    }

    /// Position of the record carrying `index`.
    pub fn index_position(&self, index: &MetadataValue) -> Option<usize> {
        self.records.iter().position(|r| &r.index == index)
    }

    /// Set `column` to `value` on every record.
    pub fn set_column(&mut self, column: &str, value: MetadataValue) {
        for rec in &mut self.records {
            rec.metadata.insert(column.to_string(), value.clone());
        }
        self.refresh_column(column);
    }

    /// Set `column` to `value` on the records at `positions`.
    pub fn assign(&mut self, column: &str, positions: &[usize], value: MetadataValue) {
        for &p in positions {
            if let Some(rec) = self.records.get_mut(p) {
                rec.metadata.insert(column.to_string(), value.clone());
            }
        }
        self.refresh_column(column);
    }

    /// Number of records per distinct value of `column`.
    /// Records without the column count as `Null`.
    pub fn value_counts(&self, column: &str) -> BTreeMap<MetadataValue, usize> {
        let mut counts = BTreeMap::new();
        for rec in &self.records {
            let value = rec.get(column).cloned().unwrap_or(MetadataValue::Null);
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
    }

    /// Whether every index value occurs once.
    pub fn has_unique_index(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.records.iter().all(|r| seen.insert(&r.index))
    }

    fn refresh_column(&mut self, column: &str) {
        let values: BTreeSet<MetadataValue> = self
            .records
            .iter()
            .filter_map(|r| r.get(column).cloned())
            .collect();
        if values.is_empty() {
            return;
        }
        if let Err(pos) = self.column_names.binary_search_by(|c| c.as_str().cmp(column)) {
            self.column_names.insert(pos, column.to_string());
        }
        self.unique_values.insert(column.to_string(), values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_table() -> MetadataTable {
        MetadataTable::from_records(vec![
            Record::new(10i64).with("station", "ABC").with("eligible", true),
            Record::new(20i64).with("station", "DEF").with("eligible", false),
            Record::new(35i64).with("station", "ABC").with("eligible", true),
        ])
    }

    #[test]
    fn test_columns_and_unique_values() {
        let table = sample_table();
        assert_eq!(table.column_names, vec!["eligible", "station"]);
        assert_eq!(table.unique_values["station"].len(), 2);
        assert!(table.has_column("eligible"));
        assert!(!table.has_column("split"));
    }

    #[test]
    fn test_positions_where_and_take() {
        let table = sample_table();
        let positions = table.positions_where(|r| r.get("eligible") == Some(&true.into()));
        assert_eq!(positions, vec![0, 2]);

        let indices: Vec<_> = table.take(&[2, 0, 7]).map(|r| r.index.clone()).collect();
        assert_eq!(indices, vec![MetadataValue::Integer(35), MetadataValue::Integer(10)]);
        assert_eq!(table.index_position(&MetadataValue::Integer(20)), Some(1));
    }

    #[test]
    fn test_set_column_then_assign() {
        let mut table = sample_table();
        table.set_column("split", "Undefined".into());
        table.assign("split", &[1], "train".into());

        let counts = table.value_counts("split");
        assert_eq!(counts[&MetadataValue::from("Undefined")], 2);
        assert_eq!(counts[&MetadataValue::from("train")], 1);
        assert_eq!(table.column_names, vec!["eligible", "split", "station"]);
        assert_eq!(table.unique_values["split"].len(), 2);
    }

    #[test]
    fn test_unique_index() {
        let mut table = sample_table();
        assert!(table.has_unique_index());
        table.records.push(Record::new(10i64));
        assert!(!table.has_unique_index());
    }

    #[test]
    fn test_guess_metadata_type() {
        assert_eq!(MetadataValue::guess(""), MetadataValue::Null);
        assert_eq!(MetadataValue::guess("42"), MetadataValue::Integer(42));
        assert_eq!(MetadataValue::guess("0.5"), MetadataValue::Float(0.5));
        assert_eq!(MetadataValue::guess("True"), MetadataValue::Bool(true));
        assert_eq!(MetadataValue::guess("false"), MetadataValue::Bool(false));
        assert_eq!(MetadataValue::guess("HHZ"), MetadataValue::from("HHZ"));
    }

    #[test]
    fn test_float_equality_agrees_with_ordering() {
        use std::cmp::Ordering;
        let nan = MetadataValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(nan.cmp(&nan), Ordering::Equal);

        let zero = MetadataValue::Float(0.0);
        let neg_zero = MetadataValue::Float(-0.0);
        assert_ne!(zero, neg_zero);
        assert_ne!(zero.cmp(&neg_zero), Ordering::Equal);
        assert_ne!(MetadataValue::Integer(1), MetadataValue::Float(1.0));

        let set: BTreeSet<_> = [nan.clone(), nan, zero, neg_zero].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_ordering_across_types() {
        let mut values = vec![
            MetadataValue::from("a"),
            MetadataValue::Float(1.5),
            MetadataValue::Null,
            MetadataValue::Integer(3),
            MetadataValue::Bool(true),
        ];
        values.sort();
        assert_eq!(values[0], MetadataValue::Null);
        assert_eq!(values[4], MetadataValue::from("a"));
    }
}
