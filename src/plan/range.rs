//! # Predicate Range Analysis
//!
//! Converts boolean expressions over a single column into a canonical
//! list of disjoint, sorted intervals over the column's value domain,
//! augmented with sentinel bounds. The interval list is the currency of
//! access-path planning: the refiner intersects per-conjunct lists into
//! index scan ranges, and the cost model prices the result.
//!
//! ## Representation
//!
//! An interval is a pair of [`RangePoint`]s: a start and an end, each
//! carrying a value and an open/closed flag. A well-formed list has even
//! length and alternates start/end once sorted. The value domain is
//! totally ordered with `Null < MinNotNull < datums < Max`, so every
//! predicate shape reduces to point pairs:
//!
//! | Expression | Intervals |
//! |------------|-----------|
//! | `a = 1` | `[1 1]` |
//! | `a != 1` | `[-inf 1) (1 +inf]` |
//! | `a IS NULL` | `[<nil> <nil>]` |
//! | `a IS TRUE` | `[-inf 0) (0 +inf]` |
//! | `a LIKE 'ab%'` | `[ab ac)` |
//!
//! (`-inf` prints the smallest not-null sentinel, `+inf` the domain
//! supremum.)
//!
//! ## Merging
//!
//! `union` and `intersection` share one sweep: concatenate, sort with the
//! tie-break rules below, then count open ranges — a boundary is emitted
//! when the count crosses 1 (union) or 2 (intersection). Arbitrary
//! AND/OR combinations of comparisons reduce to these two operators.
//!
//! Ties at equal values order: closed start < open start, open end <
//! closed end, and an end precedes a start whenever at least one side is
//! open. That keeps `a = v` representable as `[v v]` and makes touching
//! open/closed boundaries cancel instead of overlap.
//!
//! ## Multi-column indexes
//!
//! [`build_index_ranges`] materializes the first key column;
//! [`append_index_ranges`] extends the result one column at a time, but
//! only through point ranges: over an index `(a, b)`, the predicate
//! `a > 1 AND b = 2` must stop at `a > 1` because rows inside that strict
//! interval are not contiguous in `b`.
//!
//! ## LIKE and encodings
//!
//! Prefix extraction is byte-wise: the escape byte takes the next byte
//! literally, `%` ends the prefix, `_` ends it and makes the start
//! exclusive. The upper bound increments the last byte with carry; a
//! bound that stops being valid UTF-8 travels as a blob and compares
//! bytewise, which preserves the interval under binary collation.

use crate::ast::{BinaryOp, Expr};
use crate::error::{Error, Result};
use crate::types::Value;
use bumpalo::Bump;
use smallvec::{smallvec, SmallVec};
use std::cmp::Ordering;
use std::fmt;

/// A bound value: the column domain plus the sentinels that make the
/// order total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue<'a> {
    Null,
    MinNotNull,
    Datum(Value<'a>),
    Max,
}

impl<'a> From<Value<'a>> for PointValue<'a> {
    fn from(v: Value<'a>) -> Self {
        if v.is_null() {
            PointValue::Null
        } else {
            PointValue::Datum(v)
        }
    }
}

impl<'a> PointValue<'a> {
    pub fn compare(&self, other: &PointValue) -> Result<Ordering> {
        use PointValue::*;
        Ok(match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (MinNotNull, MinNotNull) => Ordering::Equal,
            (MinNotNull, _) => Ordering::Less,
            (_, MinNotNull) => Ordering::Greater,
            (Max, Max) => Ordering::Equal,
            (Max, _) => Ordering::Greater,
            (_, Max) => Ordering::Less,
            (Datum(a), Datum(b)) => a.compare(b).ok_or(Error::Comparison)?,
        })
    }
}

impl fmt::Display for PointValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointValue::Null => write!(f, "<nil>"),
            PointValue::MinNotNull => write!(f, "-inf"),
            PointValue::Datum(v) => write!(f, "{v}"),
            PointValue::Max => write!(f, "+inf"),
        }
    }
}

/// One endpoint of an interval. `start` marks a lower bound, `excl` an
/// open one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePoint<'a> {
    pub value: PointValue<'a>,
    pub excl: bool,
    pub start: bool,
}

impl<'a> RangePoint<'a> {
    pub fn start(value: impl Into<PointValue<'a>>, excl: bool) -> Self {
        Self {
            value: value.into(),
            excl,
            start: true,
        }
    }

    pub fn end(value: impl Into<PointValue<'a>>, excl: bool) -> Self {
        Self {
            value: value.into(),
            excl,
            start: false,
        }
    }
}

impl fmt::Display for RangePoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start {
            write!(f, "{}{}", if self.excl { "(" } else { "[" }, self.value)
        } else {
            write!(f, "{}{}", self.value, if self.excl { ")" } else { "]" })
        }
    }
}

/// Renders a point list the way the tests read it: `[[1 1] (2 +inf]]`.
pub fn format_points(points: &[RangePoint]) -> String {
    let inner: Vec<String> = points.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner.join(" "))
}

/// The universal not-null range `[MinNotNull, Max]`; what unknown or
/// unsupported predicate shapes conservatively degrade to.
pub fn full_range<'a>() -> Vec<RangePoint<'a>> {
    vec![
        RangePoint::start(PointValue::MinNotNull, false),
        RangePoint::end(PointValue::Max, false),
    ]
}

/// Tie-break for points sharing a value. Closed starts sort before open
/// starts, open ends before closed ends, and an end meets a start
/// end-first when either is open so touching ranges stay disjoint.
fn equal_value_less(a: &RangePoint, b: &RangePoint) -> bool {
    if a.start && b.start {
        !a.excl && b.excl
    } else if a.start {
        !b.excl
    } else if b.start {
        a.excl || b.excl
    } else {
        a.excl && !b.excl
    }
}

/// Sorts points by value with the tie-break rules. Fails if any datum is
/// unordered (NaN).
pub fn sort_points(points: &mut [RangePoint]) -> Result<()> {
    for p in points.iter() {
        if let PointValue::Datum(Value::Float(f)) = p.value {
            if f.is_nan() {
                return Err(Error::Comparison);
            }
        }
    }
    // NaN is rejected above, so the comparator is total.
    points.sort_by(|a, b| {
        match a.value.compare(&b.value).unwrap_or(Ordering::Equal) {
            Ordering::Equal => {
                if equal_value_less(a, b) {
                    Ordering::Less
                } else if equal_value_less(b, a) {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
            ord => ord,
        }
    });
    Ok(())
}

/// Sweep-merges two point lists. The counter tracks how many ranges are
/// open; crossing `1` emits union boundaries, crossing `2` intersection
/// boundaries. The output is canonical: sorted, deduplicated, coalesced.
pub fn merge<'a>(
    mut a: Vec<RangePoint<'a>>,
    b: Vec<RangePoint<'a>>,
    union: bool,
) -> Result<Vec<RangePoint<'a>>> {
    a.extend(b);
    sort_points(&mut a)?;

    let required = if union { 1 } else { 2 };
    let mut merged = Vec::with_capacity(a.len());
    let mut in_range = 0i32;
    for p in a {
        if p.start {
            in_range += 1;
            if in_range == required {
                merged.push(p);
            }
        } else {
            if in_range == required {
                merged.push(p);
            }
            in_range -= 1;
        }
    }
    Ok(merged)
}

pub fn union<'a>(a: Vec<RangePoint<'a>>, b: Vec<RangePoint<'a>>) -> Result<Vec<RangePoint<'a>>> {
    merge(a, b, true)
}

pub fn intersection<'a>(
    a: Vec<RangePoint<'a>>,
    b: Vec<RangePoint<'a>>,
) -> Result<Vec<RangePoint<'a>>> {
    merge(a, b, false)
}

/// Folds an expression subtree over one column into its interval list.
///
/// The builder assumes the refiner's condition checker has already vetted
/// the shape: `NOT IN` and `NOT LIKE` reaching it is a bug upstream, and
/// anything it does not recognize degrades to [`full_range`] — the
/// residual filter re-checks those rows.
pub struct RangeBuilder<'a> {
    arena: &'a Bump,
}

impl<'a> RangeBuilder<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    pub fn build(&self, expr: &'a Expr<'a>) -> Result<Vec<RangePoint<'a>>> {
        match expr {
            Expr::Binary { op, left, right } => self.build_from_binary(*op, left, right),
            Expr::Paren(inner) => self.build(inner),
            Expr::InList { negated, list, .. } => {
                assert!(!negated, "NOT IN must be rejected before range building");
                self.build_from_in(list)
            }
            Expr::Between {
                negated, low, high, ..
            } => self.build_from_between(*negated, low, high),
            Expr::IsNull { negated, .. } => Ok(Self::build_from_is_null(*negated)),
            Expr::IsTruth {
                truth, negated, ..
            } => Ok(Self::build_from_is_truth(*truth, *negated)),
            Expr::Like {
                negated,
                pattern,
                escape,
                ..
            } => {
                assert!(!negated, "NOT LIKE must be rejected before range building");
                self.build_from_like(pattern, *escape)
            }
            // A bare column reference filters like `col IS TRUE`.
            Expr::Column(_) => Ok(Self::build_from_is_truth(true, false)),
            _ => Ok(full_range()),
        }
    }

    fn build_from_binary(
        &self,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Vec<RangePoint<'a>>> {
        if op == BinaryOp::Or {
            return union(self.build(left)?, self.build(right)?);
        }
        if op == BinaryOp::And {
            return intersection(self.build(left)?, self.build(right)?);
        }
        if !op.is_comparison() {
            return Ok(full_range());
        }

        // Normalize to `col OP value`; a literal on the left flips the
        // operator.
        let (op, value) = if let Some(v) = left.value() {
            (op.swapped(), v)
        } else if let Some(v) = right.value() {
            (op, v)
        } else {
            return Ok(full_range());
        };

        Ok(comparison_points(op, value))
    }

    fn build_from_in(&self, list: &'a [&'a Expr<'a>]) -> Result<Vec<RangePoint<'a>>> {
        let mut points = Vec::with_capacity(list.len() * 2);
        for item in list {
            let Some(v) = item.value() else {
                return Ok(full_range());
            };
            points.push(RangePoint::start(v, false));
            points.push(RangePoint::end(v, false));
        }
        // A union with nothing sorts and coalesces duplicates.
        union(points, Vec::new())
    }

    fn build_from_between(
        &self,
        negated: bool,
        low: &'a Expr<'a>,
        high: &'a Expr<'a>,
    ) -> Result<Vec<RangePoint<'a>>> {
        let (Some(low), Some(high)) = (low.value(), high.value()) else {
            return Ok(full_range());
        };
        if negated {
            union(
                comparison_points(BinaryOp::Lt, low),
                comparison_points(BinaryOp::Gt, high),
            )
        } else {
            // Intersecting the two comparisons lets the sweep normalize
            // inverted bounds to the empty range.
            intersection(
                comparison_points(BinaryOp::GtEq, low),
                comparison_points(BinaryOp::LtEq, high),
            )
        }
    }

    fn build_from_is_null(negated: bool) -> Vec<RangePoint<'a>> {
        if negated {
            full_range()
        } else {
            vec![
                RangePoint::start(PointValue::Null, false),
                RangePoint::end(PointValue::Null, false),
            ]
        }
    }

    fn build_from_is_truth(truth: bool, negated: bool) -> Vec<RangePoint<'a>> {
        let zero = Value::Int(0);
        if truth {
            if negated {
                // IS NOT TRUE: NULL or zero.
                vec![
                    RangePoint::start(PointValue::Null, false),
                    RangePoint::end(PointValue::Null, false),
                    RangePoint::start(zero, false),
                    RangePoint::end(zero, false),
                ]
            } else {
                // IS TRUE: any not-null value except zero.
                vec![
                    RangePoint::start(PointValue::MinNotNull, false),
                    RangePoint::end(zero, true),
                    RangePoint::start(zero, true),
                    RangePoint::end(PointValue::Max, false),
                ]
            }
        } else if negated {
            // IS NOT FALSE: anything but zero, NULL included.
            vec![
                RangePoint::start(PointValue::Null, false),
                RangePoint::end(zero, true),
                RangePoint::start(zero, true),
                RangePoint::end(PointValue::Max, false),
            ]
        } else {
            vec![RangePoint::start(zero, false), RangePoint::end(zero, false)]
        }
    }

    fn build_from_like(&self, pattern: &'a Expr<'a>, escape: u8) -> Result<Vec<RangePoint<'a>>> {
        let bytes: &[u8] = match pattern.value() {
            Some(Value::Text(s)) => s.as_bytes(),
            Some(Value::Bytes(b)) => b,
            _ => return Ok(full_range()),
        };

        let mut prefix: Vec<u8> = Vec::with_capacity(bytes.len());
        let mut exclude = false;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b == escape {
                i += 1;
                prefix.push(if i < bytes.len() { bytes[i] } else { escape });
                i += 1;
                continue;
            }
            if b == b'%' {
                break;
            }
            if b == b'_' {
                // The wildcard position rules out the bare prefix itself.
                exclude = true;
                break;
            }
            prefix.push(b);
            i += 1;
        }

        if prefix.is_empty() {
            return Ok(full_range());
        }

        let start = RangePoint::start(self.alloc_value(&prefix), exclude);

        // Increment the last byte with carry; a full carry-out means the
        // prefix was all 0xFF and every larger key matches.
        let mut high = prefix;
        let mut end = RangePoint::end(PointValue::Max, true);
        for i in (0..high.len()).rev() {
            high[i] = high[i].wrapping_add(1);
            if high[i] != 0 {
                end = RangePoint::end(self.alloc_value(&high), true);
                break;
            }
        }

        Ok(vec![start, end])
    }

    fn alloc_value(&self, bytes: &[u8]) -> Value<'a> {
        match std::str::from_utf8(bytes) {
            Ok(s) => Value::Text(self.arena.alloc_str(s)),
            Err(_) => Value::Bytes(self.arena.alloc_slice_copy(bytes)),
        }
    }
}

/// The point-pair table for a normalized `col OP value` comparison.
fn comparison_points(op: BinaryOp, value: Value<'_>) -> Vec<RangePoint<'_>> {
    match op {
        BinaryOp::Eq => vec![RangePoint::start(value, false), RangePoint::end(value, false)],
        BinaryOp::NotEq => vec![
            RangePoint::start(PointValue::MinNotNull, false),
            RangePoint::end(value, true),
            RangePoint::start(value, true),
            RangePoint::end(PointValue::Max, false),
        ],
        BinaryOp::Lt => vec![
            RangePoint::start(PointValue::MinNotNull, false),
            RangePoint::end(value, true),
        ],
        BinaryOp::LtEq => vec![
            RangePoint::start(PointValue::MinNotNull, false),
            RangePoint::end(value, false),
        ],
        BinaryOp::Gt => vec![
            RangePoint::start(value, true),
            RangePoint::end(PointValue::Max, false),
        ],
        BinaryOp::GtEq => vec![
            RangePoint::start(value, false),
            RangePoint::end(PointValue::Max, false),
        ],
        _ => unreachable!("comparison_points called with non-comparison operator"),
    }
}

/// A rectangle over a prefix of index key columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRange<'a> {
    pub low: SmallVec<[PointValue<'a>; 2]>,
    pub low_exclude: bool,
    pub high: SmallVec<[PointValue<'a>; 2]>,
    pub high_exclude: bool,
}

impl<'a> IndexRange<'a> {
    /// The universal range alternatives start from: every key, NULLs
    /// included.
    pub fn full() -> Self {
        Self {
            low: smallvec![PointValue::Null],
            low_exclude: false,
            high: smallvec![PointValue::Max],
            high_exclude: false,
        }
    }

    /// A point range pins every key column to a single value with both
    /// bounds closed. Only point ranges may be extended with a further
    /// column's ranges.
    pub fn is_point(&self) -> bool {
        if self.low.len() != self.high.len() || self.low_exclude || self.high_exclude {
            return false;
        }
        self.low
            .iter()
            .zip(self.high.iter())
            .all(|(l, h)| matches!(l.compare(h), Ok(Ordering::Equal)))
    }
}

impl fmt::Display for IndexRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let low: Vec<String> = self.low.iter().map(|v| v.to_string()).collect();
        let high: Vec<String> = self.high.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "{}{} {}{}",
            if self.low_exclude { "(" } else { "[" },
            low.join(" "),
            high.join(" "),
            if self.high_exclude { ")" } else { "]" }
        )
    }
}

/// Pairs a canonical point list into single-column index ranges. Later
/// key columns are added by [`append_index_ranges`].
pub fn build_index_ranges<'a>(points: &[RangePoint<'a>]) -> Vec<IndexRange<'a>> {
    debug_assert!(points.len() % 2 == 0, "odd range point list");
    points
        .chunks(2)
        .map(|pair| IndexRange {
            low: smallvec![pair[0].value],
            low_exclude: pair[0].excl,
            high: smallvec![pair[1].value],
            high_exclude: pair[1].excl,
        })
        .collect()
}

/// Extends each point range with the next column's intervals; non-point
/// ranges pass through unchanged, because rows inside a strict interval
/// are not contiguous in the following key column.
pub fn append_index_ranges<'a>(
    origin: Vec<IndexRange<'a>>,
    points: &[RangePoint<'a>],
) -> Vec<IndexRange<'a>> {
    let mut out = Vec::with_capacity(origin.len());
    for range in origin {
        if !range.is_point() {
            out.push(range);
            continue;
        }
        for pair in points.chunks(2) {
            let mut low = range.low.clone();
            low.push(pair[0].value);
            let mut high = range.high.clone();
            high.push(pair[1].value);
            out.push(IndexRange {
                low,
                low_exclude: pair[0].excl,
                high,
                high_exclude: pair[1].excl,
            });
        }
    }
    out
}

/// An inclusive interval of row handles for a table scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleRange {
    pub low: i64,
    pub high: i64,
}

impl HandleRange {
    pub fn full() -> Self {
        Self {
            low: i64::MIN,
            high: i64::MAX,
        }
    }

    pub fn is_full(&self) -> bool {
        self.low == i64::MIN && self.high == i64::MAX
    }
}

impl fmt::Display for HandleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.low, self.high)
    }
}

/// Converts a canonical point list over the integer handle column into
/// handle ranges; exclusive and fractional bounds round inward. Returns
/// None when a bound is not numeric — the caller then leaves the
/// condition in the filter.
pub fn handle_ranges_from_points(points: &[RangePoint]) -> Option<Vec<HandleRange>> {
    let mut out = Vec::with_capacity(points.len() / 2);
    for pair in points.chunks(2) {
        // The handle column is NOT NULL; NULL-bounded intervals match
        // nothing (a NULL high bound only arises from degenerate input
        // like `a < NULL`).
        if pair[0].value == PointValue::Null || pair[1].value == PointValue::Null {
            continue;
        }
        let low = handle_low_bound(&pair[0])?;
        let high = handle_high_bound(&pair[1])?;
        if low <= high {
            out.push(HandleRange { low, high });
        }
    }
    Some(out)
}

fn handle_low_bound(p: &RangePoint) -> Option<i64> {
    match p.value {
        PointValue::MinNotNull => Some(i64::MIN),
        PointValue::Max => Some(i64::MAX),
        PointValue::Datum(Value::Int(i)) => Some(if p.excl { i.saturating_add(1) } else { i }),
        PointValue::Datum(Value::Float(f)) if f.is_finite() => {
            let c = f.ceil();
            let i = c as i64;
            Some(if p.excl && c == f { i.saturating_add(1) } else { i })
        }
        _ => None,
    }
}

fn handle_high_bound(p: &RangePoint) -> Option<i64> {
    match p.value {
        PointValue::MinNotNull => Some(i64::MIN),
        PointValue::Max => Some(i64::MAX),
        PointValue::Datum(Value::Int(i)) => Some(if p.excl { i.saturating_sub(1) } else { i }),
        PointValue::Datum(Value::Float(f)) if f.is_finite() => {
            let c = f.floor();
            let i = c as i64;
            Some(if p.excl && c == f { i.saturating_sub(1) } else { i })
        }
        _ => None,
    }
}
