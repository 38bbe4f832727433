//! Layout Sources
//!
//! Producers of placement records for the seeder: a recorded layout read
//! from a whitespace-separated text file, or a disk packed procedurally on
//! a triangular lattice.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::sampler::AttributeSampler;
use crate::components::Position;
use crate::error::SeedError;

/// Coordinates closer than this to an axis are not mirrored across it
pub const AXIS_EPSILON: f64 = 0.01;

/// Lattice spacing as a fraction of the cell diameter.
/// Slight overlap keeps the initial packing from over-repelling.
pub const SPACING_FACTOR: f64 = 0.95;

/// Largest packed cluster accepted at setup, in cells
pub const MAX_PACKED_CELLS: f64 = 1.0e7;

/// One row of seed input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRecord {
    pub position: Position,
    pub type_tag: i64,
    /// Sampled value for custom data slot 0, if the source provides one
    pub attribute: Option<f64>,
}

/// Which kind of source produced a seeding pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Recorded,
    Packed,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Recorded => "recorded",
            LayoutKind::Packed => "packed",
        }
    }
}

/// What to do with a recorded row that does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Stop reading; rows before it are still seeded
    #[default]
    Stop,
    /// Fail the whole seeding pass
    Reject,
}

/// The first recorded row that failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// 1-based line number
    pub line: usize,
    pub content: String,
}

/// A finite, one-pass sequence of placement records
pub trait LayoutSource {
    /// Next record, `Ok(None)` once the source is exhausted
    fn next_record(&mut self) -> Result<Option<PlacementRecord>, SeedError>;

    fn kind(&self) -> LayoutKind;

    /// Set when a recorded layout stopped early on a malformed row
    fn truncated_at(&self) -> Option<&MalformedRecord> {
        None
    }
}

/// Parse `x y z type_tag`. Exactly four fields; the tag must be an integer.
pub fn parse_record(line: &str) -> Option<PlacementRecord> {
    let mut fields = line.split_whitespace();
    let x: f64 = fields.next()?.parse().ok()?;
    let y: f64 = fields.next()?.parse().ok()?;
    let z: f64 = fields.next()?.parse().ok()?;
    let type_tag: i64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return None;
    }
    Some(PlacementRecord {
        position: Position::new(x, y, z),
        type_tag,
        attribute: None,
    })
}

/// Replays a layout recorded as text, one `x y z type_tag` row per line
pub struct RecordedLayout<B: BufRead> {
    lines: std::io::Split<B>,
    source: PathBuf,
    policy: MalformedPolicy,
    line: usize,
    done: bool,
    truncated: Option<MalformedRecord>,
}

impl RecordedLayout<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, policy: MalformedPolicy) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SeedError::LayoutIo {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Reading cell layout from {}", path.display());
        Ok(Self::with_source(BufReader::new(file), path, policy))
    }
}

impl<B: BufRead> RecordedLayout<B> {
    pub fn from_reader(reader: B, policy: MalformedPolicy) -> Self {
        Self::with_source(reader, "<reader>", policy)
    }

    fn with_source(reader: B, source: impl Into<PathBuf>, policy: MalformedPolicy) -> Self {
        Self {
            lines: reader.split(b'\n'),
            source: source.into(),
            policy,
            line: 0,
            done: false,
            truncated: None,
        }
    }
}

impl<B: BufRead> LayoutSource for RecordedLayout<B> {
    fn next_record(&mut self) -> Result<Option<PlacementRecord>, SeedError> {
        while !self.done {
            let Some(line) = self.lines.next() else {
                self.done = true;
                break;
            };
            self.line += 1;
            let mut bytes = line.map_err(|source| SeedError::LayoutIo {
                path: self.source.clone(),
                source,
            })?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }

            // Non-UTF-8 rows are malformed like any other unparseable row
            let line = match String::from_utf8(bytes) {
                Ok(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    if let Some(record) = parse_record(&text) {
                        return Ok(Some(record));
                    }
                    text
                }
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            };

            self.done = true;
            match self.policy {
                MalformedPolicy::Reject => {
                    return Err(SeedError::MalformedRecord {
                        line: self.line,
                        content: line,
                    });
                }
                MalformedPolicy::Stop => {
                    tracing::warn!(
                        "Stopped reading {} at malformed line {}: {:?}",
                        self.source.display(),
                        self.line,
                        line
                    );
                    self.truncated = Some(MalformedRecord {
                        line: self.line,
                        content: line,
                    });
                }
            }
        }
        Ok(None)
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Recorded
    }

    fn truncated_at(&self) -> Option<&MalformedRecord> {
        self.truncated.as_ref()
    }
}

/// Center-to-center distance for a packed cluster of cells of `cell_radius`
pub fn cell_spacing(cell_radius: f64) -> f64 {
    SPACING_FACTOR * 2.0 * cell_radius
}

/// Approximate lattice size for a disk: its area over one cell's share,
/// `pi * R^2 / (s^2 * sqrt(3) / 2)`
pub fn estimated_lattice_size(cluster_radius: f64, spacing: f64) -> f64 {
    let cell_area = spacing * spacing * 3.0_f64.sqrt() / 2.0;
    std::f64::consts::PI * cluster_radius * cluster_radius / cell_area
}

/// Triangular-lattice points filling a disk, mirrored into all four quadrants.
///
/// Rows start at y = 0 and step by `spacing * sqrt(3) / 2`; odd rows are
/// shifted by half a spacing. Points on an axis are not mirrored across it.
pub fn lattice_positions(cluster_radius: f64, spacing: f64) -> Vec<Position> {
    let mut positions = Vec::new();
    if spacing.is_nan() || spacing <= 0.0 || cluster_radius.is_nan() || cluster_radius <= 0.0 {
        return positions;
    }
    // The row loop cannot advance past a radius whose square overflows
    if !(cluster_radius * cluster_radius).is_finite() {
        return positions;
    }

    let row_step = spacing * 3.0_f64.sqrt() / 2.0;
    let mut y = 0.0;
    let mut row = 0u64;

    while y < cluster_radius {
        let mut x = if row % 2 == 1 { 0.5 * spacing } else { 0.0 };
        let x_outer = (cluster_radius * cluster_radius - y * y).sqrt();

        while x < x_outer {
            positions.push(Position::new(x, y, 0.0));
            if y.abs() > AXIS_EPSILON {
                positions.push(Position::new(x, -y, 0.0));
            }
            if x.abs() > AXIS_EPSILON {
                positions.push(Position::new(-x, y, 0.0));
                if y.abs() > AXIS_EPSILON {
                    positions.push(Position::new(-x, -y, 0.0));
                }
            }
            x += spacing;
        }

        y += row_step;
        row += 1;
    }

    positions
}

/// Procedurally packed disk of cells with one sampled attribute each
pub struct PackedCluster<'r, R: Rng + ?Sized> {
    positions: std::vec::IntoIter<Position>,
    type_tag: i64,
    sampler: AttributeSampler,
    rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> PackedCluster<'r, R> {
    pub fn new(
        cluster_radius: f64,
        cell_radius: f64,
        type_tag: i64,
        sampler: AttributeSampler,
        rng: &'r mut R,
    ) -> Self {
        let positions = lattice_positions(cluster_radius, cell_spacing(cell_radius));
        tracing::debug!(
            "Packed cluster of radius {} holds {} lattice points",
            cluster_radius,
            positions.len()
        );
        Self {
            positions: positions.into_iter(),
            type_tag,
            sampler,
            rng,
        }
    }

    /// Records not yet produced
    pub fn remaining(&self) -> usize {
        self.positions.len()
    }
}

impl<'r, R: Rng + ?Sized> LayoutSource for PackedCluster<'r, R> {
    fn next_record(&mut self) -> Result<Option<PlacementRecord>, SeedError> {
        Ok(self.positions.next().map(|position| PlacementRecord {
            position,
            type_tag: self.type_tag,
            attribute: Some(self.sampler.sample(&mut *self.rng)),
        }))
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::sampler::SamplingSpec;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn drain<L: LayoutSource>(layout: &mut L) -> Vec<PlacementRecord> {
        let mut records = Vec::new();
        while let Some(record) = layout.next_record().unwrap() {
            records.push(record);
        }
        records
    }

    #[test]
    fn test_parse_record_fields() {
        let record = parse_record("1.5 -2 3e1 1").unwrap();
        assert_eq!(record.position, Position::new(1.5, -2.0, 30.0));
        assert_eq!(record.type_tag, 1);
        assert!(record.attribute.is_none());

        assert!(parse_record("1 2 3").is_none());
        assert!(parse_record("1 2 3 4 5").is_none());
        assert!(parse_record("1 2 3 0.5").is_none());
        assert!(parse_record("BADLINE").is_none());
        assert!(parse_record("1 nan 0 0").is_none());
    }

    #[test]
    fn test_recorded_reads_every_row() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new("0 0 0 0\n1 1 0 1\n"),
            MalformedPolicy::Stop,
        );
        let records = drain(&mut layout);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].type_tag, 0);
        assert_eq!(records[1].position, Position::new(1.0, 1.0, 0.0));
        assert!(layout.truncated_at().is_none());
        assert_eq!(layout.kind(), LayoutKind::Recorded);
    }

    #[test]
    fn test_recorded_stops_at_malformed_row() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new("0 0 0 0\nBADLINE\n1 1 0 1\n"),
            MalformedPolicy::Stop,
        );
        let records = drain(&mut layout);

        assert_eq!(records.len(), 1);
        let truncated = layout.truncated_at().unwrap();
        assert_eq!(truncated.line, 2);
        assert_eq!(truncated.content, "BADLINE");

        // Exhausted for good
        assert!(layout.next_record().unwrap().is_none());
    }

    #[test]
    fn test_recorded_stops_at_non_utf8_row() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new(&b"0 0 0 0\n\xff\xfe garbage\n1 1 0 1\n"[..]),
            MalformedPolicy::Stop,
        );
        let records = drain(&mut layout);

        assert_eq!(records.len(), 1);
        assert_eq!(layout.truncated_at().map(|m| m.line), Some(2));
    }

    #[test]
    fn test_recorded_rejects_non_utf8_row() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new(&b"\xff\n"[..]),
            MalformedPolicy::Reject,
        );
        assert!(matches!(
            layout.next_record(),
            Err(SeedError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_recorded_accepts_crlf_rows() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new("0 0 0 0\r\n1 1 0 1\r\n"),
            MalformedPolicy::Stop,
        );
        assert_eq!(drain(&mut layout).len(), 2);
    }

    #[test]
    fn test_recorded_reject_policy_errors() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new("0 0 0 0\nBADLINE\n"),
            MalformedPolicy::Reject,
        );
        assert!(layout.next_record().unwrap().is_some());
        assert!(matches!(
            layout.next_record(),
            Err(SeedError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_recorded_skips_blank_lines() {
        let mut layout = RecordedLayout::from_reader(
            Cursor::new("\n0 0 0 0\n   \n2 2 0 1\n\n"),
            MalformedPolicy::Stop,
        );
        assert_eq!(drain(&mut layout).len(), 2);
        assert!(layout.truncated_at().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let result = RecordedLayout::open("does/not/exist.dat", MalformedPolicy::Stop);
        assert!(matches!(result, Err(SeedError::LayoutIo { .. })));
    }

    #[test]
    fn test_spacing_has_overlap_margin() {
        assert!((cell_spacing(10.0) - 19.0).abs() < 1e-12);
    }

    #[test]
    fn test_lattice_stays_inside_disk() {
        let spacing = cell_spacing(8.0);
        let radius = 2.0 * spacing;
        let positions = lattice_positions(radius, spacing);

        assert!(!positions.is_empty());
        for p in &positions {
            assert!(p.norm() <= radius + 1e-9, "{:?} outside radius {}", p, radius);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_lattice_has_no_duplicates_on_axes() {
        let spacing = cell_spacing(8.0);
        let positions = lattice_positions(2.0 * spacing, spacing);

        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(
                    a.distance_to(b) > AXIS_EPSILON,
                    "duplicate seeding at {:?} and {:?}",
                    a,
                    b
                );
            }
        }
        // The origin is emitted exactly once
        let at_origin = positions.iter().filter(|p| p.norm() < AXIS_EPSILON).count();
        assert_eq!(at_origin, 1);
    }

    #[test]
    fn test_lattice_count_for_known_radius() {
        // Rows: y=0 -> x in {0, s, 2s} = 5 points; y=0.87s -> x in {0.5s, 1.5s} = 8;
        // y=1.73s -> x in {0, s} = 6; y=2.6s is outside.
        let spacing = 1.0;
        let positions = lattice_positions(2.5 * spacing, spacing);
        assert_eq!(positions.len(), 19);
    }

    #[test]
    fn test_lattice_rejects_degenerate_spacing() {
        assert!(lattice_positions(100.0, 0.0).is_empty());
        assert!(lattice_positions(0.0, 1.0).is_empty());
        assert!(lattice_positions(1.0e200, 16.0).is_empty());
    }

    #[test]
    fn test_estimated_lattice_size_tracks_lattice() {
        let spacing = cell_spacing(8.0);
        let estimate = estimated_lattice_size(250.0, spacing);
        let actual = lattice_positions(250.0, spacing).len() as f64;
        assert!((actual - estimate).abs() / estimate < 0.1);
    }

    #[test]
    fn test_packed_cluster_samples_every_record() {
        let sampler = AttributeSampler::new(SamplingSpec::new(1.0, 0.25, 0.0, 2.0).unwrap()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut layout = PackedCluster::new(40.0, 8.0, 0, sampler, &mut rng);
        let expected = layout.remaining();

        let records = drain(&mut layout);
        assert_eq!(records.len(), expected);
        assert_eq!(layout.kind(), LayoutKind::Packed);
        for record in &records {
            let value = record.attribute.unwrap();
            assert!((0.0..=2.0).contains(&value));
            assert_eq!(record.type_tag, 0);
        }
    }
}
